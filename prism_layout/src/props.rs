// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON property maps.
//!
//! Scene descriptions arrive as one property map per node. [`Tree::apply_properties`] applies the
//! keys it understands to the node's [`LocalNode`] and schedules a relayout. Unknown keys,
//! keys that do not apply to the node's arrangement, and malformed values are logged at debug
//! level and leave the previous value in place.
//!
//! | key | applies to | value |
//! |-----|------------|-------|
//! | `localPosition`, `localScale` | any | `[x, y, z]` |
//! | `localRotation` | any | `[x, y, z, w]`, normalized |
//! | `alignment` | any | `"<top\|center\|bottom>-<left\|center\|right>"` |
//! | `visible` | any | bool |
//! | `points` | any | `[[x, y, z], ...]` |
//! | `width`, `height` | linear, grid, rect, page | meters, `0` wraps the content |
//! | `orientation` | linear | `"vertical"` or `"horizontal"` |
//! | `skipInvisibleItems` | linear, grid | bool |
//! | `columns`, `rows` | grid | non-negative integer, `0` is automatic |
//! | `defaultItemPadding` | linear, grid | `[top, right, bottom, left]` |
//! | `defaultItemAlignment` | linear, grid | alignment |
//! | `itemPadding` | linear, page | `[{ "index": i, "padding": [t, r, b, l] }, ...]` |
//! | `itemPadding` | grid | `[{ "column": c, "row": r, "padding": [t, r, b, l] }, ...]` |
//! | `itemAlignment` | linear, page | `[{ "index": i, "alignment": a }, ...]` |
//! | `itemAlignment` | grid | `[{ "column": c, "row": r, "alignment": a }, ...]` |
//! | `padding`, `contentAlignment` | rect | `[top, right, bottom, left]`, alignment |
//! | `visiblePage` | page | non-negative integer |
//! | `defaultPagePadding`, `defaultPageAlignment` | page | padding, alignment |
//! | `scrollBounds` | scroll | `{ "min": [x, y, z], "max": [x, y, z] }` |
//! | `scrollValue` | scroll | number, clamped to `[0, 1]` |
//! | `scrollDirection` | scroll | `"vertical"` or `"horizontal"` |
//! | `scrollOffset` | scroll | `[x, y, z]` |
//!
//! `itemPadding` and `itemAlignment` replace all overrides of their kind at once.

use std::collections::BTreeMap;

use glam::{DQuat, DVec3};
use kurbo::Insets;
use prism_bounds::Aabb;
use serde_json::{Map, Value};
use tracing::debug;

use crate::alignment::Alignment;
use crate::error::PropertyError;
use crate::layout::{Arrangement, Extent, Orientation};
use crate::tree::Tree;
use crate::types::{Content, LocalNode, NodeFlags, NodeId};

impl Tree {
    /// Apply a property map to `id`. Returns the number of properties applied.
    ///
    /// Layout-managed children keep their layout's x and y whatever `localPosition` says.
    pub fn apply_properties(&mut self, id: NodeId, props: &Map<String, Value>) -> usize {
        let Some(mut local) = self.local(id).cloned() else {
            debug!(node = ?id, "ignoring properties for a stale node");
            return 0;
        };
        let mut applied = 0;
        let mut content_changed = false;
        for (key, value) in props {
            match apply_property(&mut local, key, value) {
                Ok(true) => {
                    applied += 1;
                    content_changed |= key == "points";
                }
                Ok(false) => debug!(node = ?id, key = %key, "ignoring unsupported property"),
                Err(err) => debug!(node = ?id, "{err}, keeping the previous value"),
            }
        }
        if applied > 0 {
            if content_changed {
                self.set_content(id, local.content.clone());
            }
            self.edit(id, |l| *l = local);
        }
        applied
    }
}

/// Apply one property. `Ok(false)` when the key does not apply to this node.
fn apply_property(local: &mut LocalNode, key: &str, value: &Value) -> Result<bool, PropertyError> {
    match key {
        "localPosition" => local.position = vec3(key, value)?,
        "localScale" => local.scale = vec3(key, value)?,
        "localRotation" => local.rotation = rotation(key, value)?,
        "alignment" => local.alignment = alignment(key, value)?,
        "visible" => {
            let visible = boolean(key, value)?;
            local.flags.set(NodeFlags::VISIBLE, visible);
        }
        "width" | "height" => {
            let extent = extent(key, value)?;
            let Some((width, height)) = local.arrangement.size_mut() else {
                return Ok(false);
            };
            *(if key == "width" { width } else { height }) = extent;
        }
        "orientation" => {
            let orientation = orientation(key, value)?;
            let Arrangement::Linear(l) = &mut local.arrangement else {
                return Ok(false);
            };
            l.orientation = orientation;
        }
        "defaultItemPadding" => {
            let pad = padding(key, value)?;
            match &mut local.arrangement {
                Arrangement::Linear(l) => l.items.padding = pad,
                Arrangement::Grid(g) => g.items.padding = pad,
                _ => return Ok(false),
            }
        }
        "defaultItemAlignment" => {
            let a = alignment(key, value)?;
            match &mut local.arrangement {
                Arrangement::Linear(l) => l.items.alignment = a,
                Arrangement::Grid(g) => g.items.alignment = a,
                _ => return Ok(false),
            }
        }
        "itemPadding" => match &mut local.arrangement {
            Arrangement::Linear(l) => {
                l.items.padding_overrides = overrides(key, value, "padding", by_index, padding)?;
            }
            Arrangement::Page(p) => {
                p.items.padding_overrides = overrides(key, value, "padding", by_index, padding)?;
            }
            Arrangement::Grid(g) => {
                g.items.padding_overrides = overrides(key, value, "padding", by_cell, padding)?;
            }
            _ => return Ok(false),
        },
        "itemAlignment" => match &mut local.arrangement {
            Arrangement::Linear(l) => {
                l.items.alignment_overrides =
                    overrides(key, value, "alignment", by_index, alignment)?;
            }
            Arrangement::Page(p) => {
                p.items.alignment_overrides =
                    overrides(key, value, "alignment", by_index, alignment)?;
            }
            Arrangement::Grid(g) => {
                g.items.alignment_overrides =
                    overrides(key, value, "alignment", by_cell, alignment)?;
            }
            _ => return Ok(false),
        },
        "padding" | "contentAlignment" => {
            let Arrangement::Rect(r) = &mut local.arrangement else {
                return Ok(false);
            };
            if key == "padding" {
                r.items.padding = padding(key, value)?;
            } else {
                r.items.alignment = alignment(key, value)?;
            }
        }
        "visiblePage" | "defaultPagePadding" | "defaultPageAlignment" => {
            let Arrangement::Page(p) = &mut local.arrangement else {
                return Ok(false);
            };
            match key {
                "visiblePage" => p.visible_page = count(key, value)?,
                "defaultPagePadding" => p.items.padding = padding(key, value)?,
                _ => p.items.alignment = alignment(key, value)?,
            }
        }
        "columns" | "rows" => {
            let n = count(key, value)?;
            let Arrangement::Grid(g) = &mut local.arrangement else {
                return Ok(false);
            };
            *(if key == "columns" { &mut g.columns } else { &mut g.rows }) = n;
        }
        "skipInvisibleItems" => {
            let skip = boolean(key, value)?;
            match &mut local.arrangement {
                Arrangement::Linear(l) => l.skip_invisible = skip,
                Arrangement::Grid(g) => g.skip_invisible = skip,
                _ => return Ok(false),
            }
        }
        "scrollBounds" => {
            let bounds = scroll_bounds(key, value)?;
            let Arrangement::Scroll(s) = &mut local.arrangement else {
                return Ok(false);
            };
            s.bounds = bounds;
        }
        "scrollValue" => {
            let v = number(key, value)?;
            let Arrangement::Scroll(s) = &mut local.arrangement else {
                return Ok(false);
            };
            s.value = v.clamp(0.0, 1.0);
        }
        "scrollDirection" => {
            let direction = orientation(key, value)?;
            let Arrangement::Scroll(s) = &mut local.arrangement else {
                return Ok(false);
            };
            s.direction = direction;
        }
        "scrollOffset" => {
            let offset = vec3(key, value)?;
            let Arrangement::Scroll(s) = &mut local.arrangement else {
                return Ok(false);
            };
            s.offset = offset;
        }
        "points" => {
            let Value::Array(items) = value else {
                return Err(PropertyError::WrongType {
                    key: key.into(),
                    expected: "an array of [x, y, z] points",
                });
            };
            let points = items
                .iter()
                .map(|p| vec3(key, p))
                .collect::<Result<Vec<_>, _>>()?;
            local.content = Content::Polyline(points);
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn number(key: &str, value: &Value) -> Result<f64, PropertyError> {
    value.as_f64().ok_or_else(|| PropertyError::WrongType {
        key: key.into(),
        expected: "a number",
    })
}

fn boolean(key: &str, value: &Value) -> Result<bool, PropertyError> {
    value.as_bool().ok_or_else(|| PropertyError::WrongType {
        key: key.into(),
        expected: "a bool",
    })
}

fn string<'a>(key: &str, value: &'a Value) -> Result<&'a str, PropertyError> {
    value.as_str().ok_or_else(|| PropertyError::WrongType {
        key: key.into(),
        expected: "a string",
    })
}

fn numbers<const N: usize>(key: &str, value: &Value) -> Result<[f64; N], PropertyError> {
    let Value::Array(items) = value else {
        return Err(PropertyError::WrongType {
            key: key.into(),
            expected: "an array of numbers",
        });
    };
    if items.len() != N {
        return Err(PropertyError::WrongArity {
            key: key.into(),
            expected: N,
            found: items.len(),
        });
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = number(key, item)?;
    }
    Ok(out)
}

fn vec3(key: &str, value: &Value) -> Result<DVec3, PropertyError> {
    numbers::<3>(key, value).map(DVec3::from_array)
}

/// `[top, right, bottom, left]`.
fn padding(key: &str, value: &Value) -> Result<Insets, PropertyError> {
    let [top, right, bottom, left] = numbers(key, value)?;
    Ok(Insets::new(left, top, right, bottom))
}

fn rotation(key: &str, value: &Value) -> Result<DQuat, PropertyError> {
    let q = DQuat::from_array(numbers::<4>(key, value)?);
    let len = q.length();
    if len <= f64::EPSILON || !len.is_finite() {
        return Err(PropertyError::OutOfRange {
            key: key.into(),
            value: len,
        });
    }
    Ok(q / len)
}

fn alignment(key: &str, value: &Value) -> Result<Alignment, PropertyError> {
    string(key, value)?
        .parse()
        .map_err(|source| PropertyError::Alignment {
            key: key.into(),
            source,
        })
}

fn orientation(key: &str, value: &Value) -> Result<Orientation, PropertyError> {
    match string(key, value)? {
        "vertical" => Ok(Orientation::Vertical),
        "horizontal" => Ok(Orientation::Horizontal),
        other => Err(PropertyError::UnknownValue {
            key: key.into(),
            value: other.into(),
        }),
    }
}

fn extent(key: &str, value: &Value) -> Result<Extent, PropertyError> {
    let v = number(key, value)?;
    if v < 0.0 || !v.is_finite() {
        return Err(PropertyError::OutOfRange {
            key: key.into(),
            value: v,
        });
    }
    Ok(Extent::from_meters(v))
}

fn count(key: &str, value: &Value) -> Result<usize, PropertyError> {
    let v = number(key, value)?;
    if v < 0.0 || v.fract() != 0.0 || v > f64::from(u32::MAX) {
        return Err(PropertyError::OutOfRange {
            key: key.into(),
            value: v,
        });
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Checked to be a non-negative integer within u32 range above."
    )]
    Ok(v as usize)
}

type Entry = Map<String, Value>;

/// An array of objects, each naming an item and carrying its value under `field`.
fn overrides<K: Ord, T>(
    key: &str,
    value: &Value,
    field: &str,
    item: fn(&str, &Entry) -> Result<K, PropertyError>,
    parse: fn(&str, &Value) -> Result<T, PropertyError>,
) -> Result<BTreeMap<K, T>, PropertyError> {
    let wrong = || PropertyError::WrongType {
        key: key.into(),
        expected: "an array of objects naming an item and its value",
    };
    let Value::Array(entries) = value else {
        return Err(wrong());
    };
    entries
        .iter()
        .map(|entry| -> Result<(K, T), PropertyError> {
            let entry = entry.as_object().ok_or_else(wrong)?;
            let v = entry.get(field).ok_or_else(wrong)?;
            Ok((item(key, entry)?, parse(key, v)?))
        })
        .collect()
}

fn entry_count(key: &str, entry: &Entry, name: &str) -> Result<usize, PropertyError> {
    let v = entry.get(name).ok_or_else(|| PropertyError::WrongType {
        key: key.into(),
        expected: "`index`, or `column` and `row`, on every entry",
    })?;
    count(key, v)
}

fn by_index(key: &str, entry: &Entry) -> Result<usize, PropertyError> {
    entry_count(key, entry, "index")
}

fn by_cell(key: &str, entry: &Entry) -> Result<(usize, usize), PropertyError> {
    Ok((
        entry_count(key, entry, "column")?,
        entry_count(key, entry, "row")?,
    ))
}

fn scroll_bounds(key: &str, value: &Value) -> Result<Aabb, PropertyError> {
    let (Some(min), Some(max)) = (value.get("min"), value.get("max")) else {
        return Err(PropertyError::WrongType {
            key: key.into(),
            expected: "an object with `min` and `max`",
        });
    };
    let (min, max) = (vec3(key, min)?, vec3(key, max)?);
    Ok(Aabb::new(min.min(max), min.max(max)))
}
