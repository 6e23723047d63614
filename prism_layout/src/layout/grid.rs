// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid placement.

use kurbo::Insets;
use prism_bounds::Aabb;

use super::{
    Extent, GridLayout, Item, Placed, Placement, depth_range, hanging_box, place_at,
    shrink_factor,
};

/// Column/row shape of a grid holding `n` items.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Shape {
    columns: usize,
    rows: usize,
    column_major: bool,
}

impl Shape {
    fn new(layout: &GridLayout, n: usize) -> Self {
        match (layout.columns, layout.rows) {
            (0, 0) => Self {
                columns: n,
                rows: 1,
                column_major: false,
            },
            (0, rows) => Self {
                columns: n.div_ceil(rows),
                rows,
                column_major: true,
            },
            (columns, rows) => Self {
                columns,
                rows: rows.max(n.div_ceil(columns)),
                column_major: false,
            },
        }
    }

    /// `(column, row)` of the `i`-th placed item.
    fn cell(self, i: usize) -> (usize, usize) {
        if self.column_major {
            (i / self.rows, i % self.rows)
        } else {
            (i % self.columns, i / self.columns)
        }
    }
}

/// Resize `tracks` so they sum to a fixed size, keeping their proportions.
fn fit_tracks(tracks: &mut [f64], extent: Extent) {
    let Extent::Fixed(total) = extent else {
        return;
    };
    let sum: f64 = tracks.iter().sum();
    if sum > 0.0 {
        let k = total / sum;
        tracks.iter_mut().for_each(|t| *t *= k);
    } else if !tracks.is_empty() {
        #[allow(
            clippy::cast_precision_loss,
            reason = "Track counts are small; exact conversion is not required."
        )]
        let each = total / tracks.len() as f64;
        tracks.iter_mut().for_each(|t| *t = each);
    }
}

fn prefix(tracks: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    tracks
        .iter()
        .map(|t| {
            let start = acc;
            acc += t;
            start
        })
        .collect()
}

pub(crate) fn place(layout: &GridLayout, items: &[Item]) -> Placement {
    if items.is_empty() {
        let w = layout.width.resolve(0.0);
        let h = layout.height.resolve(0.0);
        return Placement {
            bounds: hanging_box(w, h, (0.0, 0.0)),
            ..Placement::default()
        };
    }
    let shape = Shape::new(layout, items.len());
    let pads: Vec<Insets> = (0..items.len())
        .map(|i| layout.items.padding(&shape.cell(i)))
        .collect();
    let user: Vec<Aabb> = items.iter().map(|it| it.extent(1.0)).collect();

    let mut col_w = vec![0.0_f64; shape.columns];
    let mut row_h = vec![0.0_f64; shape.rows];
    for (i, (u, pad)) in user.iter().zip(&pads).enumerate() {
        let (c, r) = shape.cell(i);
        col_w[c] = col_w[c].max(u.width() + pad.x_value());
        row_h[r] = row_h[r].max(u.height() + pad.y_value());
    }
    fit_tracks(&mut col_w, layout.width);
    fit_tracks(&mut row_h, layout.height);

    let factors: Vec<f64> = user
        .iter()
        .zip(&pads)
        .enumerate()
        .map(|(i, (u, pad))| {
            let (c, r) = shape.cell(i);
            let max_w = if layout.width.is_fixed() {
                col_w[c] - pad.x_value()
            } else {
                f64::INFINITY
            };
            let max_h = if layout.height.is_fixed() {
                row_h[r] - pad.y_value()
            } else {
                f64::INFINITY
            };
            shrink_factor(u, max_w, max_h)
        })
        .collect();
    let extents: Vec<Aabb> = items
        .iter()
        .zip(&factors)
        .map(|(it, f)| it.extent(*f))
        .collect();

    let col_x = prefix(&col_w);
    let row_y = prefix(&row_h);
    let mut placed = Vec::with_capacity(items.len());
    for (i, it) in items.iter().enumerate() {
        let (c, r) = shape.cell(i);
        let a = layout.items.alignment(&(c, r)).fraction();
        let pad = pads[i];
        let e = &extents[i];
        let left = col_x[c] + pad.x0 + a.x * (col_w[c] - (e.width() + pad.x_value()));
        let top = -(row_y[r] + pad.y0 + (1.0 - a.y) * (row_h[r] - (e.height() + pad.y_value())));
        placed.push(Placed {
            index: it.index,
            xy: place_at(e, left, top),
            factor: factors[i],
        });
    }

    let width = layout.width.resolve(col_w.iter().sum());
    let height = layout.height.resolve(row_h.iter().sum());
    Placement {
        placed,
        overflow: Vec::new(),
        bounds: hanging_box(width, height, depth_range(&extents)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::ItemLayout;
    use super::super::test_util::{item, placed_bounds};
    use super::*;
    use crate::alignment::Alignment;

    fn grid(columns: usize, rows: usize) -> GridLayout {
        GridLayout {
            columns,
            rows,
            items: ItemLayout {
                alignment: Alignment::TOP_LEFT,
                ..ItemLayout::default()
            },
            ..GridLayout::default()
        }
    }

    #[test]
    fn shape_defaults() {
        assert_eq!(
            Shape::new(&grid(0, 0), 3),
            Shape {
                columns: 3,
                rows: 1,
                column_major: false
            }
        );
        assert_eq!(Shape::new(&grid(2, 0), 5).rows, 3);
        let by_rows = Shape::new(&grid(0, 2), 5);
        assert_eq!((by_rows.columns, by_rows.rows), (3, 2));
        assert!(by_rows.column_major);
        assert_eq!(by_rows.cell(3), (1, 1));
        assert_eq!(Shape::new(&grid(2, 0), 5).cell(3), (1, 1));
        assert_eq!(Shape::new(&grid(3, 0), 5).cell(4), (1, 1));
    }

    #[test]
    fn two_by_two_uses_widest_and_tallest() {
        let items = [
            item(0, 1.0, 0.5),
            item(1, 0.5, 0.5),
            item(2, 0.5, 1.0),
            item(3, 0.25, 0.25),
        ];
        let p = place(&grid(2, 0), &items);
        // Column widths 1.0 and 0.5; row heights 0.5 and 1.0.
        let b1 = placed_bounds(&items[1], &p.placed[1]);
        assert_eq!((b1.min.x, b1.max.y), (1.0, 0.0));
        let b2 = placed_bounds(&items[2], &p.placed[2]);
        assert_eq!((b2.min.x, b2.max.y), (0.0, -0.5));
        let b3 = placed_bounds(&items[3], &p.placed[3]);
        assert_eq!((b3.min.x, b3.max.y), (1.0, -0.5));
        assert_eq!(p.bounds, hanging_box(1.5, 1.5, (0.0, 0.0)));
    }

    #[test]
    fn default_grid_is_a_single_row() {
        let items = [item(0, 1.0, 1.0), item(1, 1.0, 1.0), item(2, 1.0, 1.0)];
        let p = place(&GridLayout::default(), &items);
        let b2 = placed_bounds(&items[2], &p.placed[2]);
        assert_eq!((b2.min.x, b2.max.y), (2.0, 0.0));
        assert_eq!(p.bounds, hanging_box(3.0, 1.0, (0.0, 0.0)));
    }

    #[test]
    fn overrides_are_keyed_by_cell() {
        let mut g = grid(2, 0);
        g.items.padding_overrides.insert((1, 1), Insets::new(0.5, 0.0, 0.0, 0.0));
        g.items
            .alignment_overrides
            .insert((0, 1), Alignment::BOTTOM_RIGHT);
        let items = [
            item(0, 1.0, 1.0),
            item(1, 1.0, 1.0),
            item(2, 0.5, 0.5),
            item(3, 1.0, 1.0),
        ];
        let p = place(&g, &items);
        // Cell (1, 1) holds the fourth item; the padding widens column 1.
        let b3 = placed_bounds(&items[3], &p.placed[3]);
        assert_eq!(b3.min.x, 1.5);
        assert_eq!(p.bounds.width(), 2.5);
        // Cell (0, 1) holds the third item, pushed into the bottom-right corner.
        let b2 = placed_bounds(&items[2], &p.placed[2]);
        assert_eq!((b2.max.x, b2.min.y), (1.0, -2.0));
    }

    #[test]
    fn column_major_fills_down_first() {
        let items = [item(0, 1.0, 1.0), item(1, 1.0, 1.0), item(2, 1.0, 1.0)];
        let p = place(&grid(0, 2), &items);
        let b1 = placed_bounds(&items[1], &p.placed[1]);
        let b2 = placed_bounds(&items[2], &p.placed[2]);
        assert_eq!((b1.min.x, b1.max.y), (0.0, -1.0));
        assert_eq!((b2.min.x, b2.max.y), (1.0, 0.0));
    }

    #[test]
    fn centered_item_sits_in_middle_of_cell() {
        let mut g = grid(2, 0);
        g.items.alignment = Alignment::CENTER_CENTER;
        let items = [item(0, 1.0, 1.0), item(1, 0.5, 0.5)];
        let p = place(&g, &items);
        let b1 = placed_bounds(&items[1], &p.placed[1]);
        assert_eq!((b1.min.x, b1.max.y), (1.0, -0.25));
    }

    #[test]
    fn fixed_width_scales_columns_and_shrinks_items() {
        let g = GridLayout {
            width: Extent::Fixed(1.0),
            ..grid(2, 0)
        };
        let items = [item(0, 1.0, 1.0), item(1, 1.0, 1.0)];
        let p = place(&g, &items);
        assert_eq!(p.placed[0].factor, 0.5);
        let b1 = placed_bounds(&items[1], &p.placed[1]);
        assert_eq!((b1.min.x, b1.max.x), (0.5, 1.0));
        assert_eq!(p.bounds.width(), 1.0);
    }

    #[test]
    fn fixed_width_never_enlarges_items() {
        let g = GridLayout {
            width: Extent::Fixed(4.0),
            ..grid(2, 0)
        };
        let items = [item(0, 1.0, 1.0), item(1, 1.0, 1.0)];
        let p = place(&g, &items);
        assert!(p.placed.iter().all(|pl| pl.factor == 1.0));
        let b1 = placed_bounds(&items[1], &p.placed[1]);
        assert_eq!(b1.min.x, 2.0);
    }

    #[test]
    fn empty_fixed_grid_keeps_its_size() {
        let g = GridLayout {
            width: Extent::Fixed(2.0),
            height: Extent::Fixed(1.0),
            ..GridLayout::default()
        };
        let p = place(&g, &[]);
        assert_eq!(p.bounds, hanging_box(2.0, 1.0, (0.0, 0.0)));
    }
}
