// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named anchors and the pivot offsets they resolve to.

use core::fmt;
use core::str::FromStr;

use glam::DVec3;
use kurbo::Vec2;
use prism_bounds::Aabb;

use crate::error::ParseAlignmentError;

/// Vertical anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalAlignment {
    /// Top edge.
    Top,
    /// Middle.
    #[default]
    Center,
    /// Bottom edge.
    Bottom,
}

/// Horizontal anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalAlignment {
    /// Left edge.
    Left,
    /// Middle.
    #[default]
    Center,
    /// Right edge.
    Right,
}

impl VerticalAlignment {
    /// Fraction of the height measured up from the bottom edge.
    pub const fn fraction(self) -> f64 {
        match self {
            Self::Bottom => 0.0,
            Self::Center => 0.5,
            Self::Top => 1.0,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Center => "center",
            Self::Bottom => "bottom",
        }
    }
}

impl HorizontalAlignment {
    /// Fraction of the width measured from the left edge.
    pub const fn fraction(self) -> f64 {
        match self {
            Self::Left => 0.0,
            Self::Center => 0.5,
            Self::Right => 1.0,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// A named anchor such as `"top-left"`: the point of a box that sits at the node's origin.
///
/// ```
/// use prism_layout::Alignment;
///
/// let a: Alignment = "bottom-right".parse().unwrap();
/// assert_eq!(a, Alignment::BOTTOM_RIGHT);
/// assert_eq!(a.to_string(), "bottom-right");
/// assert!("middle-left".parse::<Alignment>().is_err());
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    /// Vertical anchor.
    pub vertical: VerticalAlignment,
    /// Horizontal anchor.
    pub horizontal: HorizontalAlignment,
}

impl Alignment {
    /// `"top-left"`.
    pub const TOP_LEFT: Self = Self::new(VerticalAlignment::Top, HorizontalAlignment::Left);
    /// `"top-center"`.
    pub const TOP_CENTER: Self = Self::new(VerticalAlignment::Top, HorizontalAlignment::Center);
    /// `"top-right"`.
    pub const TOP_RIGHT: Self = Self::new(VerticalAlignment::Top, HorizontalAlignment::Right);
    /// `"center-left"`.
    pub const CENTER_LEFT: Self = Self::new(VerticalAlignment::Center, HorizontalAlignment::Left);
    /// `"center-center"`, the default.
    pub const CENTER_CENTER: Self =
        Self::new(VerticalAlignment::Center, HorizontalAlignment::Center);
    /// `"center-right"`.
    pub const CENTER_RIGHT: Self =
        Self::new(VerticalAlignment::Center, HorizontalAlignment::Right);
    /// `"bottom-left"`.
    pub const BOTTOM_LEFT: Self = Self::new(VerticalAlignment::Bottom, HorizontalAlignment::Left);
    /// `"bottom-center"`.
    pub const BOTTOM_CENTER: Self =
        Self::new(VerticalAlignment::Bottom, HorizontalAlignment::Center);
    /// `"bottom-right"`.
    pub const BOTTOM_RIGHT: Self =
        Self::new(VerticalAlignment::Bottom, HorizontalAlignment::Right);

    /// Create an alignment from its two anchors.
    pub const fn new(vertical: VerticalAlignment, horizontal: HorizontalAlignment) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Pivot fractions in `[0, 1] x [0, 1]`: x from the left edge, y up from the bottom edge.
    pub const fn fraction(self) -> Vec2 {
        Vec2::new(self.horizontal.fraction(), self.vertical.fraction())
    }

    /// Pivot offset of `bounds` from its minimum corner: `(fx * width, fy * height)`.
    pub fn pivot_offset(self, bounds: &Aabb) -> Vec2 {
        let f = self.fraction();
        Vec2::new(f.x * bounds.width(), f.y * bounds.height())
    }

    /// Translation that moves the pivot of `bounds` onto the origin.
    ///
    /// Only x and y are aligned; depth is left where the content put it.
    pub fn content_offset(self, bounds: &Aabb) -> DVec3 {
        let p = self.pivot_offset(bounds);
        DVec3::new(-(bounds.min.x + p.x), -(bounds.min.y + p.y), 0.0)
    }
}

impl FromStr for Alignment {
    type Err = ParseAlignmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseAlignmentError(s.to_owned());
        let (v, h) = s.trim().split_once('-').ok_or_else(err)?;
        let vertical = match v {
            "top" => VerticalAlignment::Top,
            "center" => VerticalAlignment::Center,
            "bottom" => VerticalAlignment::Bottom,
            _ => return Err(err()),
        };
        let horizontal = match h {
            "left" => HorizontalAlignment::Left,
            "center" => HorizontalAlignment::Center,
            "right" => HorizontalAlignment::Right,
            _ => return Err(err()),
        };
        Ok(Self::new(vertical, horizontal))
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.vertical.name(), self.horizontal.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bx(w: f64, h: f64) -> Aabb {
        Aabb::new(DVec3::new(1.0, -2.0, 0.0), DVec3::new(1.0 + w, -2.0 + h, 0.1))
    }

    #[test]
    fn center_center_is_half_extent_for_any_size() {
        for (w, h) in [(0.0, 0.0), (1.0, 2.0), (0.3, 0.001), (12.5, 7.0)] {
            let p = Alignment::CENTER_CENTER.pivot_offset(&bx(w, h));
            assert_eq!(p, Vec2::new(0.5 * w, 0.5 * h));
        }
    }

    #[test]
    fn top_left_moves_top_left_corner_to_origin() {
        let b = bx(2.0, 1.0);
        let aligned = b.translated(Alignment::TOP_LEFT.content_offset(&b));
        assert_eq!(aligned.min.x, 0.0);
        assert_eq!(aligned.max.y, 0.0);
        assert_eq!(aligned.min.z, b.min.z);
    }

    #[test]
    fn bottom_right_moves_bottom_right_corner_to_origin() {
        let b = bx(2.0, 1.0);
        let aligned = b.translated(Alignment::BOTTOM_RIGHT.content_offset(&b));
        assert_eq!(aligned.max.x, 0.0);
        assert_eq!(aligned.min.y, 0.0);
    }

    #[test]
    fn parses_all_nine_names() {
        let all = [
            Alignment::TOP_LEFT,
            Alignment::TOP_CENTER,
            Alignment::TOP_RIGHT,
            Alignment::CENTER_LEFT,
            Alignment::CENTER_CENTER,
            Alignment::CENTER_RIGHT,
            Alignment::BOTTOM_LEFT,
            Alignment::BOTTOM_CENTER,
            Alignment::BOTTOM_RIGHT,
        ];
        for a in all {
            assert_eq!(a.to_string().parse::<Alignment>(), Ok(a));
        }
    }

    #[test]
    fn rejects_malformed_names() {
        for s in ["", "top", "left-top", "top-", "top-left-right", "TOP-LEFT"] {
            assert_eq!(
                s.parse::<Alignment>(),
                Err(ParseAlignmentError(s.to_owned())),
                "{s:?}"
            );
        }
    }

    #[test]
    fn default_is_center_center() {
        assert_eq!(Alignment::default(), Alignment::CENTER_CENTER);
    }
}
