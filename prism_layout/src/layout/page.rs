// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One page at a time.

use super::{Item, Orientation, PageLayout, Placement, linear};

pub(crate) fn place(layout: &PageLayout, items: &[Item]) -> Placement {
    let (shown, hidden): (Vec<Item>, Vec<Item>) = items
        .iter()
        .copied()
        .partition(|it| it.index == layout.visible_page);
    let mut placement = linear::stack(
        Orientation::Vertical,
        layout.width,
        layout.height,
        &layout.items,
        &shown,
    );
    placement.overflow = hidden.iter().map(|it| it.index).collect();
    placement
}
