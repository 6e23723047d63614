// Copyright 2025 the Prism Layout Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `flatvec`: flat vector with linear scans (small, simple).
//! - `bvh`: binary bounding volume hierarchy with an SAH-like split.
//!
//! SAH note
//! --------
//! The BVH uses an SAH-like split heuristic.
//! For a split point `k` along a sorted axis we minimize:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` items
//! and `area` is the box surface area.
//! We evaluate all `k` in O(n) per axis using prefix/suffix bounding boxes, and pick the lowest
//! cost.

pub mod bvh;
pub mod flatvec;
