// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewshed Geom: integer pixel-space geometry for exposure tracking.
//!
//! Viewshed Geom holds the small set of geometric primitives the Viewshed
//! region tree computes with. Everything is expressed in whole screen pixels
//! (`i32`): host layout systems hand over floating-point measurements, those
//! are rounded once at the boundary, and all clipping and overlap tests then
//! run on exact integer arithmetic.
//!
//! - [`PxRect`] – an axis-aligned rectangle in absolute screen pixels, stored
//!   as two corners. Intersections may produce inverted (empty) rectangles;
//!   they are preserved as-is so callers can still reason about them.
//! - [`PxVec`] – an integer offset, used for accumulated scroll displacement.
//! - [`Viewport`] – a rectangle paired with the scroll offset of the content
//!   it exposes.
//! - [`round_px`] – the boundary rounding rule: half away from zero, with
//!   non-finite input collapsing to `0`.
//!
//! # Example
//!
//! ```rust
//! use viewshed_geom::{PxRect, PxVec};
//!
//! let window = PxRect::new(0, 0, 400, 800);
//! let item = PxRect::new(0, 850, 400, 950);
//! assert!(!window.overlaps(&item));
//!
//! // Scrolling the content down 200px slides the window over the item.
//! let scrolled = window.translate(PxVec::new(0, 200));
//! assert!(scrolled.overlaps(&item));
//! ```
//!
//! ## Float semantics
//!
//! Floating-point values only appear as *inputs* to [`round_px`]. `NaN` and
//! infinities are treated as absent measurements and round to `0`; callers
//! that need to distinguish "absent" from "at the origin" must do so before
//! rounding.
//!
//! This crate is `no_std` and does not require `alloc`.

#![no_std]

mod px;
mod viewport;

pub use px::{PxRect, PxVec, round_opt, round_px};
pub use viewport::Viewport;
