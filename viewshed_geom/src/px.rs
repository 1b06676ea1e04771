// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pixel rectangles, offsets, and boundary rounding.

use core::ops::{Add, AddAssign};

/// Axis-aligned rectangle in absolute screen pixels.
///
/// Stored as two corners, `(x0, y0)` top-left and `(x1, y1)` bottom-right,
/// following the host convention that `y` grows downward. An "inverted"
/// rectangle (`x0 > x1` or `y0 > y1`) is a valid value and means the
/// rectangle is empty; [`intersect`][Self::intersect] produces such values
/// for disjoint inputs and deliberately does not normalize them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PxRect {
    /// Left edge.
    pub x0: i32,
    /// Top edge.
    pub y0: i32,
    /// Right edge.
    pub x1: i32,
    /// Bottom edge.
    pub y1: i32,
}

impl PxRect {
    /// Create a new rectangle from corner coordinates.
    #[inline(always)]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from its top-left corner and a size.
    #[inline]
    pub const fn from_origin_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x.saturating_add(w),
            y1: y.saturating_add(h),
        }
    }

    /// Width of the rectangle. Negative for inverted rectangles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Height of the rectangle. Negative for inverted rectangles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y1.saturating_sub(self.y0)
    }

    /// Return true if the rectangle has no area (inverted or degenerate).
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// The intersection of two rectangles.
    ///
    /// Disjoint inputs yield an inverted rectangle; it is returned unchanged
    /// so repeated clipping keeps shrinking instead of snapping back to a
    /// normalized empty value.
    #[inline]
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// Determines whether this rectangle overlaps another in any way.
    ///
    /// Note that the edge of the rectangle is considered to be part of
    /// itself, meaning that two rectangles that share an edge are considered
    /// to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use viewshed_geom::PxRect;
    ///
    /// let a = PxRect::new(0, 0, 10, 10);
    /// let b = PxRect::new(5, 5, 15, 15);
    /// assert!(a.overlaps(&b));
    ///
    /// let a = PxRect::new(0, 0, 10, 10);
    /// let b = PxRect::new(10, 0, 20, 10);
    /// assert!(a.overlaps(&b));
    ///
    /// let a = PxRect::new(0, 0, 10, 10);
    /// let b = PxRect::new(11, 0, 20, 10);
    /// assert!(!a.overlaps(&b));
    /// ```
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.x0 <= other.x1 && self.x1 >= other.x0 && self.y0 <= other.y1 && self.y1 >= other.y0
    }

    /// This rectangle displaced by an offset.
    #[inline]
    #[must_use]
    pub const fn translate(&self, v: PxVec) -> Self {
        Self {
            x0: self.x0.saturating_add(v.dx),
            y0: self.y0.saturating_add(v.dy),
            x1: self.x1.saturating_add(v.dx),
            y1: self.y1.saturating_add(v.dy),
        }
    }
}

/// Integer pixel offset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PxVec {
    /// Horizontal displacement.
    pub dx: i32,
    /// Vertical displacement.
    pub dy: i32,
}

impl PxVec {
    /// The zero offset.
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    /// Create a new offset.
    #[inline(always)]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl Add for PxVec {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            dx: self.dx.saturating_add(rhs.dx),
            dy: self.dy.saturating_add(rhs.dy),
        }
    }
}

impl AddAssign for PxVec {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Round a host coordinate to whole pixels, half away from zero.
///
/// Non-finite input (`NaN`, infinities) rounds to `0`: a measurement the
/// host could not produce contributes nothing rather than poisoning the
/// integer arithmetic downstream. Out-of-range finite values saturate.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Truncation after the half-pixel offset is the rounding step; the cast saturates."
)]
#[inline]
#[must_use]
pub fn round_px(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let adjusted = if v >= 0.0 { v + 0.5 } else { v - 0.5 };
    adjusted as i32
}

/// Round an optional host coordinate, treating `None` as `0`.
#[inline]
#[must_use]
pub fn round_opt(v: Option<f64>) -> i32 {
    v.map_or(0, round_px)
}
