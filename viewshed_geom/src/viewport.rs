// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewports: a screen rectangle plus the scroll state of its content.

use crate::{PxRect, PxVec};

/// A node's absolute on-screen rectangle together with its content scroll
/// offset.
///
/// `rect` is where the node sits on screen, in absolute pixels. `scroll` is
/// how far the node's *content* has been scrolled, following the host
/// content-offset convention: positive values mean content has moved toward
/// larger content coordinates. The window a scrolling ancestor exposes over
/// descendant space is therefore `rect` translated by the scroll offsets
/// accumulated along the ancestor chain, not `rect` alone.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Absolute screen rectangle of the node itself.
    pub rect: PxRect,
    /// Scroll offset of the node's content.
    pub scroll: PxVec,
}

impl Viewport {
    /// Create a viewport with no scroll displacement.
    #[inline]
    pub const fn new(rect: PxRect) -> Self {
        Self {
            rect,
            scroll: PxVec::ZERO,
        }
    }

    /// Create a viewport with an explicit scroll offset.
    #[inline]
    pub const fn with_scroll(rect: PxRect, scroll: PxVec) -> Self {
        Self { rect, scroll }
    }
}

#[cfg(test)]
mod tests {
    use super::Viewport;
    use crate::{PxRect, PxVec};

    #[test]
    fn new_has_zero_scroll() {
        let vp = Viewport::new(PxRect::new(0, 0, 400, 800));
        assert_eq!(vp.scroll, PxVec::ZERO);
        assert_eq!(vp.rect.height(), 800);
    }

    #[test]
    fn default_is_degenerate_at_origin() {
        let vp = Viewport::default();
        assert!(vp.rect.is_empty());
        assert_eq!(vp.scroll, PxVec::ZERO);
    }
}
