// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host boundary types: incoming events, measurement results, and the work
//! the engine hands back.

use kurbo::{Point, Size};
use smallvec::SmallVec;

use crate::types::{ElementHandle, ItemKey, NodeId};

/// Delay, in host time-units, before re-measuring a node whose position had
/// not settled yet.
pub const SETTLE_RETRY_DELAY: u64 = 500;

/// Host layout notification for one element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutEvent {
    /// Handle of the element that was (re)laid out.
    pub target: ElementHandle,
}

/// Host scroll notification for a scrollable element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScrollEvent {
    /// How far the content has been scrolled, positive toward larger content
    /// coordinates.
    pub content_offset: Point,
    /// Size of the visible content window.
    pub layout_measurement: Size,
}

/// One entry of a host viewability report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewableItem {
    /// The item's list key.
    pub key: ItemKey,
}

/// Host viewability notification for a virtualized list.
///
/// `viewable_items` absent means the host had nothing to say; the engine
/// treats that as a no-op rather than as "nothing is viewable".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewableItemsInfo {
    /// Currently viewable items, if the host reported any.
    pub viewable_items: Option<alloc::vec::Vec<ViewableItem>>,
}

/// Result of the host's asynchronous box-measurement primitive.
///
/// Every field may be absent: a host that has stripped the element from its
/// render tree (clipping optimization) answers with no geometry at all. The
/// engine only consumes `width`, `height`, `page_x`, and `page_y`; the
/// element-local `x`/`y` are carried for completeness of the host contract.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct MeasuredBox {
    /// Element-local x, unused by the engine.
    pub x: Option<f64>,
    /// Element-local y, unused by the engine.
    pub y: Option<f64>,
    /// Measured width.
    pub width: Option<f64>,
    /// Measured height.
    pub height: Option<f64>,
    /// Page-space x of the element's top-left corner.
    pub page_x: Option<f64>,
    /// Page-space y of the element's top-left corner.
    pub page_y: Option<f64>,
}

impl MeasuredBox {
    /// The answer of a host that clipped the element out of its render tree.
    pub const CLIPPED: Self = Self {
        x: None,
        y: None,
        width: None,
        height: None,
        page_x: None,
        page_y: None,
    };

    /// Build a complete measurement from kurbo geometry.
    #[must_use]
    pub fn from_layout(origin: Point, size: Size, page: Point) -> Self {
        Self {
            x: Some(origin.x),
            y: Some(origin.y),
            width: Some(size.width),
            height: Some(size.height),
            page_x: Some(page.x),
            page_y: Some(page.y),
        }
    }

    /// The fields the engine consumes, or `None` when any is missing.
    pub(crate) fn geometry(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.width?, self.height?, self.page_x?, self.page_y?))
    }
}

/// A measurement the host must perform on the engine's behalf.
///
/// `delay` is in host time-units; `0` means "as soon as the host can". The
/// host answers by calling
/// [`Tree::apply_measurement`][crate::Tree::apply_measurement] with the
/// result. If the node was destroyed in the meantime the answer degrades to a
/// no-op, so requests never need explicit cancellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MeasureRequest {
    /// Node whose element should be measured.
    pub node: NodeId,
    /// Host time-units to wait before measuring.
    pub delay: u64,
}

/// Deferred host work produced by one engine entry point.
///
/// The engine is synchronous and never calls into the host; instead every
/// mutating entry point returns the measurements the host should now carry
/// out, in the order they were requested.
#[derive(Clone, Debug, Default)]
pub struct HostWork {
    /// Measurements to perform.
    pub measure: SmallVec<[MeasureRequest; 4]>,
}

impl HostWork {
    /// True if there is nothing for the host to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measure.is_empty()
    }

    /// Append another batch of work onto this one.
    pub fn merge(&mut self, other: Self) {
        self.measure.extend(other.measure);
    }

    pub(crate) fn push_measure(&mut self, node: NodeId, delay: u64) {
        self.measure.push(MeasureRequest { node, delay });
    }
}
