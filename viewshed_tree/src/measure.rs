// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measurement and host event intake: layout, measurement results, scroll,
//! and viewability.

use hashbrown::HashSet;
use viewshed_geom::{PxRect, PxVec, Viewport, round_px};

use crate::host::{
    HostWork, LayoutEvent, MeasuredBox, SETTLE_RETRY_DELAY, ScrollEvent, ViewableItemsInfo,
};
use crate::types::NodeId;

impl crate::Tree {
    /// Host layout notification: record the element handle and request an
    /// immediate measurement.
    ///
    /// Stale identifiers produce no work.
    pub fn on_layout(&mut self, id: NodeId, event: &LayoutEvent) -> HostWork {
        let mut work = HostWork::default();
        let Some(node) = self.node_opt_mut(id) else {
            return work;
        };
        node.element = Some(event.target);
        work.push_measure(id, 0);
        work
    }

    /// Request a fresh measurement of the node's element.
    ///
    /// Nothing is requested before the first layout event has supplied an
    /// element handle, or for stale identifiers.
    pub fn measure(&self, id: NodeId) -> HostWork {
        let mut work = HostWork::default();
        if self.is_alive(id) && self.node(id).element.is_some() {
            work.push_measure(id, 0);
        }
        work
    }

    /// Apply the host's answer to a [`MeasureRequest`][crate::MeasureRequest].
    ///
    /// A result with missing geometry marks the node clipped and leaves its
    /// viewport untouched; the next visibility pass that reaches the node
    /// requests a re-measure. A complete result rebuilds the viewport in
    /// absolute pixels: the host's page coordinates plus the scroll offset of
    /// every strict ancestor that has a viewport, sized by the measured box
    /// plus the node's configured edge offsets, preserving the node's own
    /// scroll state.
    ///
    /// The first measurement, and any whose top-left differs from the last
    /// one, schedules a [`SETTLE_RETRY_DELAY`] re-measure instead of
    /// reporting; positions still settling after layout must be confirmed
    /// stable before visibility is derived from them. An unchanged top-left
    /// runs a visibility pass rooted at this node.
    ///
    /// Answers for nodes destroyed in the meantime are dropped.
    pub fn apply_measurement(&mut self, id: NodeId, measured: MeasuredBox) -> HostWork {
        let mut work = HostWork::default();
        if !self.is_alive(id) {
            return work;
        }
        let Some((width, height, page_x, page_y)) = measured.geometry() else {
            self.node_mut(id).is_clipped = true;
            return work;
        };

        // Compose the page coordinates into the root's absolute space by
        // adding every measured strict ancestor's scroll displacement.
        let mut origin = PxVec::new(round_px(page_x), round_px(page_y));
        let mut current = self.node(id).parent;
        while let Some(ancestor) = current {
            let node = self.node(ancestor);
            if let Some(viewport) = node.viewport {
                origin += viewport.scroll;
            }
            current = node.parent;
        }

        let node = self.node_mut(id);
        let rect = PxRect::new(
            origin.dx,
            origin.dy,
            origin
                .dx
                .saturating_add(round_px(width))
                .saturating_add(node.width_offset),
            origin
                .dy
                .saturating_add(round_px(height))
                .saturating_add(node.height_offset),
        );
        let scroll = node.viewport.map_or(PxVec::ZERO, |vp| vp.scroll);
        node.viewport = Some(Viewport::with_scroll(rect, scroll));
        node.is_clipped = false;

        let settled = node.settled_origin == Some((origin.dx, origin.dy));
        node.settled_origin = Some((origin.dx, origin.dy));
        if settled {
            self.propagate(id, None, &mut work);
        } else {
            work.push_measure(id, SETTLE_RETRY_DELAY);
        }
        work
    }

    /// Host scroll notification for a scrollable node.
    ///
    /// Rebuilds the node's window from the reported visible content size plus
    /// the configured edge offsets and records the rounded content offset as
    /// the node's scroll state. A visibility pass always runs: scrolling can
    /// change descendant visibility without any descendant re-measuring.
    pub fn on_scroll(&mut self, id: NodeId, event: &ScrollEvent) -> HostWork {
        let mut work = HostWork::default();
        let Some(node) = self.node_opt_mut(id) else {
            return work;
        };
        if let Some(viewport) = node.viewport {
            let rect = PxRect::new(
                viewport.rect.x0,
                viewport.rect.y0,
                viewport
                    .rect
                    .x0
                    .saturating_add(round_px(event.layout_measurement.width))
                    .saturating_add(node.width_offset),
                viewport
                    .rect
                    .y0
                    .saturating_add(round_px(event.layout_measurement.height))
                    .saturating_add(node.height_offset),
            );
            let scroll = PxVec::new(
                round_px(event.content_offset.x),
                round_px(event.content_offset.y),
            );
            node.viewport = Some(Viewport::with_scroll(rect, scroll));
        }
        self.propagate(id, None, &mut work);
        work
    }

    /// Host viewability notification for a virtualized list node.
    ///
    /// Replaces the node's viewable-key set with the reported one and runs a
    /// visibility pass. A payload without `viewable_items` is a no-op; the
    /// host had nothing to say, which is different from "nothing viewable".
    pub fn on_viewable_items_changed(&mut self, id: NodeId, info: &ViewableItemsInfo) -> HostWork {
        let mut work = HostWork::default();
        let Some(items) = &info.viewable_items else {
            return work;
        };
        let Some(node) = self.node_opt_mut(id) else {
            return work;
        };
        node.visible_children = items
            .iter()
            .map(|item| item.key.clone())
            .collect::<HashSet<_>>();
        self.propagate(id, None, &mut work);
        work
    }
}
