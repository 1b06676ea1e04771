// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the exposure tree: node identifiers, roles, and host handles.

use alloc::string::String;

/// Identifier for a node in the tree (generational).
///
/// Identifiers are never revived: destroying a node bumps its slot's
/// generation, so a held `NodeId` for it keeps testing stale forever. Host
/// callbacks that race destruction (a measurement result or retry timer
/// landing after the element unmounted) therefore degrade to no-ops.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node roles and per-node visibility policies, fixed at insertion.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node may fire the visible callback.
        const REPORTER = 0b0000_0001;
        /// Node clips and scroll-offsets its descendants during visibility
        /// computation (roughly, layout-bearing nodes).
        const CONTAINER = 0b0000_0010;
        /// Non-clipping ancestor that still contributes its scroll offset to
        /// descendants' visibility computation. Ignored on containers, which
        /// always contribute both.
        const OFFSET_ONLY = 0b0000_0100;
        /// Container descends into its children even when it is itself
        /// determined not visible, instead of pruning the subtree.
        const ALWAYS_DESCEND = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    /// A plain pass-through wrapper: neither reports nor clips.
    fn default() -> Self {
        Self::empty()
    }
}

/// Opaque host element token, recorded from layout events and echoed back in
/// measure requests.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Key identifying one entry of a virtualized list, as reported by the
/// host's viewability events and configured on item-reporter nodes.
pub type ItemKey = String;
