// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility computation and the reporting pass.

use hashbrown::HashSet;

use crate::host::HostWork;
use crate::types::{ItemKey, NodeFlags, NodeId};

impl crate::Tree {
    /// Geometric visibility of a node within its ancestors' viewports.
    ///
    /// The node's own rectangle is clipped against every
    /// [`CONTAINER`][NodeFlags::CONTAINER] ancestor's window, each translated
    /// by the scroll offset accumulated from the node outward.
    /// [`OFFSET_ONLY`][NodeFlags::OFFSET_ONLY] ancestors contribute their
    /// scroll without clipping; other ancestors are skipped. The node is
    /// visible iff the fully clipped rectangle still overlaps its own.
    ///
    /// False without proof: a node with no viewport of its own, a container
    /// ancestor with no viewport yet, or any ancestor currently awaiting
    /// re-measurement makes the node not visible.
    ///
    /// Item-reporter nodes are not judged by this predicate during a pass;
    /// their visibility comes from the host's viewable-key reports.
    pub fn is_visible(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let node = self.node(id);
        let Some(viewport) = node.viewport else {
            return false;
        };

        let mut clipped = viewport.rect;
        let mut offset = viewport.scroll;
        let mut current = node.parent;
        while let Some(ancestor_id) = current {
            let ancestor = self.node(ancestor_id);
            if ancestor.is_clipped {
                return false;
            }
            if ancestor.flags.contains(NodeFlags::CONTAINER) {
                let Some(ancestor_viewport) = ancestor.viewport else {
                    return false;
                };
                offset += ancestor_viewport.scroll;
                clipped = clipped.intersect(&ancestor_viewport.rect.translate(offset));
            } else if ancestor.flags.contains(NodeFlags::OFFSET_ONLY)
                && let Some(ancestor_viewport) = ancestor.viewport
            {
                offset += ancestor_viewport.scroll;
            }
            current = ancestor.parent;
        }

        viewport.rect.overlaps(&clipped)
    }

    /// Run a visibility pass over the subtree rooted at `id`.
    ///
    /// Each entry point that can change visibility runs this internally;
    /// calling it by hand forces a re-evaluation, for hosts whose events
    /// the engine never sees (an ancestor animating into place, say).
    pub fn report_visible(&mut self, id: NodeId) -> HostWork {
        let mut work = HostWork::default();
        self.propagate(id, None, &mut work);
        work
    }

    /// Clear the hidden mark and re-derive visibility from current geometry.
    pub fn show(&mut self, id: NodeId) -> HostWork {
        let mut work = HostWork::default();
        let Some(node) = self.node_opt_mut(id) else {
            return work;
        };
        node.is_hidden = false;
        self.propagate(id, None, &mut work);
        work
    }

    /// Hide the subtree and end its visibility session.
    ///
    /// Reporting is suppressed under a hidden node, and every visited mark in
    /// the subtree is cleared so a later [`show`][Self::show] (or natural
    /// re-entry into view) starts a fresh session.
    pub fn hide(&mut self, id: NodeId) {
        let Some(node) = self.node_opt_mut(id) else {
            return;
        };
        node.is_hidden = true;
        self.clear_visited(id);
    }

    /// Start a fresh visibility session without hiding.
    ///
    /// Clears every visited mark in the subtree and immediately re-runs the
    /// pass, re-reporting whatever is currently visible. Used to force
    /// re-reporting after a pull-to-refresh style content swap.
    pub fn refresh(&mut self, id: NodeId) -> HostWork {
        let mut work = HostWork::default();
        if !self.is_alive(id) {
            return work;
        }
        self.clear_visited(id);
        self.propagate(id, None, &mut work);
        work
    }

    /// The visibility pass proper. Depth-first, parent before children, no
    /// traversal state outside node fields.
    ///
    /// `item_visible` is the hint for item-reporter nodes, supplied by the
    /// parent's viewable-key gate; geometry never decides for them.
    pub(crate) fn propagate(
        &mut self,
        id: NodeId,
        item_visible: Option<bool>,
        work: &mut HostWork,
    ) {
        if !self.is_alive(id) {
            return;
        }

        // A hidden node or ancestor suppresses the whole branch.
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if node.is_hidden {
                return;
            }
            current = node.parent;
        }

        // Clip recovery: without geometry this branch cannot be decided.
        // Ask for a re-measure and resume once it answers.
        if self.node(id).is_clipped {
            work.merge(self.measure(id));
            return;
        }

        let flags = self.node(id).flags;
        let self_visible = if self.node(id).item_key.is_some() {
            item_visible.unwrap_or(false)
        } else {
            self.is_visible(id)
        };

        if flags.contains(NodeFlags::REPORTER) && !self.node(id).is_visited && self_visible {
            self.node_mut(id).is_visited = true;
            let data = self.merged_data(id);
            match self.resolved_report_visible(id) {
                Some(callback) => callback(&data),
                None => log::debug!(target: "viewshed", "visible: {data:?}"),
            }
        }

        // An invisible container proves its descendants invisible.
        if flags.contains(NodeFlags::CONTAINER)
            && !flags.contains(NodeFlags::ALWAYS_DESCEND)
            && !self_visible
        {
            return;
        }

        let children = self.node(id).children.clone();
        if children.is_empty() {
            return;
        }
        // Two children sharing an item key must not both fire in one pass.
        let mut reported: HashSet<ItemKey> = HashSet::new();
        for child in children {
            if !self.is_alive(child) {
                continue;
            }
            match self.node(child).item_key.clone() {
                Some(key) => {
                    if self.node(id).visible_children.contains(&key) && reported.insert(key) {
                        self.propagate(child, Some(true), work);
                    }
                }
                None => self.propagate(child, None, work),
            }
        }
    }

    fn clear_visited(&mut self, id: NodeId) {
        self.node_mut(id).is_visited = false;
        let children = self.node(id).children.clone();
        for child in children {
            self.clear_visited(child);
        }
    }
}
