// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, configuration, and the data merge
//! chain.

use alloc::vec::Vec;
use hashbrown::HashSet;
use viewshed_geom::{Viewport, round_opt};

use crate::config::{MergeCallback, NodeConfig, Props, ReportCallback, ReportData, merge_override, split_report_props};
use crate::types::{ElementHandle, ItemKey, NodeFlags, NodeId};

/// Exposure-tracking region tree.
///
/// The tree mirrors the host's hierarchy of tracked elements. The host feeds
/// it layout, scroll, press, and viewability events; the engine keeps a
/// per-node [`Viewport`] in a single absolute pixel space, decides which
/// reporter nodes became visible, and fires each node's resolved callback at
/// most once per visibility session.
///
/// Every mutating entry point returns a [`HostWork`][crate::HostWork] batch
/// of measurements for the host to perform; see
/// [`apply_measurement`][Self::apply_measurement] for the answering half.
///
/// ## Example
///
/// ```rust
/// use viewshed_tree::{NodeConfig, NodeFlags, Props, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(None, NodeFlags::CONTAINER);
/// let banner = tree.insert(Some(root), NodeFlags::REPORTER);
///
/// // Configure reporting data; unrecognized props pass through untouched.
/// let mut props = Props::new();
/// props.insert("report-screen".into(), "home".into());
/// props.insert("accessible".into(), true.into());
/// let rest = tree.update_config(banner, NodeConfig { props, ..NodeConfig::default() });
///
/// assert!(rest.contains_key("accessible"));
/// assert_eq!(tree.merged_data(banner).get("screen"), Some(&"home".into()));
/// ```
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct Node {
    pub(crate) generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) flags: NodeFlags,
    pub(crate) element: Option<ElementHandle>,
    pub(crate) viewport: Option<Viewport>,
    /// Last measured absolute top-left, for the settle check.
    pub(crate) settled_origin: Option<(i32, i32)>,
    pub(crate) visible_children: HashSet<ItemKey>,
    pub(crate) is_visited: bool,
    pub(crate) is_hidden: bool,
    pub(crate) is_clipped: bool,
    pub(crate) width_offset: i32,
    pub(crate) height_offset: i32,
    pub(crate) item_key: Option<ItemKey>,
    pub(crate) data: ReportData,
    pub(crate) on_report_visible: Option<ReportCallback>,
    pub(crate) on_report_press: Option<ReportCallback>,
    pub(crate) on_merge_data: Option<MergeCallback>,
}

impl Node {
    fn new(generation: u32, flags: NodeFlags) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            flags,
            element: None,
            viewport: None,
            settled_origin: None,
            visible_children: HashSet::new(),
            is_visited: false,
            is_hidden: false,
            is_clipped: false,
            width_offset: 0,
            height_offset: 0,
            item_key: None,
            data: ReportData::new(),
            on_report_visible: None,
            on_report_press: None,
            on_merge_data: None,
        }
    }
}

impl Tree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// Roles and visibility policies are fixed here; everything else is
    /// supplied later via [`Tree::update_config`] and host events.
    pub fn insert(&mut self, parent: Option<NodeId>, flags: NodeFlags) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, flags));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, flags)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            self.link_parent(id, p);
        }
        id
    }

    /// Remove a node and its whole subtree.
    ///
    /// All removed identifiers become stale immediately, which is what makes
    /// in-flight measurement answers and retry timers for them degrade to
    /// no-ops.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.unlink_parent(id, parent);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.remove(child);
        }
        self.nodes[id.idx()] = None;
        self.free_list.push(id.idx());
    }

    /// Apply a configuration snapshot and return the props left for the host
    /// renderer.
    ///
    /// Replacement is wholesale: callbacks and offsets not present in the
    /// snapshot are cleared, the item key is recomputed, and the node's
    /// reporting data is rebuilt from the `report-` prefixed props (which are
    /// stripped from the returned bag). A stale identifier returns the props
    /// unfiltered.
    pub fn update_config(&mut self, id: NodeId, config: NodeConfig) -> Props {
        let NodeConfig {
            on_report_visible,
            on_report_press,
            on_merge_data,
            width_offset,
            height_offset,
            item_key,
            props,
        } = config;
        let Some(node) = self.node_opt_mut(id) else {
            return props;
        };
        node.on_report_visible = on_report_visible;
        node.on_report_press = on_report_press;
        node.on_merge_data = on_merge_data;
        node.width_offset = round_opt(width_offset);
        node.height_offset = round_opt(height_offset);
        node.item_key = item_key;
        let (rest, data) = split_report_props(props);
        node.data = data;
        rest
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is considered live if its slot exists and its generation
    /// matches the current generation stored in that slot.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Returns the parent of a node if live, or `None` for roots or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).parent
    }

    /// Get the children of a node, or empty slice if node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        if !self.is_alive(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Returns the flags of a node if the identifier is live.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        if !self.is_alive(id) {
            return None;
        }
        Some(self.node(id).flags)
    }

    /// Returns the node's viewport, or `None` before first successful
    /// measurement and for stale identifiers.
    pub fn viewport(&self, id: NodeId) -> Option<Viewport> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).viewport
    }

    /// Returns the node's item key, if it is a virtualized-list item.
    pub fn item_key(&self, id: NodeId) -> Option<&ItemKey> {
        if !self.is_alive(id) {
            return None;
        }
        self.node(id).item_key.as_ref()
    }

    /// Returns the node's own (unmerged) reporting data for a live id.
    pub fn data(&self, id: NodeId) -> Option<&ReportData> {
        if !self.is_alive(id) {
            return None;
        }
        Some(&self.node(id).data)
    }

    /// True once the node has fired its visible callback during the current
    /// visibility session. False for stale identifiers.
    pub fn is_visited(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.node(id).is_visited
    }

    /// True while the node is explicitly hidden. False for stale identifiers.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.node(id).is_hidden
    }

    /// True while the last measurement came back without geometry. False for
    /// stale identifiers.
    pub fn is_clipped(&self, id: NodeId) -> bool {
        self.is_alive(id) && self.node(id).is_clipped
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// The node's reporting payload: its ancestors' data folded root-to-leaf
    /// through each level's resolved merge function, then merged with the
    /// node's own data.
    ///
    /// Recomputed from the live chain on every call, so ancestor edits are
    /// picked up without invalidation. Stale identifiers yield an empty
    /// payload.
    pub fn merged_data(&self, id: NodeId) -> ReportData {
        if !self.is_alive(id) {
            return ReportData::new();
        }
        let node = self.node(id);
        let ancestor = match node.parent {
            Some(parent) => self.merged_data(parent),
            None => ReportData::new(),
        };
        match self.resolved_merge(id) {
            Some(merge) => merge(&ancestor, &node.data),
            None => merge_override(&ancestor, &node.data),
        }
    }

    /// Invoke the node's resolved press callback with its merged data.
    ///
    /// Pressing never touches visited or visibility state.
    pub fn on_press(&self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        let data = self.merged_data(id);
        match self.resolved_report_press(id) {
            Some(callback) => callback(&data),
            None => log::debug!(target: "viewshed", "press: {data:?}"),
        }
    }

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling NodeId")
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling NodeId")
    }

    pub(crate) fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    /// Nearest visible-callback along the chain from `id` to the root.
    pub(crate) fn resolved_report_visible(&self, id: NodeId) -> Option<ReportCallback> {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if let Some(callback) = &node.on_report_visible {
                return Some(callback.clone());
            }
            current = node.parent;
        }
        None
    }

    /// Nearest press-callback along the chain from `id` to the root.
    pub(crate) fn resolved_report_press(&self, id: NodeId) -> Option<ReportCallback> {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if let Some(callback) = &node.on_report_press {
                return Some(callback.clone());
            }
            current = node.parent;
        }
        None
    }

    /// Nearest merge function along the chain from `id` to the root.
    pub(crate) fn resolved_merge(&self, id: NodeId) -> Option<MergeCallback> {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if let Some(callback) = &node.on_merge_data {
                return Some(callback.clone());
            }
            current = node.parent;
        }
        None
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        let parent_node = self.node_mut(parent);
        parent_node.children.push(id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    use super::Tree;
    use crate::config::{NodeConfig, PropValue, Props, ReportData};
    use crate::types::NodeFlags;

    fn props(entries: &[(&str, PropValue)]) -> Props {
        entries
            .iter()
            .map(|(k, v)| (String::from(*k), v.clone()))
            .collect()
    }

    #[test]
    fn liveness_insert_remove_reuse() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeFlags::CONTAINER);
        let child = tree.insert(Some(root), NodeFlags::REPORTER);
        assert!(tree.is_alive(child));
        assert_eq!(tree.parent_of(child), Some(root));

        tree.remove(child);
        assert!(!tree.is_alive(child));
        assert!(tree.children_of(root).is_empty());

        // The slot is reused with a new generation; the old id stays stale.
        let reused = tree.insert(Some(root), NodeFlags::REPORTER);
        assert!(tree.is_alive(reused));
        assert!(!tree.is_alive(child));
        assert_ne!(reused, child);
    }

    #[test]
    fn remove_takes_the_whole_subtree() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeFlags::CONTAINER);
        let mid = tree.insert(Some(root), NodeFlags::CONTAINER);
        let leaf = tree.insert(Some(mid), NodeFlags::REPORTER);
        assert_eq!(tree.node_count(), 3);

        tree.remove(mid);
        assert!(!tree.is_alive(mid));
        assert!(!tree.is_alive(leaf));
        assert!(tree.is_alive(root));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn stale_ids_degrade_on_every_accessor() {
        let mut tree = Tree::new();
        let node = tree.insert(None, NodeFlags::REPORTER);
        tree.remove(node);

        assert_eq!(tree.parent_of(node), None);
        assert!(tree.children_of(node).is_empty());
        assert_eq!(tree.flags(node), None);
        assert_eq!(tree.viewport(node), None);
        assert_eq!(tree.item_key(node), None);
        assert_eq!(tree.data(node), None);
        assert!(!tree.is_visited(node));
        assert!(!tree.is_hidden(node));
        assert!(!tree.is_clipped(node));
        assert!(tree.merged_data(node).is_empty());
    }

    #[test]
    fn update_config_extracts_report_props() {
        let mut tree = Tree::new();
        let node = tree.insert(None, NodeFlags::REPORTER);

        let rest = tree.update_config(
            node,
            NodeConfig {
                width_offset: Some(4.6),
                props: props(&[
                    ("report-screen", "home".into()),
                    ("report-gone", PropValue::Null),
                    ("title", "Hello".into()),
                ]),
                ..NodeConfig::default()
            },
        );

        assert_eq!(rest, props(&[("title", "Hello".into())]));
        let data = tree.data(node).cloned().unwrap_or_default();
        assert_eq!(data.len(), 1);
        assert_eq!(data.get("screen"), Some(&"home".into()));
    }

    #[test]
    fn update_config_replaces_wholesale() {
        let mut tree = Tree::new();
        let node = tree.insert(None, NodeFlags::REPORTER);

        tree.update_config(
            node,
            NodeConfig {
                item_key: Some(String::from("a")),
                width_offset: Some(10.0),
                props: props(&[("report-screen", "home".into())]),
                ..NodeConfig::default()
            },
        );
        assert_eq!(tree.item_key(node).map(String::as_str), Some("a"));

        // A later snapshot without those fields clears them.
        tree.update_config(node, NodeConfig::default());
        assert_eq!(tree.item_key(node), None);
        assert_eq!(tree.data(node).map(ReportData::len), Some(0));
    }

    #[test]
    fn merged_data_defaults_to_descendant_override() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeFlags::CONTAINER);
        let child = tree.insert(Some(root), NodeFlags::REPORTER);

        tree.update_config(
            root,
            NodeConfig {
                props: props(&[
                    ("report-screen", "home".into()),
                    ("report-section", "feed".into()),
                ]),
                ..NodeConfig::default()
            },
        );
        tree.update_config(
            child,
            NodeConfig {
                props: props(&[("report-section", "banner".into())]),
                ..NodeConfig::default()
            },
        );

        let merged = tree.merged_data(child);
        assert_eq!(merged.get("screen"), Some(&"home".into()));
        assert_eq!(merged.get("section"), Some(&"banner".into()));
    }

    #[test]
    fn merge_function_applies_from_its_level_down() {
        let mut tree = Tree::new();
        let root = tree.insert(None, NodeFlags::CONTAINER);
        let child = tree.insert(Some(root), NodeFlags::REPORTER);

        tree.update_config(
            root,
            NodeConfig {
                props: props(&[("report-id", "root".into())]),
                ..NodeConfig::default()
            },
        );
        // The child's merge joins id segments instead of overriding.
        tree.update_config(
            child,
            NodeConfig {
                on_merge_data: Some(Rc::new(|ancestor: &ReportData, own: &ReportData| {
                    let mut merged = ancestor.clone();
                    for (key, value) in own {
                        match (merged.get(key), value) {
                            (Some(PropValue::Str(a)), PropValue::Str(b)) => {
                                let mut joined = a.clone();
                                joined.push('.');
                                joined.push_str(b);
                                merged.insert(key.clone(), PropValue::Str(joined));
                            }
                            _ => {
                                merged.insert(key.clone(), value.clone());
                            }
                        }
                    }
                    merged
                })),
                props: props(&[("report-id", "banner".into())]),
                ..NodeConfig::default()
            },
        );

        assert_eq!(tree.merged_data(child).get("id"), Some(&"root.banner".into()));
        // The root itself still uses the default merge.
        assert_eq!(tree.merged_data(root).get("id"), Some(&"root".into()));
    }

    #[test]
    fn press_uses_nearest_ancestor_callback() {
        let mut tree = Tree::new();
        let seen: Rc<RefCell<Vec<ReportData>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let root = tree.insert(None, NodeFlags::CONTAINER);
        let child = tree.insert(Some(root), NodeFlags::REPORTER);
        tree.update_config(
            root,
            NodeConfig {
                on_report_press: Some(Rc::new(move |data: &ReportData| {
                    sink.borrow_mut().push(data.clone());
                })),
                props: props(&[("report-screen", "home".into())]),
                ..NodeConfig::default()
            },
        );
        tree.update_config(
            child,
            NodeConfig {
                props: props(&[("report-button", "buy".into())]),
                ..NodeConfig::default()
            },
        );

        tree.on_press(child);
        let reports = seen.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].get("screen"), Some(&"home".into()));
        assert_eq!(reports[0].get("button"), Some(&"buy".into()));
    }

    #[test]
    fn press_on_stale_or_unconfigured_node_is_silent() {
        let mut tree = Tree::new();
        let node = tree.insert(None, NodeFlags::REPORTER);
        // No callback anywhere in the chain: falls through to the log sink.
        tree.on_press(node);
        tree.remove(node);
        tree.on_press(node);
    }

    #[test]
    fn debug_reports_arena_occupancy() {
        let mut tree = Tree::new();
        let a = tree.insert(None, NodeFlags::CONTAINER);
        let _b = tree.insert(Some(a), NodeFlags::REPORTER);
        tree.remove(a);
        let repr = alloc::format!("{tree:?}");
        assert!(repr.contains("nodes_alive: 0"), "unexpected debug: {repr}");
        assert!(repr.contains("free_list: 2"), "unexpected debug: {repr}");
    }
}
