// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node configuration: prop bags, reporting data, and inheritable callbacks.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::types::ItemKey;

/// A single configuration or reporting value.
///
/// This is the lowest common denominator of what hosts put in prop bags.
/// `Null` is meaningful only on input: it marks a value the host explicitly
/// cleared, and it never survives into [`ReportData`].
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// An explicitly absent value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Str(String),
}

impl From<bool> for PropValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for PropValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Str(String::from(v))
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A flat prop mapping handed over by the host per element.
pub type Props = BTreeMap<String, PropValue>;

/// Reporting payload attached to a node, and the argument type of report
/// callbacks. Never contains [`PropValue::Null`].
pub type ReportData = BTreeMap<String, PropValue>;

/// Prefix marking prop keys that carry reporting data rather than renderer
/// configuration.
pub const REPORT_PROP_PREFIX: &str = "report-";

/// Partition a prop bag into renderer props and reporting data.
///
/// Keys starting with [`REPORT_PROP_PREFIX`] are stripped from the bag; their
/// non-null values land in the returned [`ReportData`] under the unprefixed
/// name. Null-valued report keys are dropped entirely. Everything else is
/// passed through untouched for the host renderer.
pub fn split_report_props(props: Props) -> (Props, ReportData) {
    let mut rest = Props::new();
    let mut data = ReportData::new();
    for (key, value) in props {
        match key.strip_prefix(REPORT_PROP_PREFIX) {
            Some(name) => {
                if !matches!(value, PropValue::Null) {
                    data.insert(String::from(name), value);
                }
            }
            None => {
                rest.insert(key, value);
            }
        }
    }
    (rest, data)
}

/// The default data merge: shallow override, descendant keys win.
#[must_use]
pub fn merge_override(ancestor: &ReportData, own: &ReportData) -> ReportData {
    let mut merged = ancestor.clone();
    for (key, value) in own {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Callback fired with a node's merged data when it reports visible or is
/// pressed.
///
/// The engine is single-threaded by design, so callbacks are plain `Rc`
/// closures rather than `Send` ones.
pub type ReportCallback = Rc<dyn Fn(&ReportData)>;

/// Callback combining ancestor-accumulated data with a node's own data.
///
/// Receives the merged ancestor payload first and the node's local data
/// second; returns the payload for this node and, transitively, its
/// descendants.
pub type MergeCallback = Rc<dyn Fn(&ReportData, &ReportData) -> ReportData>;

/// A full configuration snapshot for one node.
///
/// Applying a snapshot via [`Tree::update_config`][crate::Tree::update_config]
/// replaces the previous one wholesale: a callback left `None` clears the
/// node-local slot so resolution falls back to the nearest ancestor or the
/// built-in default, and offsets left `None` reset to `0`.
#[derive(Clone, Default)]
pub struct NodeConfig {
    /// Node-local visible callback, or `None` to inherit.
    pub on_report_visible: Option<ReportCallback>,
    /// Node-local press callback, or `None` to inherit.
    pub on_report_press: Option<ReportCallback>,
    /// Node-local merge function, or `None` to inherit.
    pub on_merge_data: Option<MergeCallback>,
    /// Adjustment to the right edge of the node's box, in pixels. Non-finite
    /// values are treated as absent.
    pub width_offset: Option<f64>,
    /// Adjustment to the bottom edge of the node's box, in pixels.
    pub height_offset: Option<f64>,
    /// Marks the node as a virtualized-list item with this key.
    pub item_key: Option<ItemKey>,
    /// The raw prop bag; recognized `report-` keys are extracted on apply.
    pub props: Props,
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("on_report_visible", &self.on_report_visible.is_some())
            .field("on_report_press", &self.on_report_press.is_some())
            .field("on_merge_data", &self.on_merge_data.is_some())
            .field("width_offset", &self.width_offset)
            .field("height_offset", &self.height_offset)
            .field("item_key", &self.item_key)
            .field("props", &self.props)
            .finish()
    }
}
