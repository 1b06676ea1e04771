// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewshed Tree: an exposure-tracking region tree with exactly-once
//! visibility reporting.
//!
//! Viewshed Tree is a reusable building block for impression tracking in UIs:
//! it mirrors a host framework's hierarchy of tracked elements, follows the
//! tree as it scrolls, resizes, and mounts/unmounts, and decides which nodes
//! are currently geometrically visible within the intersection of all their
//! ancestors' viewports.
//!
//! - Represents a hierarchy of reporter and container nodes with per-node
//!   viewports, scroll offsets, and reporting configuration.
//! - Fires a one-time "became visible" callback per node per visibility
//!   session, plus on-demand "pressed" callbacks.
//! - Lets each node inherit and merge a reporting data payload from its
//!   ancestors.
//! - Supports virtualized lists: item nodes whose visibility is driven by the
//!   host's viewable-key reports rather than geometry.
//!
//! ## Not a layout engine
//!
//! This crate does not render, lay out, measure, or dispatch input. The host
//! owns all of that and feeds the tree its layout, scroll, press, and
//! viewability events. Measurement in particular stays a host primitive: the
//! engine asks for it by returning [`MeasureRequest`]s from its entry points
//! and the host answers via [`Tree::apply_measurement`] whenever the platform
//! gets around to it.
//!
//! ## Coordinate model
//!
//! The host hands over floating-point page coordinates; the engine rounds
//! them once at the boundary and computes in whole screen pixels from then on
//! (see [`viewshed_geom`]). Every node's [`Viewport`][viewshed_geom::Viewport]
//! lives in one absolute space, the root's, so clipping a node against an
//! ancestor is a translate-then-intersect over integer rectangles.
//!
//! ## API overview
//!
//! - [`Tree`]: the arena owning all nodes; every operation takes a [`NodeId`].
//! - [`NodeFlags`]: node roles ([`REPORTER`][NodeFlags::REPORTER],
//!   [`CONTAINER`][NodeFlags::CONTAINER]) and visibility policies
//!   ([`OFFSET_ONLY`][NodeFlags::OFFSET_ONLY],
//!   [`ALWAYS_DESCEND`][NodeFlags::ALWAYS_DESCEND]).
//! - [`NodeConfig`] / [`Props`] / [`PropValue`]: the configuration snapshot
//!   contract, including `report-` prefixed data extraction.
//! - [`LayoutEvent`], [`ScrollEvent`], [`ViewableItemsInfo`], [`MeasuredBox`]:
//!   host event payloads.
//! - [`HostWork`] / [`MeasureRequest`]: deferred measurements the host must
//!   perform on the engine's behalf.
//!
//! Key operations:
//! - [`Tree::insert`] / [`Tree::remove`] — mount and unmount tracked elements.
//! - [`Tree::update_config`] — apply a configuration snapshot, returning the
//!   props left over for the host renderer.
//! - [`Tree::on_layout`] / [`Tree::apply_measurement`] / [`Tree::on_scroll`] /
//!   [`Tree::on_viewable_items_changed`] / [`Tree::on_press`] — host events.
//! - [`Tree::show`] / [`Tree::hide`] / [`Tree::refresh`] — visibility-session
//!   control.
//! - [`Tree::report_visible`] — run a visibility pass by hand.
//! - [`Tree::merged_data`] — a node's ancestor-merged reporting payload.
//!
//! ## Reporting model
//!
//! A reporter node fires its resolved `on_report_visible` callback at most
//! once per visibility session, the interval between two visited-state resets
//! ([`Tree::hide`] or [`Tree::refresh`]). Repeated scroll and layout events
//! with unchanged geometry are idempotent. Nodes degrade to "not yet visible"
//! on every failure: missing geometry, unsettled position, missing ancestor
//! bounds, and stale identifiers all suppress reporting rather than erroring.
//!
//! ## Examples
//!
//! - `demos/examples/scripted_scroll.rs`: drives nested scroll containers and
//!   a virtualized list from a scripted host and prints each report.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod host;
mod measure;
mod tree;
mod types;
mod visibility;

pub use config::{
    MergeCallback, NodeConfig, PropValue, Props, REPORT_PROP_PREFIX, ReportCallback, ReportData,
    merge_override, split_report_props,
};
pub use host::{
    HostWork, LayoutEvent, MeasureRequest, MeasuredBox, SETTLE_RETRY_DELAY, ScrollEvent,
    ViewableItem, ViewableItemsInfo,
};
pub use tree::Tree;
pub use types::{ElementHandle, ItemKey, NodeFlags, NodeId};
