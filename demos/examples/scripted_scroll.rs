// Copyright 2025 the Viewshed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exposure tracking over a scripted host: scroll, virtualization, press.
//!
//! This example stands in for a real UI framework. It keeps a table of
//! scripted element boxes, answers the engine's measure requests from it, and
//! then plays a small session: a feed screen with a header, a promo banner
//! below the fold, and a virtualized list whose items report through
//! viewability events rather than geometry.
//!
//! Run:
//! - `cargo run -p viewshed_demos --example scripted_scroll`

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use kurbo::{Point, Size};
use viewshed_tree::{
    ElementHandle, HostWork, LayoutEvent, MeasureRequest, MeasuredBox, NodeConfig, NodeFlags,
    NodeId, PropValue, Props, ReportData, ScrollEvent, Tree, ViewableItem, ViewableItemsInfo,
};

/// The host side of the boundary: scripted geometry plus the measurement
/// queue. Delays are ignored; every request is answered on the next pump,
/// which is enough to settle origins (the script never moves elements
/// mid-measure).
struct ScriptedHost {
    boxes: HashMap<NodeId, MeasuredBox>,
    pending: VecDeque<MeasureRequest>,
}

impl ScriptedHost {
    fn new() -> Self {
        Self {
            boxes: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Mount an element: record its scripted box and deliver the layout
    /// event, as a framework would after first paint.
    fn mount(&mut self, tree: &mut Tree, id: NodeId, handle: u64, size: Size, page: Point) {
        self.boxes
            .insert(id, MeasuredBox::from_layout(Point::ZERO, size, page));
        let work = tree.on_layout(
            id,
            &LayoutEvent {
                target: ElementHandle(handle),
            },
        );
        self.queue(work);
    }

    fn queue(&mut self, work: HostWork) {
        self.pending.extend(work.measure);
    }

    /// Answer queued measure requests until the engine stops asking.
    fn pump(&mut self, tree: &mut Tree) {
        while let Some(request) = self.pending.pop_front() {
            let answer = self
                .boxes
                .get(&request.node)
                .copied()
                .unwrap_or(MeasuredBox::CLIPPED);
            let work = tree.apply_measurement(request.node, answer);
            self.pending.extend(work.measure);
        }
    }
}

fn print_report(kind: &str) -> Rc<dyn Fn(&ReportData)> {
    let kind = kind.to_string();
    Rc::new(move |data: &ReportData| {
        let fields: Vec<String> = data
            .iter()
            .map(|(key, value)| match value {
                PropValue::Str(s) => format!("{key}={s}"),
                other => format!("{key}={other:?}"),
            })
            .collect();
        println!("[{kind}] {}", fields.join(" "));
    })
}

fn report_props(entries: &[(&str, &str)]) -> Props {
    entries
        .iter()
        .map(|(key, value)| (format!("report-{key}"), PropValue::from(*value)))
        .collect()
}

fn main() {
    let mut tree = Tree::new();
    let mut host = ScriptedHost::new();

    // Screen-level container; everything below inherits its data.
    let screen = tree.insert(None, NodeFlags::CONTAINER);
    tree.update_config(
        screen,
        NodeConfig {
            on_report_visible: Some(print_report("visible")),
            on_report_press: Some(print_report("press")),
            props: report_props(&[("screen", "feed")]),
            ..NodeConfig::default()
        },
    );

    // A header at the top and a promo banner below the fold.
    let header = tree.insert(Some(screen), NodeFlags::REPORTER);
    tree.update_config(
        header,
        NodeConfig {
            props: report_props(&[("section", "header")]),
            ..NodeConfig::default()
        },
    );
    let banner = tree.insert(Some(screen), NodeFlags::REPORTER);
    tree.update_config(
        banner,
        NodeConfig {
            // A custom merge that joins section path segments instead of
            // overriding them.
            on_merge_data: Some(Rc::new(|ancestor: &ReportData, own: &ReportData| {
                let mut merged = ancestor.clone();
                for (key, value) in own {
                    match (merged.get(key), value) {
                        (Some(PropValue::Str(a)), PropValue::Str(b)) => {
                            merged.insert(key.clone(), PropValue::Str(format!("{a}/{b}")));
                        }
                        _ => {
                            merged.insert(key.clone(), value.clone());
                        }
                    }
                }
                merged
            })),
            props: report_props(&[("screen", "promo"), ("section", "banner")]),
            ..NodeConfig::default()
        },
    );

    // A virtualized list; its items report by key, not by geometry.
    let list = tree.insert(Some(screen), NodeFlags::CONTAINER);
    for key in ["story-1", "story-2", "story-3"] {
        let item = tree.insert(Some(list), NodeFlags::REPORTER);
        tree.update_config(
            item,
            NodeConfig {
                item_key: Some(key.to_string()),
                props: report_props(&[("story", key)]),
                ..NodeConfig::default()
            },
        );
    }

    // Mount everything. The screen window is 400x800; the banner sits at
    // y=900, below the fold.
    host.mount(&mut tree, screen, 1, Size::new(400.0, 800.0), Point::ZERO);
    host.mount(
        &mut tree,
        header,
        2,
        Size::new(400.0, 80.0),
        Point::new(0.0, 0.0),
    );
    host.mount(
        &mut tree,
        banner,
        3,
        Size::new(400.0, 200.0),
        Point::new(0.0, 900.0),
    );
    host.mount(
        &mut tree,
        list,
        4,
        Size::new(400.0, 600.0),
        Point::new(0.0, 100.0),
    );
    host.pump(&mut tree);

    println!("-- after mount (header visible, banner below the fold)");

    // The list tells us which items are on screen.
    host.queue(tree.on_viewable_items_changed(
        list,
        &ViewableItemsInfo {
            viewable_items: Some(vec![
                ViewableItem {
                    key: "story-1".into(),
                },
                ViewableItem {
                    key: "story-2".into(),
                },
            ]),
        },
    ));
    host.pump(&mut tree);

    println!("-- scrolling down 400px brings the banner in");
    host.queue(tree.on_scroll(
        screen,
        &ScrollEvent {
            content_offset: Point::new(0.0, 400.0),
            layout_measurement: Size::new(400.0, 800.0),
        },
    ));
    host.pump(&mut tree);

    println!("-- pressing the banner");
    tree.on_press(banner);

    println!("-- pull to refresh re-reports the current view");
    host.queue(tree.refresh(screen));
    host.pump(&mut tree);
}
