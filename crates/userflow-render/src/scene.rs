//! Scene assembly: turns a laid-out graph into renderer-agnostic drawing
//! instructions. A scene is recomputed wholesale per data load; consumers swap
//! the previous scene for the new one instead of patching a live surface.

use crate::model::{DropoutBar, FlowRibbon, FlowScene, HeaderLabel, NodeLabel, NodeRect, SankeyLayout};
use crate::presentation::{column_order, dropout_bar_geometry, ordinal_label, truncate_label};
use crate::svg::fmt_num;
use userflow_core::FlowConfig;

/// Offset of a node's text label from the node's right edge.
const LABEL_OFFSET_X: f64 = 20.0;

pub fn build_scene(layout: &SankeyLayout, config: &FlowConfig) -> FlowScene {
    let columns = column_order(layout);
    let interactions = columns.len();

    let headers = columns
        .iter()
        .enumerate()
        .map(|(i, &x)| HeaderLabel {
            x,
            text: format!("{} interaction", ordinal_label(i + 1)),
        })
        .collect();

    let is_dropout = |node: usize| layout.node(node).is_dropout();

    let mut ribbons = Vec::new();
    let mut dropout_bars = Vec::new();
    for link in &layout.links {
        if is_dropout(link.target) {
            let geom = dropout_bar_geometry(layout, link);
            dropout_bars.push(DropoutBar {
                link_index: link.index,
                source: link.source,
                target: link.target,
                x: geom.x,
                y: geom.y,
                width: geom.width,
                height: geom.height,
                tooltip: format!(
                    "{}\nDropouts {}",
                    layout.node(link.source).name,
                    format_sessions(link.value)
                ),
            });
        } else {
            let source = layout.node(link.source);
            let target = layout.node(link.target);
            let sx = source.x1;
            let tx = target.x0;
            let mx = (sx + tx) / 2.0;
            let path = format!(
                "M{},{}C{},{},{},{},{},{}",
                fmt_num(sx),
                fmt_num(link.y0),
                fmt_num(mx),
                fmt_num(link.y0),
                fmt_num(mx),
                fmt_num(link.y1),
                fmt_num(tx),
                fmt_num(link.y1),
            );
            ribbons.push(FlowRibbon {
                link_index: link.index,
                source: link.source,
                target: link.target,
                path,
                stroke_width: link.width.max(1.0),
                tooltip: format!(
                    "{} \u{2192} {}\n{}",
                    source.name,
                    target.name,
                    format_sessions(link.value)
                ),
            });
        }
    }

    let mut node_rects = Vec::new();
    let mut node_labels = Vec::new();
    for node in &layout.nodes {
        if node.is_dropout() {
            continue;
        }
        node_rects.push(NodeRect {
            node_index: node.index,
            x: node.x0,
            y: node.y0,
            width: node.x1 - node.x0,
            height: node.y1 - node.y0,
            tooltip: format!("{}\n{}", node.name, format_sessions(node.value)),
        });
        node_labels.push(NodeLabel {
            node_index: node.index,
            x: node.x1 + LABEL_OFFSET_X,
            y: (node.y0 + node.y1) / 2.0,
            text: truncate_label(Some(&node.name), config.label_limit),
            full_text: node.name.clone(),
        });
    }

    FlowScene {
        width: layout.width,
        height: layout.height,
        header_height: config.header_height,
        interactions,
        headers,
        ribbons,
        dropout_bars,
        node_rects,
        node_labels,
    }
}

/// `d3.format(',.0f')` followed by the unit: `1234.0` → `"1,234 session(s)"`.
pub fn format_sessions(value: f64) -> String {
    let rounded = value.round().abs() as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value.round() < 0.0 {
        out.insert(0, '-');
    }
    out.push_str(" session(s)");
    out
}
