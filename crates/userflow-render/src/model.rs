use serde::{Deserialize, Serialize};

/// A laid-out node: column band `x0..x1`, vertical extent `y0..y1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    pub name: String,
    pub index: usize,
    pub layer: usize,
    /// Aggregate flow through the node (max of in/out sums).
    pub value: f64,
    /// Dropout-stacking threshold carried over from the source data.
    pub drop: f64,
    /// Outgoing link indices in their stacking order. Dropout bar offsets
    /// accumulate over this order.
    pub source_links: Vec<usize>,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutLink {
    pub index: usize,
    pub source: usize,
    pub target: usize,
    pub value: f64,
    /// Rendered ribbon thickness in layout units.
    pub width: f64,
    /// Vertical midpoint at the source end.
    pub y0: f64,
    /// Vertical midpoint at the target end.
    pub y1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SankeyLayout {
    pub width: f64,
    pub height: f64,
    pub node_width: f64,
    pub node_padding: f64,
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
}

impl LayoutNode {
    pub fn is_dropout(&self) -> bool {
        self.name
            .eq_ignore_ascii_case(userflow_core::DROPOUT_NODE_NAME)
    }
}

impl SankeyLayout {
    pub fn node(&self, index: usize) -> &LayoutNode {
        &self.nodes[index]
    }
}

/// One interaction-count label above a column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderLabel {
    pub x: f64,
    pub text: String,
}

/// A flow ribbon between two non-dropout nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRibbon {
    pub link_index: usize,
    pub source: usize,
    pub target: usize,
    /// Cubic bezier path in SVG `d` syntax.
    pub path: String,
    pub stroke_width: f64,
    pub tooltip: String,
}

/// A dropout link rendered as a solid bar hanging off its source column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropoutBar {
    pub link_index: usize,
    pub source: usize,
    /// The dropout sentinel node this bar stands in for.
    pub target: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRect {
    pub node_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeLabel {
    pub node_index: usize,
    pub x: f64,
    pub y: f64,
    /// Truncated display text; `full_text` backs the tooltip.
    pub text: String,
    pub full_text: String,
}

/// The render instructions for one diagram load.
///
/// A scene is a value object: recomputed wholesale per load and handed to the
/// rendering boundary, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowScene {
    pub width: f64,
    pub height: f64,
    pub header_height: f64,
    pub interactions: usize,
    pub headers: Vec<HeaderLabel>,
    pub ribbons: Vec<FlowRibbon>,
    pub dropout_bars: Vec<DropoutBar>,
    pub node_rects: Vec<NodeRect>,
    pub node_labels: Vec<NodeLabel>,
}
