use serde::{Deserialize, Serialize};

/// Reserved node name marking the funnel-exit terminus. Comparison is
/// case-insensitive: upstream data files carry `"Dropout"`, `"dropout"`, etc.
pub const DROPOUT_NODE_NAME: &str = "dropout";

/// A single interaction step (page, screen, funnel stage) in the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub name: String,
    /// Aggregate flow count through this node.
    #[serde(default)]
    pub value: f64,
    /// Dropout-stacking threshold: outgoing links with at least this value
    /// stack above the node's dropout bar. `0` pins the bar to the node top.
    #[serde(default)]
    pub drop: f64,
}

impl FlowNode {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            drop: 0.0,
        }
    }

    pub fn is_dropout(&self) -> bool {
        self.name.eq_ignore_ascii_case(DROPOUT_NODE_NAME)
    }
}

/// A weighted transition between two nodes, addressed by node index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// The decoded dataset for one diagram load. Replaced wholesale on the next
/// load; never updated incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserFlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}

impl UserFlowGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Outgoing links of `node`, in their stored (stacking) order.
    pub fn outgoing(&self, node: usize) -> impl Iterator<Item = &FlowLink> {
        self.links.iter().filter(move |l| l.source == node)
    }
}
