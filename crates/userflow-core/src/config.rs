use serde::{Deserialize, Serialize};

/// Rendering constants for the flow diagram. Defaults reproduce the observed
/// production values; a host may override any of them via config JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Horizontal thickness of a node band in layout units.
    pub node_width: f64,
    /// Minimum vertical gap between nodes in the same column.
    pub node_padding: f64,
    /// Horizontal budget per interaction column; total diagram width is
    /// `interactions * column_span`.
    pub column_span: f64,
    /// Fixed diagram height in layout units.
    pub height: f64,
    /// Node labels longer than this are truncated with an ellipsis.
    pub label_limit: usize,
    /// Height of the interaction-header strip above the diagram.
    pub header_height: f64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            node_width: 15.0,
            node_padding: 10.0,
            column_span: 320.0,
            height: 500.0,
            label_limit: 20,
            header_height: 20.0,
        }
    }
}
