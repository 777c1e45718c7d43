//! Link-value normalization.
//!
//! Link weights arrive as raw transition counts that vary wildly between
//! datasets. Rendering wants a stable scale, so values are rescaled to the
//! percentile of the dataset's maximum: after normalization the largest link
//! is exactly 100 and every other value sits in `[0, 100]`.

use crate::model::UserFlowGraph;

/// Rescales every link value to `round(value / max * 100)`.
///
/// An empty link set, or one whose maximum is zero, is left untouched; the
/// unguarded division would turn every value into NaN.
pub fn normalize_links(graph: &mut UserFlowGraph) {
    let max_value = graph
        .links
        .iter()
        .map(|l| l.value)
        .fold(f64::NEG_INFINITY, f64::max);
    if !(max_value > 0.0) {
        return;
    }
    tracing::debug!(max_value, links = graph.links.len(), "normalizing link values");
    for link in &mut graph.links {
        link.value = (link.value / max_value * 100.0).round();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlowLink, FlowNode};

    fn graph_with_values(values: &[f64]) -> UserFlowGraph {
        UserFlowGraph {
            nodes: vec![FlowNode::new("a", 0.0), FlowNode::new("b", 0.0)],
            links: values
                .iter()
                .map(|&value| FlowLink {
                    source: 0,
                    target: 1,
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn max_becomes_exactly_100() {
        let mut g = graph_with_values(&[25.0, 50.0, 200.0]);
        normalize_links(&mut g);
        let values: Vec<f64> = g.links.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![13.0, 25.0, 100.0]);
        assert!(values.iter().all(|&v| (0.0..=100.0).contains(&v)));
    }

    #[test]
    fn empty_link_set_is_a_no_op() {
        let mut g = graph_with_values(&[]);
        normalize_links(&mut g);
        assert!(g.links.is_empty());
    }

    #[test]
    fn zero_max_is_a_no_op() {
        let mut g = graph_with_values(&[0.0, 0.0]);
        normalize_links(&mut g);
        assert_eq!(g.links[0].value, 0.0);
        assert_eq!(g.links[1].value, 0.0);
    }
}
