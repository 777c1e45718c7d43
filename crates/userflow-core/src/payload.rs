//! Wire payload decoding.
//!
//! Two payload shapes exist in the wild: a bare `{nodes, links}` document and
//! the analytics-API envelope `{resource: [{userFlowData: {nodes, links}}]}`.
//! Both decode to the same [`UserFlowGraph`]. Link endpoints may be node
//! indices or node names; both resolve to indices here so the rest of the
//! pipeline never touches strings for identity.

use crate::model::{FlowLink, FlowNode, UserFlowGraph};
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
struct WireNode {
    name: String,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    drop: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WireLink {
    source: Value,
    target: Value,
    value: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct WireGraph {
    nodes: Vec<WireNode>,
    #[serde(default)]
    links: Vec<WireLink>,
}

/// Decodes a raw payload in either observed wire shape.
pub fn decode_payload(payload: &Value) -> Result<UserFlowGraph> {
    let graph_value = extract_graph_value(payload)?;
    let wire: WireGraph = serde_json::from_value(Value::clone(graph_value))?;

    let mut index_by_name: FxHashMap<String, usize> = FxHashMap::default();
    let nodes: Vec<FlowNode> = wire
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| {
            index_by_name.entry(n.name.clone()).or_insert(i);
            FlowNode {
                name: n.name.clone(),
                value: n.value,
                drop: n.drop,
            }
        })
        .collect();

    let mut links = Vec::with_capacity(wire.links.len());
    for (i, l) in wire.links.iter().enumerate() {
        if !l.value.is_finite() || l.value < 0.0 {
            return Err(Error::shape(format!(
                "link {i} has a negative or non-finite value"
            )));
        }
        let source = resolve_endpoint(&l.source, &index_by_name, nodes.len(), i, "source")?;
        let target = resolve_endpoint(&l.target, &index_by_name, nodes.len(), i, "target")?;
        links.push(FlowLink {
            source,
            target,
            value: l.value,
        });
    }

    Ok(UserFlowGraph { nodes, links })
}

fn extract_graph_value(payload: &Value) -> Result<&Value> {
    if payload.get("nodes").is_some() {
        return Ok(payload);
    }
    if let Some(resource) = payload.get("resource") {
        let first = resource
            .as_array()
            .and_then(|a| a.first())
            .ok_or_else(|| Error::shape("`resource` is not a non-empty array"))?;
        return first
            .get("userFlowData")
            .ok_or_else(|| Error::shape("`resource[0].userFlowData` is missing"));
    }
    Err(Error::shape(
        "expected `nodes`/`links` at the top level or under `resource[0].userFlowData`",
    ))
}

fn resolve_endpoint(
    endpoint: &Value,
    index_by_name: &FxHashMap<String, usize>,
    node_count: usize,
    link_index: usize,
    role: &str,
) -> Result<usize> {
    match endpoint {
        Value::Number(n) => {
            let idx = n
                .as_u64()
                .ok_or_else(|| Error::shape(format!("link {link_index} {role} is not an index")))?
                as usize;
            if idx >= node_count {
                return Err(Error::shape(format!(
                    "link {link_index} {role} index {idx} is out of range ({node_count} nodes)"
                )));
            }
            Ok(idx)
        }
        Value::String(name) => index_by_name.get(name).copied().ok_or_else(|| {
            Error::shape(format!("link {link_index} {role} references unknown node {name:?}"))
        }),
        _ => Err(Error::shape(format!(
            "link {link_index} {role} must be a node index or name"
        ))),
    }
}
