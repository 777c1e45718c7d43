//! Click contract between the rendered diagram and its host.
//!
//! The original integration parked a callback in a global slot that the chart
//! invoked from inside the drawing library's event handler. Here the contract
//! is an explicit registry: the host registers a handler, the rendering
//! boundary reports clicks through [`ClickRegistry`], and the host wraps the
//! callback in whatever execution context its UI needs. Invocation is always
//! synchronous; an absent handler is a no-op.

use crate::model::FlowScene;
use std::sync::{Arc, Mutex};
use userflow_core::FlowNode;

/// Payload delivered to the host on a click. Dropout clicks carry the link's
/// target node (the sentinel) with the flag set.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowClickEvent {
    pub node: FlowNode,
    pub is_dropout: bool,
}

pub trait FlowClickHandler: Send + Sync {
    fn on_click(&self, event: &FlowClickEvent);
}

impl<F> FlowClickHandler for F
where
    F: Fn(&FlowClickEvent) + Send + Sync,
{
    fn on_click(&self, event: &FlowClickEvent) {
        self(event)
    }
}

/// Host-facing handler slot. Registered on session init, cleared on teardown;
/// emitting with no handler registered does nothing.
#[derive(Default)]
pub struct ClickRegistry {
    handler: Mutex<Option<Arc<dyn FlowClickHandler>>>,
}

impl ClickRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn FlowClickHandler>) {
        *self.handler.lock().expect("click handler lock") = Some(handler);
    }

    pub fn unregister(&self) {
        *self.handler.lock().expect("click handler lock") = None;
    }

    pub fn is_registered(&self) -> bool {
        self.handler.lock().expect("click handler lock").is_some()
    }

    /// Reports a click on an interaction node.
    pub fn node_clicked(&self, node: &FlowNode) {
        self.emit(FlowClickEvent {
            node: node.clone(),
            is_dropout: false,
        });
    }

    /// Reports a click on a dropout bar; `target` is the dropout sentinel the
    /// clicked link points at.
    pub fn dropout_clicked(&self, target: &FlowNode) {
        self.emit(FlowClickEvent {
            node: target.clone(),
            is_dropout: true,
        });
    }

    fn emit(&self, event: FlowClickEvent) {
        let handler = self.handler.lock().expect("click handler lock").clone();
        if let Some(handler) = handler {
            handler.on_click(&event);
        }
    }
}

impl std::fmt::Debug for ClickRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickRegistry")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// What a pointer position lands on within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowHit {
    Node { node_index: usize },
    DropoutBar { link_index: usize, target: usize },
}

/// Maps a point in chart coordinates (header strip excluded) to the clickable
/// geometry under it. Dropout bars win over node rects since they overlay the
/// source column's right edge.
pub fn hit_test(scene: &FlowScene, x: f64, y: f64) -> Option<FlowHit> {
    for bar in &scene.dropout_bars {
        if contains(bar.x, bar.y, bar.width, bar.height, x, y) {
            return Some(FlowHit::DropoutBar {
                link_index: bar.link_index,
                target: bar.target,
            });
        }
    }
    for rect in &scene.node_rects {
        if contains(rect.x, rect.y, rect.width, rect.height, x, y) {
            return Some(FlowHit::Node {
                node_index: rect.node_index,
            });
        }
    }
    None
}

fn contains(rx: f64, ry: f64, rw: f64, rh: f64, x: f64, y: f64) -> bool {
    x >= rx && x <= rx + rw && y >= ry && y <= ry + rh
}
