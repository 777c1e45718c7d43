#![forbid(unsafe_code)]

//! `userflow` renders user-flow Sankey diagrams headlessly.
//!
//! The pipeline per load: decode a raw payload ([`userflow_core::payload`]),
//! normalize link weights, run the left-aligned Sankey layout, derive a
//! [`FlowScene`] of drawing instructions and emit SVG. [`FlowSession`] wraps
//! the pipeline with a data source, click-handler registry and overlapping-
//! load protection.

pub mod session;
pub mod source;

pub use session::FlowSession;
pub use source::{FileDataSource, FlowDataSource, HttpDataSource};
pub use userflow_core::{
    DROPOUT_NODE_NAME, FlowConfig, FlowLink, FlowNode, UserFlowGraph, decode_payload,
    normalize_links,
};
pub use userflow_render::{
    ClickRegistry, FlowClickEvent, FlowClickHandler, FlowHit, FlowScene, SankeyLayout,
    SvgRenderOptions, build_scene, hit_test, layout_user_flow, render_flow_svg,
};

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] userflow_core::Error),

    #[error(transparent)]
    Render(#[from] userflow_render::Error),

    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data source error: {message}")]
    Source { message: String },
}

impl Error {
    pub fn source_failed(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The output of one diagram load: the normalized graph, its scene, and the
/// emitted SVG. Replaced wholesale per load.
#[derive(Debug, Clone)]
pub struct RenderedFlow {
    pub graph: UserFlowGraph,
    pub scene: FlowScene,
    pub svg: String,
}

/// Stateless pipeline front-end. Sessions ([`FlowSession`]) add data sources
/// and interaction on top.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: FlowConfig,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FlowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Runs the full pipeline on a raw payload. `Ok(None)` means the dataset
    /// was empty; rendering is skipped without an error.
    pub fn render_payload(&self, payload: &Value) -> Result<Option<RenderedFlow>> {
        let graph = decode_payload(payload)?;
        self.render_graph(graph)
    }

    pub fn render_graph(&self, mut graph: UserFlowGraph) -> Result<Option<RenderedFlow>> {
        if graph.is_empty() {
            tracing::debug!("empty user-flow dataset, skipping render");
            return Ok(None);
        }
        normalize_links(&mut graph);
        let layout = layout_user_flow(&graph, &self.config)?;
        let scene = build_scene(&layout, &self.config);
        let svg = render_flow_svg(&scene, &SvgRenderOptions::default());
        Ok(Some(RenderedFlow { graph, scene, svg }))
    }
}
