#![forbid(unsafe_code)]

//! Headless layout + presentation + SVG rendering for user-flow Sankey
//! diagrams.
//!
//! The pipeline: a normalized [`userflow_core::UserFlowGraph`] goes through
//! [`layout::layout_user_flow`] (left-aligned Sankey positions), then
//! [`scene::build_scene`] derives drawing instructions (ribbons, dropout bars,
//! headers, labels, hit regions), and [`svg::render_flow_svg`] emits a
//! standalone SVG document.

pub mod events;
pub mod layout;
pub mod model;
pub mod presentation;
pub mod scene;
pub mod svg;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid flow model: {message}")]
    InvalidModel { message: String },
    #[error("scene JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub use events::{ClickRegistry, FlowClickEvent, FlowClickHandler, FlowHit, hit_test};
pub use layout::layout_user_flow;
pub use model::{FlowScene, SankeyLayout};
pub use scene::build_scene;
pub use svg::{SvgRenderOptions, render_flow_svg};
