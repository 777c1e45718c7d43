#![forbid(unsafe_code)]

//! User-flow Sankey data model (headless).
//!
//! Decodes raw analytics payloads into a typed graph and normalizes link
//! weights for rendering. Layout and presentation live in `userflow-render`;
//! this crate has no drawing concern.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod payload;

pub use config::FlowConfig;
pub use error::{Error, Result};
pub use model::{DROPOUT_NODE_NAME, FlowLink, FlowNode, UserFlowGraph};
pub use normalize::normalize_links;
pub use payload::decode_payload;
