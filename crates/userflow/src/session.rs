//! Per-diagram session: load pipeline plus interaction plumbing.

use crate::source::FlowDataSource;
use crate::{Engine, RenderedFlow, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use userflow_render::events::{ClickRegistry, FlowHit, hit_test};

/// Owns the click registry and guards against overlapping loads.
///
/// Each `load` call takes a fresh generation number; a load that finishes
/// after a newer one has started is discarded instead of clobbering it, so
/// the latest request always wins deterministically.
#[derive(Debug)]
pub struct FlowSession {
    engine: Engine,
    clicks: Arc<ClickRegistry>,
    generation: AtomicU64,
    loading: AtomicBool,
}

impl FlowSession {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            clicks: Arc::new(ClickRegistry::new()),
            generation: AtomicU64::new(0),
            loading: AtomicBool::new(false),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The click-handler slot. Hosts register on init and unregister on
    /// teardown; clicks reported while the slot is empty are dropped.
    pub fn clicks(&self) -> &Arc<ClickRegistry> {
        &self.clicks
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Fetches a payload and runs it through the pipeline.
    ///
    /// `Ok(None)` means either an empty dataset or a stale load (a newer load
    /// started while this one's fetch was in flight). Fetch failures are
    /// logged and returned. Only the load whose generation is still current
    /// clears the loading flag; a stale load finishing leaves it set for the
    /// newer load still in flight.
    pub async fn load<S: FlowDataSource>(&self, source: &S) -> Result<Option<RenderedFlow>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.loading.store(true, Ordering::SeqCst);
        let result = self.load_generation(source, generation).await;
        if self.generation.load(Ordering::SeqCst) == generation {
            self.loading.store(false, Ordering::SeqCst);
        }
        result
    }

    async fn load_generation<S: FlowDataSource>(
        &self,
        source: &S,
        generation: u64,
    ) -> Result<Option<RenderedFlow>> {
        let payload = match source.fetch().await {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "user-flow fetch failed");
                return Err(err);
            }
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::warn!(generation, "discarding stale user-flow load");
            return Ok(None);
        }
        self.engine.render_payload(&payload)
    }

    /// Routes a pointer click in chart coordinates to the registered handler:
    /// node rects emit the node, dropout bars emit the link's target with the
    /// dropout flag. Returns what was hit, if anything.
    pub fn report_click(&self, rendered: &RenderedFlow, x: f64, y: f64) -> Option<FlowHit> {
        let hit = hit_test(&rendered.scene, x, y)?;
        match hit {
            FlowHit::Node { node_index } => {
                self.clicks.node_clicked(&rendered.graph.nodes[node_index]);
            }
            FlowHit::DropoutBar { target, .. } => {
                self.clicks.dropout_clicked(&rendered.graph.nodes[target]);
            }
        }
        Some(hit)
    }
}
