//! Application state shared by the handlers.

use std::sync::{Arc, OnceLock};

use multiroute_core::{MultimodalGraph, routing::CostModel};
use tokio::sync::Semaphore;

/// The graph is built after the listener is up, so it starts out empty
/// and is set exactly once. Handlers treat an empty cell as "not ready".
#[derive(Clone)]
pub struct AppState {
    graph: Arc<OnceLock<MultimodalGraph>>,
    pub cost: Arc<CostModel>,
    /// Permits for running searches. A permit lives as long as the blocking
    /// search, which outlives its request when the request times out.
    pub(crate) searches: Arc<Semaphore>,
}

impl AppState {
    pub fn new(cost: CostModel, max_searches: usize) -> Self {
        Self {
            graph: Arc::new(OnceLock::new()),
            cost: Arc::new(cost),
            searches: Arc::new(Semaphore::new(max_searches)),
        }
    }

    /// State with an already built graph
    pub fn with_graph(graph: MultimodalGraph, cost: CostModel, max_searches: usize) -> Self {
        let state = Self::new(cost, max_searches);
        state.set_graph(graph);
        state
    }

    pub fn graph(&self) -> Option<&MultimodalGraph> {
        self.graph.get()
    }

    pub fn is_ready(&self) -> bool {
        self.graph.get().is_some()
    }

    /// Publishes the built graph. Returns `false` if a graph was already set.
    pub fn set_graph(&self, graph: MultimodalGraph) -> bool {
        self.graph.set(graph).is_ok()
    }
}
