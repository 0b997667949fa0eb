use super::{run_once, Engine};
use crate::discover::Discoverer;
use crate::result::DiscoveryResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// An engine that runs every configured discoverer exactly once,
/// concurrently, and closes the results channel when all passes have
/// finished.
///
/// Results arrive in completion order, not configuration order. A discoverer
/// that ignores the shutdown token and blocks forever keeps the engine from
/// completing; honoring cancellation is a correctness requirement on every
/// [`Discoverer`] implementation, not something the engine can defend
/// against.
pub struct OneOffEngine {
    discoverers: Vec<Arc<dyn Discoverer>>,
}

impl OneOffEngine {
    pub fn new() -> Self {
        Self {
            discoverers: Vec::new(),
        }
    }

    /// Add a discoverer to the engine's single run.
    pub fn with_discoverer(mut self, discoverer: Arc<dyn Discoverer>) -> Self {
        self.discoverers.push(discoverer);
        self
    }

    /// Add several discoverers to the engine's single run.
    pub fn with_discoverers(
        mut self,
        discoverers: impl IntoIterator<Item = Arc<dyn Discoverer>>,
    ) -> Self {
        self.discoverers.extend(discoverers);
        self
    }
}

impl Default for OneOffEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for OneOffEngine {
    async fn run(self, shutdown: CancellationToken, results: mpsc::Sender<DiscoveryResult>) {
        let mut passes = JoinSet::new();
        for discoverer in self.discoverers {
            passes.spawn(run_once(
                discoverer,
                shutdown.child_token(),
                results.clone(),
            ));
        }

        // the engine's own sender is dropped here; the clones held by the
        // passes keep the channel open until the last pass completes
        drop(results);

        while let Some(joined) = passes.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "discovery pass task failed");
            }
        }
    }
}
