use crate::discover::Discoverer;
use crate::result::DiscoveryResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Submodule declarations
pub mod continuous;
pub mod oneoff;

/// An entity capable of managing discovery jobs.
///
/// An engine has three responsibilities:
/// - Write zero or more results to the channel
/// - Drop its end of the channel as soon as it is done with it, so the
///   receiver observes closure
/// - Exit gracefully when the shutdown token fires
#[async_trait]
pub trait Engine {
    async fn run(self, shutdown: CancellationToken, results: mpsc::Sender<DiscoveryResult>);
}

/// Run one discovery pass of one discoverer and forward its result.
pub(crate) async fn run_once(
    discoverer: Arc<dyn Discoverer>,
    shutdown: CancellationToken,
    results: mpsc::Sender<DiscoveryResult>,
) {
    let discoverer_id = discoverer.id().to_string();
    tracing::debug!(%discoverer_id, "starting discovery pass");

    let result = discoverer.discover(shutdown).await;

    if results.send(result).await.is_err() {
        tracing::warn!(%discoverer_id, "results receiver dropped; discarding result");
    }
}
