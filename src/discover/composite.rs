use super::Discoverer;
use crate::result::DiscoveryResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const DEFAULT_MULTIPLE_UPSTREAM_DISCOVERER_ID: &str = "multiple_upstream_discoverer";

/// A discoverer which under the hood fans out to multiple upstream
/// discoverers and merges their outputs into a single result.
///
/// Because it is itself a [`Discoverer`], composites nest: a composite can be
/// a child of another composite, or a leaf scheduled by an engine.
pub struct MultipleUpstreamDiscoverer {
    discoverer_id: String,
    upstreams: Vec<Arc<dyn Discoverer>>,
}

impl MultipleUpstreamDiscoverer {
    pub fn new() -> Self {
        Self {
            discoverer_id: DEFAULT_MULTIPLE_UPSTREAM_DISCOVERER_ID.to_string(),
            upstreams: Vec::new(),
        }
    }

    /// Set a non-default discoverer id.
    pub fn with_id(mut self, discoverer_id: impl Into<String>) -> Self {
        self.discoverer_id = discoverer_id.into();
        self
    }

    /// Add an upstream discoverer to fan out to.
    pub fn with_upstream(mut self, discoverer: Arc<dyn Discoverer>) -> Self {
        self.upstreams.push(discoverer);
        self
    }

    /// Add several upstream discoverers to fan out to.
    pub fn with_upstreams(mut self, discoverers: impl IntoIterator<Item = Arc<dyn Discoverer>>) -> Self {
        self.upstreams.extend(discoverers);
        self
    }
}

impl Default for MultipleUpstreamDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Discoverer for MultipleUpstreamDiscoverer {
    fn id(&self) -> &str {
        &self.discoverer_id
    }

    async fn discover(&self, shutdown: CancellationToken) -> DiscoveryResult {
        let result = DiscoveryResult::new(&self.discoverer_id);

        let mut passes = JoinSet::new();
        for upstream in &self.upstreams {
            let upstream = Arc::clone(upstream);
            let shutdown = shutdown.child_token();
            passes.spawn(async move { upstream.discover(shutdown).await });
        }

        while let Some(joined) = passes.join_next().await {
            match joined {
                Ok(upstream_result) => {
                    let parts = upstream_result.into_parts();
                    result.add_resources(parts.resources);
                    for error in parts.errors {
                        result.add_error(format!("{}: {}", parts.metadata.discoverer_id, error));
                    }
                    for warning in parts.warnings {
                        result.add_warning(format!("{}: {}", parts.metadata.discoverer_id, warning));
                    }
                }
                Err(e) => {
                    // a panicked upstream must not take down the composite pass
                    tracing::warn!(error = %e, "upstream discoverer task failed");
                    result.add_error(format!("upstream discoverer task failed: {e}"));
                }
            }
        }

        result.done();
        result
    }
}
