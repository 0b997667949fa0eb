use crate::result::DiscoveryResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

// Submodule declarations
pub mod composite;
pub mod network;

/// Discoverer capability
///
/// Anything that can perform one discovery pass against an inventory source
/// (a cloud API, a container runtime, the raw network, ...) and report what
/// it found. Implementations are the unit of scheduling for the engines in
/// [`crate::engine`].
#[async_trait]
pub trait Discoverer: Send + Sync {
    /// Return the identifier recorded in this discoverer's result metadata
    /// and used for logging
    fn id(&self) -> &str;

    /// Perform one discovery pass.
    ///
    /// Implementations must always return a result, even on total failure:
    /// diagnostics belong in the result's error and warning lists, never in a
    /// panic or a returned error. When the shutdown token fires, a pass must
    /// stop issuing new sub-operations and return as soon as practical, still
    /// yielding a valid (possibly partial) result that notes the truncation.
    async fn discover(&self, shutdown: CancellationToken) -> DiscoveryResult;
}
