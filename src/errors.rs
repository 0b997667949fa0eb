use thiserror::Error;

/// Error types for discovery helper operations.
///
/// Note that a discovery pass itself never returns one of these across the
/// [`crate::Discoverer`] boundary: pass-level diagnostics are recorded as
/// strings inside the pass's [`crate::DiscoveryResult`]. This type covers the
/// fallible helpers a discoverer calls while building its work list.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid Target Error: {0}")]
    InvalidTarget(String),

    #[error("DNS Resolution Error: {0}")]
    DnsResolutionError(String),

    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(String),
}
