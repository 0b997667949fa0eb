use crate::model::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Timing and identity metadata of one discovery pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    pub discoverer_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

/// The plain-data form of a finalized [`DiscoveryResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultParts {
    pub resources: Vec<Resource>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: ResultMetadata,
}

/// The accumulated output of one discovery pass of one discoverer.
///
/// A result is created at pass start, appended to throughout the pass
/// (possibly from many tasks at once), finalized exactly once with
/// [`DiscoveryResult::done`], and then handed to whoever scheduled the pass.
/// Every mutating operation serializes against concurrent callers through a
/// single internal mutex, so a discoverer is free to fan out internally and
/// share the result across its sub-tasks by reference.
///
/// Errors indicate that the pass, or a sub-operation of it, failed in a way
/// that should surface as a fault. Warnings indicate a degraded but still
/// useful pass. Both are human-readable messages, not structured errors: a
/// result is a discovery report, and its diagnostics are for operators.
#[derive(Debug)]
pub struct DiscoveryResult {
    state: Mutex<ResultParts>,
}

impl DiscoveryResult {
    /// Create an empty result for a new pass, recording the start time.
    pub fn new(discoverer_id: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(ResultParts {
                resources: Vec::new(),
                errors: Vec::new(),
                warnings: Vec::new(),
                metadata: ResultMetadata {
                    discoverer_id: discoverer_id.into(),
                    started_at: Utc::now(),
                    ended_at: None,
                },
            }),
        }
    }

    /// Append a single discovered resource.
    pub fn add_resource(&self, resource: Resource) {
        self.lock().resources.push(resource);
    }

    /// Append discovered resources.
    pub fn add_resources(&self, resources: impl IntoIterator<Item = Resource>) {
        self.lock().resources.extend(resources);
    }

    /// Record a pass-level or sub-operation failure.
    pub fn add_error(&self, message: impl Into<String>) {
        self.lock().errors.push(message.into());
    }

    /// Record a degraded-but-usable condition.
    pub fn add_warning(&self, message: impl Into<String>) {
        self.lock().warnings.push(message.into());
    }

    /// Mark the pass as complete, recording the end time.
    ///
    /// Calling this more than once is harmless; the last write wins.
    pub fn done(&self) {
        self.lock().metadata.ended_at = Some(Utc::now());
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.lock().resources.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock().errors.clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.lock().warnings.clone()
    }

    pub fn metadata(&self) -> ResultMetadata {
        self.lock().metadata.clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.lock().errors.is_empty()
    }

    /// Consume the result, yielding its plain-data parts.
    pub fn into_parts(self) -> ResultParts {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, ResultParts> {
        // a panicked appender leaves the collections intact, so recover
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Serialize for DiscoveryResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.lock().serialize(serializer)
    }
}

impl From<ResultParts> for DiscoveryResult {
    fn from(parts: ResultParts) -> Self {
        Self {
            state: Mutex::new(parts),
        }
    }
}
