//! rdiscover - a modular resource discovery library
//!
//! This library provides building blocks for discovering resources across
//! heterogeneous inventory sources:
//! - A common `Resource` record and a concurrency-safe per-pass `DiscoveryResult`
//! - The `Discoverer` capability implemented by every inventory integration
//! - Engines that schedule discoverers once or continuously
//! - Inclusion/exclusion tag filtering shared by all discoverers

pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod model;
pub mod result;

// Re-export commonly used types for convenience
pub use config::NetworkScanConfig;
pub use discover::composite::MultipleUpstreamDiscoverer;
pub use discover::network::NetworkDiscoverer;
pub use discover::Discoverer;
pub use engine::continuous::{ContinuousEngine, DiscovererSchedule};
pub use engine::oneoff::OneOffEngine;
pub use engine::Engine;
pub use errors::DiscoveryError;
pub use filter::{matches_filters, pairs_match_filters, TagFilter};
pub use model::{NetworkBaseDetails, Resource};
pub use result::{DiscoveryResult, ResultMetadata, ResultParts};
