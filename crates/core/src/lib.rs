//! sweep-core
//!
//! Core library for finding unused cloud resources (security groups, volumes,
//! elastic IPs, network interfaces, load balancers) in locally cached account
//! snapshots.
//!
//! This crate defines the account/region model, the snapshot store, typed
//! snapshot documents, the resource graph used for indirect security-group
//! usage, the per-resource detectors, the report aggregator, and the workspace
//! database that keeps scan history.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends. Nothing in this crate talks to a cloud provider.

pub mod db;
pub mod detect;
pub mod graph;
pub mod model;
pub mod scan;
pub mod snapshot;
pub mod store;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
