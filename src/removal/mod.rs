//! Membership removal protocol
//!
//! Retires a store replica from the consensus group before its pod object is
//! allowed to disappear:
//! - Resolve the pod and its siblings (pods sharing the grouping label)
//! - Discover store client endpoints among the siblings
//! - List the store's members and resolve the one named after the pod
//! - Remove that member, and only then delete the pod object

pub mod discovery;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod fakes;

pub use discovery::{discover_endpoints, resolve_target, sibling_selector, EndpointFilter, EndpointSet};
pub use orchestrator::{CleanupOutcome, MemberOutcome, Orchestrator, RemovalOutcome};
