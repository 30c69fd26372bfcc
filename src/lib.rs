pub mod admission;
pub mod cli;
pub mod config;
pub mod error;
pub mod k8s;
pub mod metrics;
pub mod removal;
pub mod store;
pub mod webhook;

pub use error::{QuorumGateError, RemovalError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
