use std::time::Duration;
use thiserror::Error;

/// Process-level failures: startup, configuration and serving.
#[derive(Error, Debug)]
pub enum QuorumGateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TLS error: {0}")]
    TlsError(String),

    #[error("Kubernetes error: {0}")]
    KubernetesError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("HTTP server error: {0}")]
    ServerError(String),

    #[error("Member removal failed: {0}")]
    RemovalFailed(#[from] RemovalError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QuorumGateError>;

/// Failures of one graceful removal attempt.
///
/// Everything except `Cleanup` blocks the pod deletion. `Cleanup` is only
/// reported after the member has already left the cluster.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemovalError {
    #[error("Pod not found: {name} in namespace {namespace}")]
    NotFound { name: String, namespace: String },

    #[error("Pod {name} has no value for grouping label {label}")]
    MissingGroupLabel { name: String, label: String },

    #[error("Pod lookup failed: {0}")]
    PodLookup(String),

    #[error("No pods matched selector {selector}")]
    NoSiblings { selector: String },

    #[error("No store client endpoints discovered among sibling pods")]
    NoEndpoints,

    #[error("Failed to connect to store: {0}")]
    Connect(String),

    #[error("Failed to list store members: {0}")]
    MemberList(String),

    #[error("Store reported no members")]
    NoMembers,

    #[error("Failed to remove member {name} ({id:x}): {reason}")]
    Remove { name: String, id: u64, reason: String },

    #[error("Failed to clean up pod {name}: {reason}")]
    Cleanup { name: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },
}

impl RemovalError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RemovalError::Cancelled)
    }

    /// Short label used for metrics and log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            RemovalError::NotFound { .. } => "not_found",
            RemovalError::MissingGroupLabel { .. } => "missing_group_label",
            RemovalError::PodLookup(_) => "pod_lookup",
            RemovalError::NoSiblings { .. } => "no_siblings",
            RemovalError::NoEndpoints => "no_endpoints",
            RemovalError::Connect(_) => "connect",
            RemovalError::MemberList(_) => "member_list",
            RemovalError::NoMembers => "no_members",
            RemovalError::Remove { .. } => "remove",
            RemovalError::Cleanup { .. } => "cleanup",
            RemovalError::Cancelled => "cancelled",
            RemovalError::Timeout { .. } => "timeout",
        }
    }
}

/// Errors surfaced by the orchestration API seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("object not found")]
    NotFound,

    #[error("Kubernetes API error: {0}")]
    Api(String),
}

/// Errors surfaced by the consensus-store seam.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("rpc failed: {0}")]
    Rpc(String),
}
