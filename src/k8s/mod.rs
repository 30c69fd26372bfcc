pub mod client;
pub mod types;

use crate::error::ClusterError;
use async_trait::async_trait;

pub use client::K8sClient;
pub use types::{ContainerRecord, PodRecord, PortRecord};

/// The slice of the orchestration API the removal protocol calls into.
#[async_trait]
pub trait PodApi: Send + Sync {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodRecord, ClusterError>;

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodRecord>, ClusterError>;

    async fn delete_pod(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: i64,
    ) -> Result<(), ClusterError>;
}
