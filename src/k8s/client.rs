use crate::error::ClusterError;
use crate::k8s::{PodApi, PodRecord};
use crate::{QuorumGateError, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{DeleteParams, ListParams};
use kube::{Api, Client};
use tracing::{debug, info};

#[derive(Clone)]
pub struct K8sClient {
    client: Client,
}

impl K8sClient {
    pub async fn try_default() -> Result<Self> {
        debug!("Initializing Kubernetes client");

        let client = Client::try_default().await.map_err(|e| {
            QuorumGateError::KubernetesError(format!("Failed to create K8s client: {}", e))
        })?;

        info!("Successfully connected to Kubernetes cluster");

        Ok(Self { client })
    }

    pub fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl PodApi for K8sClient {
    async fn get_pod(&self, namespace: &str, name: &str) -> std::result::Result<PodRecord, ClusterError> {
        let pod = self.pods(namespace).get_opt(name).await.map_err(|e| {
            ClusterError::Api(format!("Failed to get pod {}/{}: {}", namespace, name, e))
        })?;

        pod.as_ref()
            .map(PodRecord::from_k8s_pod)
            .ok_or(ClusterError::NotFound)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> std::result::Result<Vec<PodRecord>, ClusterError> {
        let params = ListParams::default().labels(label_selector);

        let pod_list = self.pods(namespace).list(&params).await.map_err(|e| {
            ClusterError::Api(format!(
                "Failed to list pods in {} matching {}: {}",
                namespace, label_selector, e
            ))
        })?;

        Ok(pod_list.items.iter().map(PodRecord::from_k8s_pod).collect())
    }

    async fn delete_pod(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: i64,
    ) -> std::result::Result<(), ClusterError> {
        let grace = u32::try_from(grace_period_seconds).unwrap_or(0);
        let params = DeleteParams::default().grace_period(grace);

        match self.pods(namespace).delete(name, &params).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(resp)) if resp.code == 404 => Err(ClusterError::NotFound),
            Err(e) => Err(ClusterError::Api(format!(
                "Failed to delete pod {}/{}: {}",
                namespace, name, e
            ))),
        }
    }
}
