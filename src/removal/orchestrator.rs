use crate::config::Settings;
use crate::error::{ClusterError, RemovalError};
use crate::k8s::PodApi;
use crate::removal::discovery::{discover_endpoints, resolve_target, sibling_selector, EndpointFilter};
use crate::store::{MemberStore, StoreSession};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What happened to the pod's store membership. This is the safety-critical half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberOutcome {
    /// The pod never joined, or already left; nothing was removed.
    NotAMember,
    Removed { id: u64 },
}

/// Best-effort deletion of the pod object after its member was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    NotAttempted,
    Deleted,
    Failed(RemovalError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub pod: String,
    pub member: MemberOutcome,
    pub cleanup: CleanupOutcome,
}

impl RemovalOutcome {
    pub fn cleanup_error(&self) -> Option<&RemovalError> {
        match &self.cleanup {
            CleanupOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs the removal protocol for one pod at a time.
///
/// Holds no per-request state: every attempt re-reads pods and membership,
/// and the store session it opens never outlives the attempt.
#[derive(Clone)]
pub struct Orchestrator {
    settings: Arc<Settings>,
    pods: Arc<dyn PodApi>,
    store: Arc<dyn MemberStore>,
    shutdown: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        settings: Arc<Settings>,
        pods: Arc<dyn PodApi>,
        store: Arc<dyn MemberStore>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            settings,
            pods,
            store,
            shutdown,
        }
    }

    pub async fn remove_gracefully(&self, pod_name: &str) -> Result<RemovalOutcome, RemovalError> {
        let namespace = self.settings.namespace.as_str();

        let pod = self
            .bounded("get pod", self.pods.get_pod(namespace, pod_name))
            .await?
            .map_err(|e| match e {
                ClusterError::NotFound => RemovalError::NotFound {
                    name: pod_name.to_string(),
                    namespace: namespace.to_string(),
                },
                ClusterError::Api(msg) => RemovalError::PodLookup(msg),
            })?;

        let label_key = self.settings.label_key.as_str();
        let label_value = pod
            .label(label_key)
            .ok_or_else(|| RemovalError::MissingGroupLabel {
                name: pod_name.to_string(),
                label: label_key.to_string(),
            })?;

        let selector = sibling_selector(label_key, label_value);
        let siblings = self
            .bounded("list pods", self.pods.list_pods(namespace, &selector))
            .await?
            .map_err(|e| RemovalError::PodLookup(e.to_string()))?;

        if siblings.is_empty() {
            return Err(RemovalError::NoSiblings { selector });
        }

        let filter = EndpointFilter {
            image_prefix: &self.settings.store_image_prefix,
            port_name: &self.settings.client_port_name,
            scheme: &self.settings.endpoint_scheme,
        };
        let endpoints = discover_endpoints(&siblings, label_value, filter);
        if endpoints.is_empty() {
            return Err(RemovalError::NoEndpoints);
        }

        debug!(
            pod = pod_name,
            siblings = siblings.len(),
            endpoints = ?endpoints,
            "Discovered store endpoints"
        );

        let session = self
            .bounded(
                "connect",
                self.store.connect(&endpoints, self.settings.timeout()),
            )
            .await?
            .map_err(|e| RemovalError::Connect(e.to_string()))?;

        let member = self.retire_member(session, pod_name).await?;

        let cleanup = match member {
            MemberOutcome::NotAMember => CleanupOutcome::NotAttempted,
            MemberOutcome::Removed { id } => {
                info!(pod = pod_name, member_id = %format!("{:x}", id), "Sent member remove request successfully");
                self.delete_pod(pod_name).await
            }
        };

        Ok(RemovalOutcome {
            pod: pod_name.to_string(),
            member,
            cleanup,
        })
    }

    /// Owns the session so it is closed on every return path.
    async fn retire_member(
        &self,
        mut session: Box<dyn StoreSession>,
        pod_name: &str,
    ) -> Result<MemberOutcome, RemovalError> {
        let members = self
            .bounded("list members", session.list_members())
            .await?
            .map_err(|e| RemovalError::MemberList(e.to_string()))?;

        if members.is_empty() {
            return Err(RemovalError::NoMembers);
        }

        let Some(target) = resolve_target(&members, pod_name) else {
            info!(
                pod = pod_name,
                members = members.len(),
                "Pod is not a registered store member, nothing to remove"
            );
            return Ok(MemberOutcome::NotAMember);
        };

        let id = target.id;
        if let Err(e) = self
            .bounded("remove member", session.remove_member(id))
            .await?
        {
            error!(pod = pod_name, member_id = %format!("{:x}", id), error = %e, "Remove store member failed");
            return Err(RemovalError::Remove {
                name: pod_name.to_string(),
                id,
                reason: e.to_string(),
            });
        }

        Ok(MemberOutcome::Removed { id })
    }

    async fn delete_pod(&self, pod_name: &str) -> CleanupOutcome {
        let namespace = self.settings.namespace.as_str();
        let result = self
            .bounded(
                "delete pod",
                self.pods
                    .delete_pod(namespace, pod_name, self.settings.grace_period_seconds),
            )
            .await;

        let reason = match result {
            Ok(Ok(())) => None,
            // already gone
            Ok(Err(ClusterError::NotFound)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) => Some(e.to_string()),
        };

        // TODO: release the member's persistent volume claims once the
        // reclaim policy for store data is decided.
        debug!(pod = pod_name, "Persistent volume cleanup skipped");

        match reason {
            None => CleanupOutcome::Deleted,
            Some(reason) => {
                warn!(pod = pod_name, error = %reason, "Clean up pod failed");
                CleanupOutcome::Failed(RemovalError::Cleanup {
                    name: pod_name.to_string(),
                    reason,
                })
            }
        }
    }

    /// Bound one remote call by the per-call timeout and the shutdown token.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, RemovalError>
    where
        F: Future<Output = T>,
    {
        let timeout = self.settings.timeout();
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(RemovalError::Cancelled),
            result = tokio::time::timeout(timeout, call) => {
                result.map_err(|_| RemovalError::Timeout { operation, timeout })
            }
        }
    }
}
