use crate::error::StoreError;
use crate::store::{Member, MemberStore, MembershipList, StoreSession};
use async_trait::async_trait;
use quorumgate_proto::{ClusterClient, MemberListRequest, MemberRemoveRequest};
use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, warn};

/// etcd v3 membership access over gRPC.
///
/// The dial budget is split evenly across the candidate endpoints, so a
/// member that accepts connections but never answers cannot starve the
/// others. Endpoints after the one that answered stay on standby and take
/// over when an RPC fails at the transport level.
#[derive(Debug, Clone, Default)]
pub struct EtcdStore;

impl EtcdStore {
    pub fn new() -> Self {
        Self
    }
}

/// Share of `dial_timeout` given to each of `endpoints` candidates.
fn per_endpoint_budget(dial_timeout: Duration, endpoints: usize) -> Duration {
    let count = u32::try_from(endpoints).unwrap_or(u32::MAX).max(1);
    dial_timeout / count
}

async fn dial(url: &str, budget: Duration) -> Result<ClusterClient<Channel>, String> {
    let endpoint = Endpoint::from_shared(url.to_string())
        .map_err(|e| format!("{}: {}", url, e))?
        .connect_timeout(budget)
        .timeout(budget);

    match tokio::time::timeout(budget, endpoint.connect()).await {
        Ok(Ok(channel)) => Ok(ClusterClient::new(channel)),
        Ok(Err(e)) => Err(format!("{}: {}", url, e)),
        Err(_) => Err(format!("{}: dial timed out after {:?}", url, budget)),
    }
}

/// Failures that say nothing about the request itself, only about the
/// member that was asked. etcd reports its own refusals with specific codes,
/// so `Unknown` only comes from the channel.
fn is_transport_failure(status: &Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable | Code::Cancelled | Code::DeadlineExceeded | Code::Unknown
    )
}

#[async_trait]
impl MemberStore for EtcdStore {
    async fn connect(
        &self,
        endpoints: &[String],
        dial_timeout: Duration,
    ) -> Result<Box<dyn StoreSession>, StoreError> {
        let budget = per_endpoint_budget(dial_timeout, endpoints.len());
        let mut errors = Vec::new();

        for (i, url) in endpoints.iter().enumerate() {
            match dial(url, budget).await {
                Ok(client) => {
                    debug!(endpoint = %url, budget = ?budget, "Connected to store");
                    return Ok(Box::new(EtcdSession {
                        client,
                        endpoint: url.clone(),
                        standby: endpoints[i + 1..].iter().cloned().collect(),
                        budget,
                    }));
                }
                Err(e) => {
                    debug!(endpoint = %url, error = %e, "Store endpoint unreachable");
                    errors.push(e);
                }
            }
        }

        if errors.is_empty() {
            return Err(StoreError::Connect("no endpoints".to_string()));
        }
        Err(StoreError::Connect(errors.join("; ")))
    }
}

struct EtcdSession {
    client: ClusterClient<Channel>,
    endpoint: String,
    standby: VecDeque<String>,
    budget: Duration,
}

impl EtcdSession {
    /// Runs `call` against the current endpoint, moving down the standby
    /// list for as long as the failure is a transport one.
    async fn with_failover<T, F, Fut>(&mut self, mut call: F) -> Result<T, StoreError>
    where
        F: FnMut(ClusterClient<Channel>) -> Fut + Send,
        Fut: Future<Output = Result<T, Status>> + Send,
        T: Send,
    {
        let mut errors = Vec::new();

        loop {
            match call(self.client.clone()).await {
                Ok(value) => return Ok(value),
                Err(status) if !is_transport_failure(&status) => {
                    return Err(StoreError::Rpc(status.message().to_string()));
                }
                Err(status) => {
                    warn!(
                        endpoint = %self.endpoint,
                        code = ?status.code(),
                        error = %status.message(),
                        "Store endpoint failed, trying next"
                    );
                    errors.push(format!("{}: {}", self.endpoint, status.message()));
                }
            }

            loop {
                let Some(next) = self.standby.pop_front() else {
                    return Err(StoreError::Rpc(errors.join("; ")));
                };
                match dial(&next, self.budget).await {
                    Ok(client) => {
                        debug!(endpoint = %next, "Failed over to store endpoint");
                        self.client = client;
                        self.endpoint = next;
                        break;
                    }
                    Err(e) => errors.push(e),
                }
            }
        }
    }
}

#[async_trait]
impl StoreSession for EtcdSession {
    async fn list_members(&mut self) -> Result<MembershipList, StoreError> {
        let response = self
            .with_failover(move |mut client| async move {
                client
                    .member_list(MemberListRequest { linearizable: true })
                    .await
                    .map(tonic::Response::into_inner)
            })
            .await?;

        let members = response
            .members
            .into_iter()
            .map(|m| Member {
                id: m.id,
                name: m.name,
                peer_urls: m.peer_urls,
                client_urls: m.client_urls,
                is_learner: m.is_learner,
            })
            .collect();

        Ok(MembershipList::new(members))
    }

    async fn remove_member(&mut self, id: u64) -> Result<(), StoreError> {
        // A remove that landed before its response was lost fails on the next
        // endpoint with "member not found"; the attempt is denied and the
        // retried deletion then sees the pod as no longer a member.
        self.with_failover(move |mut client| async move {
            client
                .member_remove(MemberRemoveRequest { id })
                .await
                .map(|_| ())
        })
        .await
    }
}
