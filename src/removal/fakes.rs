//! In-memory collaborators for unit tests.

use crate::error::{ClusterError, StoreError};
use crate::k8s::{ContainerRecord, PodApi, PodRecord, PortRecord};
use crate::store::{Member, MemberStore, MembershipList, StoreSession};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A replica in `default` labelled `app=<group>` running `registry/store:v3`.
pub fn store_pod(name: &str, group: &str) -> PodRecord {
    PodRecord {
        name: name.to_string(),
        namespace: "default".to_string(),
        labels: BTreeMap::from([("app".to_string(), group.to_string())]),
        containers: vec![ContainerRecord {
            name: "store".to_string(),
            image: "registry/store:v3".to_string(),
            ports: vec![
                PortRecord {
                    name: Some("client".to_string()),
                    container_port: 2379,
                },
                PortRecord {
                    name: Some("peer".to_string()),
                    container_port: 2380,
                },
            ],
        }],
    }
}

#[derive(Default)]
pub struct FakePods {
    pods: Vec<PodRecord>,
    /// Returned by `list_pods` in place of the label match.
    listing: Option<Vec<PodRecord>>,
    delete_error: Option<String>,
    deleted: Mutex<Vec<(String, i64)>>,
    list_calls: AtomicUsize,
}

impl FakePods {
    pub fn with_pods(pods: Vec<PodRecord>) -> Self {
        Self {
            pods,
            ..Default::default()
        }
    }

    pub fn listing(mut self, pods: Vec<PodRecord>) -> Self {
        self.listing = Some(pods);
        self
    }

    pub fn failing_delete(mut self, reason: &str) -> Self {
        self.delete_error = Some(reason.to_string());
        self
    }

    pub fn deleted(&self) -> Vec<(String, i64)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PodApi for FakePods {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodRecord, ClusterError> {
        self.pods
            .iter()
            .find(|p| p.namespace == namespace && p.name == name)
            .cloned()
            .ok_or(ClusterError::NotFound)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodRecord>, ClusterError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(pods) = &self.listing {
            return Ok(pods.clone());
        }
        let (key, value) = label_selector
            .split_once('=')
            .ok_or_else(|| ClusterError::Api(format!("bad selector {}", label_selector)))?;

        Ok(self
            .pods
            .iter()
            .filter(|p| p.namespace == namespace)
            .filter(|p| p.labels.get(key).map(String::as_str) == Some(value))
            .cloned()
            .collect())
    }

    async fn delete_pod(
        &self,
        _namespace: &str,
        name: &str,
        grace_period_seconds: i64,
    ) -> Result<(), ClusterError> {
        if let Some(reason) = &self.delete_error {
            return Err(ClusterError::Api(reason.clone()));
        }
        self.deleted
            .lock()
            .unwrap()
            .push((name.to_string(), grace_period_seconds));
        Ok(())
    }
}

#[derive(Default)]
struct StoreState {
    members: Mutex<Vec<Member>>,
    removed: Mutex<Vec<u64>>,
    last_endpoints: Mutex<Vec<String>>,
    connects: AtomicUsize,
    open_sessions: AtomicUsize,
}

#[derive(Default)]
pub struct FakeStore {
    state: Arc<StoreState>,
    connect_error: Option<String>,
    list_error: Option<String>,
    remove_error: Option<String>,
    hang_on_remove: bool,
}

impl FakeStore {
    pub fn with_members(members: Vec<Member>) -> Self {
        let store = Self::default();
        *store.state.members.lock().unwrap() = members;
        store
    }

    pub fn failing_connect(mut self, reason: &str) -> Self {
        self.connect_error = Some(reason.to_string());
        self
    }

    pub fn failing_list(mut self, reason: &str) -> Self {
        self.list_error = Some(reason.to_string());
        self
    }

    pub fn failing_remove(mut self, reason: &str) -> Self {
        self.remove_error = Some(reason.to_string());
        self
    }

    pub fn hanging_remove(mut self) -> Self {
        self.hang_on_remove = true;
        self
    }

    pub fn removed(&self) -> Vec<u64> {
        self.state.removed.lock().unwrap().clone()
    }

    pub fn last_endpoints(&self) -> Vec<String> {
        self.state.last_endpoints.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn open_sessions(&self) -> usize {
        self.state.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberStore for FakeStore {
    async fn connect(
        &self,
        endpoints: &[String],
        _dial_timeout: Duration,
    ) -> Result<Box<dyn StoreSession>, StoreError> {
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        *self.state.last_endpoints.lock().unwrap() = endpoints.to_vec();

        if let Some(reason) = &self.connect_error {
            return Err(StoreError::Connect(reason.clone()));
        }

        self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            state: self.state.clone(),
            list_error: self.list_error.clone(),
            remove_error: self.remove_error.clone(),
            hang_on_remove: self.hang_on_remove,
        }))
    }
}

struct FakeSession {
    state: Arc<StoreState>,
    list_error: Option<String>,
    remove_error: Option<String>,
    hang_on_remove: bool,
}

#[async_trait]
impl StoreSession for FakeSession {
    async fn list_members(&mut self) -> Result<MembershipList, StoreError> {
        if let Some(reason) = &self.list_error {
            return Err(StoreError::Rpc(reason.clone()));
        }
        Ok(MembershipList::new(self.state.members.lock().unwrap().clone()))
    }

    async fn remove_member(&mut self, id: u64) -> Result<(), StoreError> {
        if self.hang_on_remove {
            std::future::pending::<()>().await;
        }
        if let Some(reason) = &self.remove_error {
            return Err(StoreError::Rpc(reason.clone()));
        }
        self.state.members.lock().unwrap().retain(|m| m.id != id);
        self.state.removed.lock().unwrap().push(id);
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}
