//! Consensus-store membership access
//!
//! The removal protocol only needs three calls from the store: connect,
//! list members and remove a member. They sit behind `MemberStore` and
//! `StoreSession` so the orchestrator can be exercised without a live cluster.

pub mod etcd;

use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

pub use etcd::EtcdStore;

/// A registered member of the consensus group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub peer_urls: Vec<String>,
    pub client_urls: Vec<String>,
    pub is_learner: bool,
}

/// Snapshot of the store's membership, fetched fresh for every attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipList {
    members: Vec<Member>,
}

impl MembershipList {
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// First member registered under `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Opens sessions against the store.
#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn connect(
        &self,
        endpoints: &[String],
        dial_timeout: Duration,
    ) -> Result<Box<dyn StoreSession>, StoreError>;
}

/// One open connection to the store. Dropping the session closes it.
#[async_trait]
pub trait StoreSession: Send {
    async fn list_members(&mut self) -> Result<MembershipList, StoreError>;

    async fn remove_member(&mut self, id: u64) -> Result<(), StoreError>;
}
