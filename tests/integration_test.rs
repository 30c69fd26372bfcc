use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use quorumgate::admission::Gate;
use quorumgate::config::Settings;
use quorumgate::error::{ClusterError, QuorumGateError, StoreError};
use quorumgate::k8s::{ContainerRecord, PodApi, PodRecord, PortRecord};
use quorumgate::metrics::{encode_text, GateMetrics};
use quorumgate::removal::Orchestrator;
use quorumgate::store::{Member, MemberStore, MembershipList, StoreSession};
use quorumgate::webhook::{handle_admission, WebhookState, JSON_CONTENT_TYPE};
use quorumgate::RemovalError;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Records every collaborator call in order.
#[derive(Default)]
struct Journal {
    calls: Mutex<Vec<String>>,
}

impl Journal {
    fn push(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct Cluster {
    journal: Arc<Journal>,
    pods: Vec<PodRecord>,
}

fn replica(name: &str) -> PodRecord {
    PodRecord {
        name: name.to_string(),
        namespace: "default".to_string(),
        labels: BTreeMap::from([("app".to_string(), "store".to_string())]),
        containers: vec![ContainerRecord {
            name: "store".to_string(),
            image: "registry/store:v3".to_string(),
            ports: vec![PortRecord {
                name: Some("client".to_string()),
                container_port: 2379,
            }],
        }],
    }
}

#[async_trait]
impl PodApi for Cluster {
    async fn get_pod(&self, namespace: &str, name: &str) -> Result<PodRecord, ClusterError> {
        self.journal.push(format!("get_pod {}/{}", namespace, name));
        self.pods
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or(ClusterError::NotFound)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<PodRecord>, ClusterError> {
        self.journal
            .push(format!("list_pods {} {}", namespace, label_selector));
        Ok(self.pods.clone())
    }

    async fn delete_pod(
        &self,
        namespace: &str,
        name: &str,
        grace_period_seconds: i64,
    ) -> Result<(), ClusterError> {
        self.journal.push(format!(
            "delete_pod {}/{} grace={}",
            namespace, name, grace_period_seconds
        ));
        Ok(())
    }
}

struct Store {
    journal: Arc<Journal>,
    members: Vec<Member>,
    remove_error: Option<String>,
}

struct Session {
    journal: Arc<Journal>,
    members: Vec<Member>,
    remove_error: Option<String>,
}

#[async_trait]
impl MemberStore for Store {
    async fn connect(
        &self,
        endpoints: &[String],
        _dial_timeout: Duration,
    ) -> Result<Box<dyn StoreSession>, StoreError> {
        self.journal.push(format!("connect {}", endpoints.join(",")));
        Ok(Box::new(Session {
            journal: self.journal.clone(),
            members: self.members.clone(),
            remove_error: self.remove_error.clone(),
        }))
    }
}

#[async_trait]
impl StoreSession for Session {
    async fn list_members(&mut self) -> Result<MembershipList, StoreError> {
        self.journal.push("list_members");
        Ok(MembershipList::new(self.members.clone()))
    }

    async fn remove_member(&mut self, id: u64) -> Result<(), StoreError> {
        self.journal.push(format!("remove_member {}", id));
        match &self.remove_error {
            Some(reason) => Err(StoreError::Rpc(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.journal.push("close");
    }
}

struct Harness {
    journal: Arc<Journal>,
    state: WebhookState,
    metrics: GateMetrics,
}

fn harness(remove_error: Option<&str>) -> Harness {
    let journal = Arc::new(Journal::default());
    let settings = Arc::new(Settings {
        store_image_prefix: "registry/store".to_string(),
        ..Settings::default()
    });
    let cluster = Cluster {
        journal: journal.clone(),
        pods: vec![replica("store-0"), replica("store-1"), replica("store-2")],
    };
    let store = Store {
        journal: journal.clone(),
        members: vec![
            Member {
                id: 11,
                name: "store-0".to_string(),
                ..Default::default()
            },
            Member {
                id: 12,
                name: "store-1".to_string(),
                ..Default::default()
            },
            Member {
                id: 13,
                name: "store-2".to_string(),
                ..Default::default()
            },
        ],
        remove_error: remove_error.map(str::to_string),
    };

    let orchestrator = Orchestrator::new(
        settings.clone(),
        Arc::new(cluster),
        Arc::new(store),
        CancellationToken::new(),
    );
    let metrics = GateMetrics::new().expect("metrics");
    let gate = Gate::new(
        settings.reserved_group.clone(),
        Arc::new(orchestrator),
        metrics.clone(),
    );

    Harness {
        journal,
        state: WebhookState::new(gate),
        metrics,
    }
}

fn review(kind: &str, groups: &[&str]) -> Bytes {
    let body = serde_json::json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "0df28fbd-5f5f-11e8-bc74-36e6bb280816",
            "kind": {"group": "", "version": "v1", "kind": kind},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "name": "store-2",
            "namespace": "default",
            "operation": "DELETE",
            "userInfo": {"username": "kubernetes-admin", "groups": groups},
            "dryRun": false
        }
    });
    Bytes::from(serde_json::to_vec(&body).unwrap())
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(JSON_CONTENT_TYPE),
    );
    headers
}

async fn submit(harness: &Harness, body: Bytes) -> (StatusCode, serde_json::Value) {
    let response = handle_admission(State(harness.state.clone()), json_headers(), body).await;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_store_pod_deletion_removes_member_first() {
    let harness = harness(None);

    let (status, body) = submit(&harness, review("Pod", &["system:masters"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["allowed"], true);
    assert_eq!(
        harness.journal.calls(),
        vec![
            "get_pod default/store-2".to_string(),
            "list_pods default app=store".to_string(),
            "connect http://store-0.store.default.svc:2379,http://store-1.store.default.svc:2379,http://store-2.store.default.svc:2379".to_string(),
            "list_members".to_string(),
            "remove_member 13".to_string(),
            "close".to_string(),
            "delete_pod default/store-2 grace=5".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_member_removal_denies_deletion() {
    let harness = harness(Some("transport is closing"));

    let (status, body) = submit(&harness, review("Pod", &["system:masters"])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["response"]["allowed"], false);
    let calls = harness.journal.calls();
    assert!(calls.contains(&"remove_member 13".to_string()));
    assert!(calls.contains(&"close".to_string()));
    assert!(!calls.iter().any(|c| c.starts_with("delete_pod")));

    let text = encode_text(&harness.metrics).unwrap();
    assert!(text.contains("quorumgate_admission_decisions_total{decision=\"deny\"} 1"));
    assert!(text.contains("quorumgate_member_removals_total{outcome=\"failed\"} 1"));
}

#[tokio::test]
async fn test_other_kinds_are_allowed_untouched() {
    let harness = harness(None);

    let (status, body) = submit(&harness, review("ConfigMap", &["system:masters"])).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["allowed"], true);
    assert!(harness.journal.calls().is_empty());
}

#[tokio::test]
async fn test_service_account_deletions_are_not_intercepted() {
    let harness = harness(None);

    let (status, body) = submit(
        &harness,
        review(
            "Pod",
            &["system:serviceaccounts", "system:serviceaccounts:default"],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"]["allowed"], true);
    assert!(harness.journal.calls().is_empty());
}

#[test]
fn test_removal_error_converts_into_process_error() {
    let err: QuorumGateError = RemovalError::NotFound {
        name: "store-2".to_string(),
        namespace: "default".to_string(),
    }
    .into();

    assert!(err.to_string().contains("store-2"));
    assert!(err.to_string().contains("default"));
}

#[test]
fn test_version_const() {
    assert!(!quorumgate::VERSION.is_empty());
}
