use crate::admission::types::{DeletionRequest, Evaluation, Operation, Verdict};
use crate::error::RemovalError;
use crate::metrics::GateMetrics;
use crate::removal::{MemberOutcome, Orchestrator, RemovalOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const POD_KIND: &str = "Pod";

/// Runs the graceful removal for a pod the gate decided to intercept.
#[async_trait]
pub trait Remover: Send + Sync {
    async fn remove_gracefully(&self, pod_name: &str) -> Result<RemovalOutcome, RemovalError>;
}

#[async_trait]
impl Remover for Orchestrator {
    async fn remove_gracefully(&self, pod_name: &str) -> Result<RemovalOutcome, RemovalError> {
        Orchestrator::remove_gracefully(self, pod_name).await
    }
}

#[derive(Clone)]
pub struct Gate {
    reserved_group: String,
    remover: Arc<dyn Remover>,
    metrics: GateMetrics,
}

impl Gate {
    pub fn new(reserved_group: String, remover: Arc<dyn Remover>, metrics: GateMetrics) -> Self {
        Self {
            reserved_group,
            remover,
            metrics,
        }
    }

    pub fn metrics(&self) -> &GateMetrics {
        &self.metrics
    }

    pub async fn evaluate(&self, request: &DeletionRequest) -> Evaluation {
        let evaluation = self.decide(request).await;
        self.metrics.record_decision(evaluation.decision);
        evaluation
    }

    async fn decide(&self, request: &DeletionRequest) -> Evaluation {
        if request.operation != Operation::Delete || request.kind != POD_KIND {
            debug!(
                uid = %request.uid,
                operation = %request.operation,
                kind = %request.kind,
                "Passing through request"
            );
            return Evaluation::allow(Verdict::PassThrough);
        }

        if request.groups.iter().any(|g| g == &self.reserved_group) {
            debug!(
                uid = %request.uid,
                pod = %request.name,
                user = request.username.as_deref().unwrap_or(""),
                "Deletion requested by reserved group, allowing"
            );
            return Evaluation::allow(Verdict::ReservedGroup);
        }

        info!(uid = %request.uid, pod = %request.name, "Intercepted pod deletion");

        match self.remover.remove_gracefully(&request.name).await {
            Ok(outcome) => {
                match outcome.member {
                    MemberOutcome::Removed { .. } => self.metrics.record_removal("removed"),
                    MemberOutcome::NotAMember => self.metrics.record_removal("not_a_member"),
                }
                if let Some(e) = outcome.cleanup_error() {
                    self.metrics.record_cleanup_failure();
                    warn!(pod = %request.name, error = %e, "Member removed but pod cleanup failed");
                }
                Evaluation::allow(Verdict::Removed(outcome))
            }
            Err(e) => {
                self.metrics.record_removal("failed");
                error!(
                    pod = %request.name,
                    kind = e.kind(),
                    error = %e,
                    "Remove store member error"
                );
                Evaluation::deny(e)
            }
        }
    }
}
