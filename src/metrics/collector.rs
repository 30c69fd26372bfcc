use crate::admission::Decision;
use crate::{QuorumGateError, Result};
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Counters for admission decisions and removal attempts.
#[derive(Clone)]
pub struct GateMetrics {
    registry: Registry,
    decisions: IntCounterVec,
    removals: IntCounterVec,
    cleanup_failures: IntCounter,
}

impl GateMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new(
                "quorumgate_admission_decisions_total",
                "Admission decisions by outcome",
            ),
            &["decision"],
        )
        .map_err(metrics_error)?;

        let removals = IntCounterVec::new(
            Opts::new(
                "quorumgate_member_removals_total",
                "Graceful member removal attempts by outcome",
            ),
            &["outcome"],
        )
        .map_err(metrics_error)?;

        let cleanup_failures = IntCounter::new(
            "quorumgate_pod_cleanup_failures_total",
            "Pods left behind after their member was removed",
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(decisions.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(removals.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(cleanup_failures.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            decisions,
            removals,
            cleanup_failures,
        })
    }

    pub fn record_decision(&self, decision: Decision) {
        self.decisions
            .with_label_values(&[decision.as_str()])
            .inc();
    }

    /// `outcome` is one of `removed`, `not_a_member` or `failed`.
    pub fn record_removal(&self, outcome: &str) {
        self.removals.with_label_values(&[outcome]).inc();
    }

    pub fn record_cleanup_failure(&self) {
        self.cleanup_failures.inc();
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn metrics_error(e: prometheus::Error) -> QuorumGateError {
    QuorumGateError::MetricsError(e.to_string())
}
