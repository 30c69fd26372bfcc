use crate::metrics::GateMetrics;
use crate::{QuorumGateError, Result};
use prometheus::{Encoder, TextEncoder};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Render every registered metric in the Prometheus text format.
pub fn encode_text(metrics: &GateMetrics) -> Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&metrics.registry().gather(), &mut buffer)
        .map_err(|e| QuorumGateError::MetricsError(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| QuorumGateError::MetricsError(e.to_string()))
}
