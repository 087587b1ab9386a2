use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the attestation client.
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_attestation")]
pub struct AttestationMetrics {
    /// The number of attestation polls issued.
    pub polls: Counter,
}
