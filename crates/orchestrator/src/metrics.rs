use bridge_node_primitives::BridgeStep;
use metrics::{Counter, Histogram};
use metrics_derive::Metrics;
use std::{collections::HashMap, time::Duration};
use strum::{EnumIter, IntoEnumIterator};

/// The metric handler for the bridge orchestrator. Tracks execution duration
/// of the lifecycle steps and transfer outcome counters.
#[derive(Debug, Clone)]
pub(crate) struct MetricsHandler {
    /// The per-step duration metrics.
    step_metrics: HashMap<Task, BridgeStepMetrics>,
    /// The transfer outcome counters.
    transfer_metrics: TransferMetrics,
}

impl MetricsHandler {
    /// Records the duration of a step execution.
    pub(crate) fn record_step(&self, step: BridgeStep, duration: Duration) {
        if let Some(metric) = self.step_metrics.get(&step.into()) {
            metric.step_duration.record(duration.as_secs_f64());
        }
    }

    /// Returns the transfer outcome counters.
    pub(crate) const fn transfers(&self) -> &TransferMetrics {
        &self.transfer_metrics
    }
}

impl Default for MetricsHandler {
    fn default() -> Self {
        Self {
            step_metrics: Task::iter()
                .map(|task| {
                    let label = task.as_str();
                    (task, BridgeStepMetrics::new_with_labels(&[("step", label)]))
                })
                .collect(),
            transfer_metrics: TransferMetrics::default(),
        }
    }
}

/// The lifecycle steps tracked by the metrics handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub(crate) enum Task {
    Approve,
    Burn,
    Extract,
    Attest,
    Mint,
}

impl Task {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Burn => "burn",
            Self::Extract => "extract",
            Self::Attest => "attest",
            Self::Mint => "mint",
        }
    }
}

impl From<BridgeStep> for Task {
    fn from(step: BridgeStep) -> Self {
        match step {
            BridgeStep::Approve => Self::Approve,
            BridgeStep::Burn => Self::Burn,
            BridgeStep::Extract => Self::Extract,
            BridgeStep::Attest => Self::Attest,
            BridgeStep::Mint => Self::Mint,
        }
    }
}

/// The duration metrics of a lifecycle step.
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_orchestrator")]
pub(crate) struct BridgeStepMetrics {
    /// The duration of a step execution.
    pub step_duration: Histogram,
}

/// The transfer outcome counters.
#[derive(Metrics, Clone)]
#[metrics(scope = "bridge_orchestrator")]
pub(crate) struct TransferMetrics {
    /// The number of transfers created.
    pub transfers_created: Counter,
    /// The number of transfers minted.
    pub transfers_minted: Counter,
    /// The number of transfers failed.
    pub transfers_failed: Counter,
    /// The number of attestation waits that hit the ceiling.
    pub attestation_timeouts: Counter,
}
