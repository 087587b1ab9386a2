use std::time::Duration;

/// The default interval between attestation polls.
const DEFAULT_ATTESTATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// The default ceiling on a single attestation wait.
const DEFAULT_ATTESTATION_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// The default ceiling on a single transaction confirmation wait.
const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(120);

/// The default per-step retry ceiling for transient errors.
const DEFAULT_MAX_STEP_RETRIES: usize = 5;

/// The default initial backoff between retries in milliseconds.
const DEFAULT_BACKOFF_BASE_MS: u64 = 200;

/// Configuration for the bridge orchestrator.
#[derive(Debug, Clone)]
pub struct BridgeOrchestratorConfig {
    /// The ceiling on a single transaction confirmation wait.
    receipt_timeout: Duration,
    /// The interval between attestation polls.
    attestation_poll_interval: Duration,
    /// The ceiling on a single attestation wait. Reaching it suspends the
    /// transfer, it does not fail it.
    attestation_timeout: Duration,
    /// The per-step retry ceiling for transient errors.
    max_step_retries: usize,
    /// The initial backoff between retries in milliseconds, doubled on each
    /// attempt.
    backoff_base_ms: u64,
}

impl BridgeOrchestratorConfig {
    /// Creates a new orchestrator configuration.
    pub const fn new(
        receipt_timeout: Duration,
        attestation_poll_interval: Duration,
        attestation_timeout: Duration,
        max_step_retries: usize,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            receipt_timeout,
            attestation_poll_interval,
            attestation_timeout,
            max_step_retries,
            backoff_base_ms,
        }
    }

    /// Returns the ceiling on a single transaction confirmation wait.
    pub const fn receipt_timeout(&self) -> Duration {
        self.receipt_timeout
    }

    /// Returns the interval between attestation polls.
    pub const fn attestation_poll_interval(&self) -> Duration {
        self.attestation_poll_interval
    }

    /// Returns the ceiling on a single attestation wait.
    pub const fn attestation_timeout(&self) -> Duration {
        self.attestation_timeout
    }

    /// Returns the per-step retry ceiling for transient errors.
    pub const fn max_step_retries(&self) -> usize {
        self.max_step_retries
    }

    /// Returns the initial backoff between retries in milliseconds.
    pub const fn backoff_base_ms(&self) -> u64 {
        self.backoff_base_ms
    }
}

impl Default for BridgeOrchestratorConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_RECEIPT_TIMEOUT,
            DEFAULT_ATTESTATION_POLL_INTERVAL,
            DEFAULT_ATTESTATION_TIMEOUT,
            DEFAULT_MAX_STEP_RETRIES,
            DEFAULT_BACKOFF_BASE_MS,
        )
    }
}
