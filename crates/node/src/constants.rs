/// The max retries for the chain providers.
pub(crate) const PROVIDER_MAX_RETRIES: u32 = 10;

/// The initial backoff for the chain providers.
pub(crate) const PROVIDER_INITIAL_BACKOFF: u64 = 100;

/// The default provider compute units per second.
pub(crate) const PROVIDER_COMPUTE_UNITS_PER_SECOND: u64 = 10000;

/// The default interval between attestation polls in seconds.
pub(crate) const DEFAULT_ATTESTATION_POLL_INTERVAL: u64 = 2;

/// The default ceiling on a single attestation wait in seconds.
pub(crate) const DEFAULT_ATTESTATION_TIMEOUT: u64 = 20 * 60;

/// The default ceiling on a single confirmation wait in seconds.
pub(crate) const DEFAULT_RECEIPT_TIMEOUT: u64 = 120;

/// The default per-step retry ceiling for transient errors.
pub(crate) const DEFAULT_MAX_STEP_RETRIES: usize = 5;

/// The default initial retry backoff in milliseconds.
pub(crate) const DEFAULT_BACKOFF_BASE_MS: u64 = 200;
