use alloy_primitives::B256;

/// A [`Result`] that uses [`AttestationError`] as the error type.
pub type AttestationResult<T> = Result<T, AttestationError>;

/// An error that occurred while fetching an attestation.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    /// An HTTP-level error from the attestation service. Retryable within the
    /// polling ceiling.
    #[error("attestation request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The polling ceiling was reached without a complete attestation.
    /// Resumable, polling can restart later with the same message hash.
    #[error("timed out waiting for attestation of message {0}")]
    Timeout(B256),
}
