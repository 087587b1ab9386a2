//! Attestation client for the bridge node.
//!
//! The attestation service is polled, not subscribed to: the client asks for
//! the signed proof keyed by a message hash until the service reports it
//! `complete`, bounded by a configurable ceiling. Hitting the ceiling is a
//! resumable condition, polling can be picked up later with the same message
//! hash without resubmitting any transaction.

mod client;
pub use client::OnlineAttestationClient;

mod error;
pub use error::{AttestationError, AttestationResult};

mod metrics;
pub use metrics::AttestationMetrics;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers.
pub mod test_utils;

use alloy_primitives::{Bytes, B256};
use std::time::Duration;
use tokio::time::Instant;

/// The status reported by the attestation service for a message hash.
///
/// Any status other than `complete`, including vocabulary the service grows
/// later, decodes as [`Self::Pending`]. A poll round never errors on an
/// unrecognized status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationStatus {
    /// The attestation is signed and available.
    Complete,
    /// The attestation is not available yet.
    #[default]
    #[serde(other)]
    Pending,
}

/// A response from the attestation service.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttestationResponse {
    /// The reported status.
    pub status: AttestationStatus,
    /// The attestation signature, present once the status is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<Bytes>,
}

impl AttestationResponse {
    /// Returns the signature if the response is complete and carries one.
    pub fn into_signature(self) -> Option<Bytes> {
        (self.status == AttestationStatus::Complete)
            .then_some(self.attestation)
            .flatten()
            .filter(|signature| !signature.is_empty())
    }
}

/// An instance of the trait can fetch attestations for a message hash.
/// Implementations must be safe for concurrent use by multiple transfers.
#[async_trait::async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait AttestationProvider: Send + Sync {
    /// Fetches the current attestation state for the provided message hash.
    async fn fetch_attestation(&self, message_hash: B256)
        -> AttestationResult<AttestationResponse>;
}

/// Polls the provider at `interval` until the attestation for `message_hash`
/// is complete, bounded by `timeout`.
///
/// Network errors within a poll round are logged and absorbed, they only
/// surface as [`AttestationError::Timeout`] once the ceiling is reached
/// without a complete response.
pub async fn poll_attestation<AP: AttestationProvider>(
    provider: &AP,
    message_hash: B256,
    interval: Duration,
    timeout: Duration,
) -> AttestationResult<Bytes> {
    let deadline = Instant::now() + timeout;
    loop {
        match provider.fetch_attestation(message_hash).await {
            Ok(response) => {
                if let Some(signature) = response.into_signature() {
                    tracing::debug!(target: "bridge::attestation", %message_hash, "attestation complete");
                    return Ok(signature);
                }
                tracing::trace!(target: "bridge::attestation", %message_hash, "attestation pending");
            }
            Err(err) => {
                tracing::warn!(target: "bridge::attestation", %message_hash, ?err, "attestation poll failed, retrying within ceiling");
            }
        }
        if Instant::now() + interval > deadline {
            return Err(AttestationError::Timeout(message_hash));
        }
        tokio::time::sleep(interval).await;
    }
}
