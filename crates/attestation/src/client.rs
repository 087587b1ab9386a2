use crate::{AttestationMetrics, AttestationProvider, AttestationResponse, AttestationResult};
use alloy_primitives::B256;
use reqwest::Client;

/// The attestations api method prefix.
const ATTESTATIONS_METHOD_PREFIX: &str = "attestations";

/// An online implementation of the [`AttestationProvider`] trait against an
/// Iris-compatible HTTP service.
#[derive(Debug, Clone)]
pub struct OnlineAttestationClient {
    /// The base URL of the attestation API.
    base: String,
    /// The inner reqwest client.
    inner: Client,
    /// The attestation metrics.
    metrics: AttestationMetrics,
}

impl OnlineAttestationClient {
    /// Creates a new [`OnlineAttestationClient`] from the provided base URL.
    pub fn new_http(mut base: String) -> Self {
        // If base ends with a slash, remove it
        if base.ends_with("/") {
            base.remove(base.len() - 1);
        }
        Self { base, inner: Client::new(), metrics: AttestationMetrics::default() }
    }
}

#[async_trait::async_trait]
impl AttestationProvider for OnlineAttestationClient {
    async fn fetch_attestation(
        &self,
        message_hash: B256,
    ) -> AttestationResult<AttestationResponse> {
        self.metrics.polls.increment(1);
        let response = self
            .inner
            .get(format!("{}/{}/{}", self.base, ATTESTATIONS_METHOD_PREFIX, message_hash))
            .send()
            .await?;
        Ok(response.json::<AttestationResponse>().await?)
    }
}
