use crate::{AttestationProvider, AttestationResponse, AttestationResult};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// A mock implementation of the [`AttestationProvider`] trait. Fetches
/// consume scripted responses in order, an empty script yields pending.
#[derive(Debug, Clone, Default)]
pub struct MockAttestationProvider {
    inner: Arc<Mutex<MockAttestationState>>,
}

#[derive(Debug, Default)]
struct MockAttestationState {
    responses: VecDeque<AttestationResponse>,
    fetches: u64,
}

impl MockAttestationProvider {
    /// Scripts the next response returned by the provider.
    pub fn script(&self, response: AttestationResponse) {
        self.inner.lock().unwrap().responses.push_back(response);
    }

    /// Returns the number of fetches issued against the provider.
    pub fn fetch_count(&self) -> u64 {
        self.inner.lock().unwrap().fetches
    }
}

#[async_trait::async_trait]
impl AttestationProvider for MockAttestationProvider {
    async fn fetch_attestation(
        &self,
        _message_hash: alloy_primitives::B256,
    ) -> AttestationResult<AttestationResponse> {
        let mut state = self.inner.lock().unwrap();
        state.fetches += 1;
        Ok(state.responses.pop_front().unwrap_or_default())
    }
}
