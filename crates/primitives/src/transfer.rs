use crate::{BridgeRequest, BridgeStep, FailureReason, TransferState};
use alloy_primitives::{Bytes, B256};

/// The opaque identifier of a [`BridgeTransfer`], assigned by the orchestrator
/// at creation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    derive_more::From,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct TransferId(pub u64);

/// Per-step retry counters for a [`BridgeTransfer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StepAttempts {
    /// Attempts of the approve step.
    pub approve: u32,
    /// Attempts of the burn step.
    pub burn: u32,
    /// Attempts of the message extraction step.
    pub extract: u32,
    /// Attempts of the attestation polling step.
    pub attest: u32,
    /// Attempts of the mint step.
    pub mint: u32,
}

impl StepAttempts {
    /// Records an attempt of the provided step.
    pub fn record(&mut self, step: BridgeStep) {
        match step {
            BridgeStep::Approve => self.approve += 1,
            BridgeStep::Burn => self.burn += 1,
            BridgeStep::Extract => self.extract += 1,
            BridgeStep::Attest => self.attest += 1,
            BridgeStep::Mint => self.mint += 1,
        }
    }
}

/// The unit of work and persistence of the bridge: a single burn -> attest ->
/// mint lifecycle. Mutated only by the orchestrator, persisted after every
/// state change, never deleted by this subsystem.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BridgeTransfer {
    /// The transfer id.
    pub id: TransferId,
    /// The originating request.
    pub request: BridgeRequest,
    /// The current lifecycle state.
    pub state: TransferState,
    /// The spend approval transaction hash, set once the approval is
    /// submitted.
    pub approve_tx_hash: Option<B256>,
    /// The burn transaction hash, set once the burn is submitted.
    pub burn_tx_hash: Option<B256>,
    /// The mint transaction hash, set once the mint is submitted.
    pub mint_tx_hash: Option<B256>,
    /// The raw cross-chain message decoded from the burn receipt.
    pub message_bytes: Option<Bytes>,
    /// The keccak256 hash of [`Self::message_bytes`]. The attestation lookup
    /// key, always derived, never invented.
    pub message_hash: Option<B256>,
    /// The attestation signature returned by the attestation service.
    pub attestation_signature: Option<Bytes>,
    /// The last recorded failure, set only in [`TransferState::Failed`].
    pub last_error: Option<FailureReason>,
    /// Per-step retry counters.
    pub attempts: StepAttempts,
}

impl BridgeTransfer {
    /// Returns a new transfer in [`TransferState::Created`] for the provided
    /// request.
    pub const fn new(id: TransferId, request: BridgeRequest) -> Self {
        Self {
            id,
            request,
            state: TransferState::Created,
            approve_tx_hash: None,
            burn_tx_hash: None,
            mint_tx_hash: None,
            message_bytes: None,
            message_hash: None,
            attestation_signature: None,
            last_error: None,
            attempts: StepAttempts {
                approve: 0,
                burn: 0,
                extract: 0,
                attest: 0,
                mint: 0,
            },
        }
    }

    /// Advances the transfer to the provided state. Panics in debug builds on
    /// a backwards transition, the orchestrator only ever moves forward.
    pub fn advance(&mut self, state: TransferState) {
        debug_assert!(!self.state.is_terminal(), "terminal transfers do not advance");
        self.state = state;
    }

    /// Moves the transfer to [`TransferState::Failed`] with the provided
    /// reason.
    pub fn fail(&mut self, reason: FailureReason) {
        self.last_error = Some(reason);
        self.state = TransferState::Failed;
    }

    /// Whether the burn has been observed confirmed on the source chain.
    /// Cancellation of a transfer past this point must leave the record
    /// resumable, the source-chain funds are already burned.
    pub fn burn_confirmed(&self) -> bool {
        !matches!(self.state, TransferState::Created | TransferState::Approved)
    }
}
