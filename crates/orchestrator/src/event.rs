use alloy_primitives::B256;
use bridge_node_primitives::{FailureReason, TransferId, TransferState};

/// An event emitted by the `BridgeOrchestrator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOrchestratorEvent {
    /// A transfer has been accepted and persisted.
    TransferCreated {
        /// The transfer id.
        id: TransferId,
    },
    /// A transfer advanced to a new state.
    StateAdvanced {
        /// The transfer id.
        id: TransferId,
        /// The new state.
        state: TransferState,
    },
    /// The attestation ceiling was reached. The transfer keeps its state and
    /// can be resumed later with the same message hash.
    AttestationTimedOut {
        /// The transfer id.
        id: TransferId,
    },
    /// A transfer reached [`TransferState::Minted`].
    TransferMinted {
        /// The transfer id.
        id: TransferId,
        /// The hash of the confirmed mint transaction.
        mint_tx_hash: B256,
    },
    /// A transfer moved to [`TransferState::Failed`].
    TransferFailed {
        /// The transfer id.
        id: TransferId,
        /// The recorded failure reason.
        reason: FailureReason,
    },
    /// A driver stopped on cancellation. Pre-burn transfers are abandonable,
    /// post-burn transfers remain resumable.
    TransferCancelled {
        /// The transfer id.
        id: TransferId,
        /// The state the transfer was left in.
        state: TransferState,
    },
}
