use bridge_node_primitives::{InvalidRequestError, TransferId};
use bridge_node_store::StoreError;

/// An error that occurred in the bridge orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum BridgeOrchestratorError {
    /// The bridge request failed validation.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),
    /// The transfer does not exist.
    #[error("unknown transfer {0}")]
    UnknownTransfer(TransferId),
    /// The transfer already has an active driver, submissions are serialized
    /// per transfer.
    #[error("transfer {0} already has an active driver")]
    DriverActive(TransferId),
    /// The transfer is in a state that cannot be resumed.
    #[error("transfer {0} cannot be resumed from its current state")]
    NotResumable(TransferId),
    /// An error from the transfer store.
    #[error("transfer store error: {0}")]
    Store(#[from] StoreError),
    /// The orchestrator command channel was closed.
    #[error("orchestrator command channel closed")]
    CommandChannelClosed,
}
