//! Transfer persistence for the bridge node.
//!
//! Durable persistence of [`BridgeTransfer`] records is owned by an external
//! collaborator behind the [`TransferStore`] trait. The orchestrator writes
//! through the trait after every state change so a retained store is always
//! sufficient to resume in-flight transfers. [`InMemoryTransferStore`] is the
//! reference implementation and test double.

mod memory;
pub use memory::InMemoryTransferStore;

use bridge_node_primitives::{BridgeTransfer, TransferId};

/// A [`Result`] that uses [`StoreError`] as the error type.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error that occurred in a transfer store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A transfer with the same id already exists.
    #[error("transfer {0} already exists")]
    DuplicateTransfer(TransferId),
    /// The transfer does not exist in the store.
    #[error("transfer {0} not found")]
    UnknownTransfer(TransferId),
    /// An error from the storage backend.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// The persistence collaborator for [`BridgeTransfer`] records, keyed by
/// transfer id. Records are inserted once, updated after every state change
/// and never deleted by the bridge.
#[async_trait::async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait TransferStore: Send + Sync {
    /// Inserts a new transfer. Fails if the id already exists.
    async fn insert(&self, transfer: BridgeTransfer) -> StoreResult<()>;

    /// Replaces the stored record of an existing transfer.
    async fn update(&self, transfer: BridgeTransfer) -> StoreResult<()>;

    /// Returns the transfer with the provided id, if any.
    async fn get(&self, id: TransferId) -> StoreResult<Option<BridgeTransfer>>;

    /// Returns all stored transfers.
    async fn all(&self) -> StoreResult<Vec<BridgeTransfer>>;
}
