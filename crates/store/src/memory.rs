use crate::{StoreError, StoreResult, TransferStore};
use bridge_node_primitives::{BridgeTransfer, TransferId};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc};

/// An in-memory arena of [`BridgeTransfer`] records. Cloning shares the
/// underlying map, which lets a fresh orchestrator resume transfers a
/// previous one persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransferStore {
    transfers: Arc<RwLock<HashMap<TransferId, BridgeTransfer>>>,
}

impl InMemoryTransferStore {
    /// Returns a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn insert(&self, transfer: BridgeTransfer) -> StoreResult<()> {
        let mut transfers = self.transfers.write();
        if transfers.contains_key(&transfer.id) {
            return Err(StoreError::DuplicateTransfer(transfer.id));
        }
        transfers.insert(transfer.id, transfer);
        Ok(())
    }

    async fn update(&self, transfer: BridgeTransfer) -> StoreResult<()> {
        let mut transfers = self.transfers.write();
        if !transfers.contains_key(&transfer.id) {
            return Err(StoreError::UnknownTransfer(transfer.id));
        }
        transfers.insert(transfer.id, transfer);
        Ok(())
    }

    async fn get(&self, id: TransferId) -> StoreResult<Option<BridgeTransfer>> {
        Ok(self.transfers.read().get(&id).cloned())
    }

    async fn all(&self) -> StoreResult<Vec<BridgeTransfer>> {
        Ok(self.transfers.read().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use bridge_node_primitives::{BridgeRequest, TransferState};

    fn transfer(id: u64) -> BridgeTransfer {
        BridgeTransfer::new(
            TransferId(id),
            BridgeRequest::new(
                8453,
                42161,
                3,
                address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
                U256::from(1_000_000u64),
            ),
        )
    }

    #[tokio::test]
    async fn test_insert_get_round_trip() {
        let store = InMemoryTransferStore::new();
        store.insert(transfer(1)).await.unwrap();

        let stored = store.get(TransferId(1)).await.unwrap().unwrap();
        assert_eq!(stored.id, TransferId(1));
        assert!(store.get(TransferId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryTransferStore::new();
        store.insert(transfer(1)).await.unwrap();
        assert!(matches!(
            store.insert(transfer(1)).await,
            Err(StoreError::DuplicateTransfer(TransferId(1)))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_existing_record() {
        let store = InMemoryTransferStore::new();
        assert!(matches!(
            store.update(transfer(1)).await,
            Err(StoreError::UnknownTransfer(TransferId(1)))
        ));

        store.insert(transfer(1)).await.unwrap();
        let mut updated = transfer(1);
        updated.advance(TransferState::Approved);
        store.update(updated).await.unwrap();

        let stored = store.get(TransferId(1)).await.unwrap().unwrap();
        assert_eq!(stored.state, TransferState::Approved);
    }

    #[tokio::test]
    async fn test_clone_shares_records() {
        let store = InMemoryTransferStore::new();
        let shared = store.clone();
        store.insert(transfer(7)).await.unwrap();
        assert!(shared.get(TransferId(7)).await.unwrap().is_some());
    }
}
