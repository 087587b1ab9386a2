use crate::{ChainClient, ChainClientError, ChainClientResult};
use alloy_consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom};
use alloy_primitives::{Address, Bloom, Bytes, LogData, B256};
use alloy_rpc_types_eth::{Log, TransactionReceipt, TransactionRequest};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::time::Instant;

/// A mock implementation of the [`ChainClient`] trait. Submissions consume
/// scripted (hash, receipt) pairs, receipts can also be seeded directly to
/// model transactions submitted by a previous process.
#[derive(Debug, Clone, Default)]
pub struct MockChainClient {
    inner: Arc<Mutex<MockChainState>>,
}

#[derive(Debug, Default)]
struct MockChainState {
    chain_id: u64,
    scripted: VecDeque<(B256, Option<TransactionReceipt>)>,
    receipts: HashMap<B256, TransactionReceipt>,
    call_results: HashMap<Address, Bytes>,
    submitted: Vec<TransactionRequest>,
}

impl MockChainClient {
    /// Returns a new [`MockChainClient`] for the provided chain id.
    pub fn new(chain_id: u64) -> Self {
        let client = Self::default();
        client.inner.lock().unwrap().chain_id = chain_id;
        client
    }

    /// Scripts the outcome of the next submission: the submitted transaction
    /// is assigned `tx_hash` and `receipt` becomes available for it.
    pub fn queue_submission(&self, tx_hash: B256, receipt: TransactionReceipt) {
        self.inner.lock().unwrap().scripted.push_back((tx_hash, Some(receipt)));
    }

    /// Scripts a submission whose receipt never becomes available, modelling
    /// a transaction stuck in the mempool.
    pub fn queue_submission_pending(&self, tx_hash: B256) {
        self.inner.lock().unwrap().scripted.push_back((tx_hash, None));
    }

    /// Seeds a receipt for a transaction hash without a submission, modelling
    /// a transaction confirmed by a previous process.
    pub fn insert_receipt(&self, tx_hash: B256, receipt: TransactionReceipt) {
        self.inner.lock().unwrap().receipts.insert(tx_hash, receipt);
    }

    /// Sets the return data for read-only calls targeting `to`.
    pub fn set_call_result(&self, to: Address, data: Bytes) {
        self.inner.lock().unwrap().call_results.insert(to, data);
    }

    /// Returns the transactions submitted through this client.
    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.inner.lock().unwrap().submitted.clone()
    }

    /// Returns the number of transactions submitted through this client.
    pub fn submission_count(&self) -> usize {
        self.inner.lock().unwrap().submitted.len()
    }
}

#[async_trait::async_trait]
impl ChainClient for MockChainClient {
    fn chain_id(&self) -> u64 {
        self.inner.lock().unwrap().chain_id
    }

    async fn call(&self, tx: TransactionRequest) -> ChainClientResult<Bytes> {
        let state = self.inner.lock().unwrap();
        let to = tx.to.and_then(|kind| kind.to().copied());
        // unseeded reads return a zero word
        Ok(to
            .and_then(|to| state.call_results.get(&to).cloned())
            .unwrap_or_else(|| Bytes::from(vec![0u8; 32])))
    }

    async fn submit(&self, tx: TransactionRequest) -> ChainClientResult<B256> {
        let mut state = self.inner.lock().unwrap();
        let (tx_hash, receipt) =
            state.scripted.pop_front().expect("unscripted submission on mock chain client");
        state.submitted.push(tx);
        if let Some(receipt) = receipt {
            state.receipts.insert(tx_hash, receipt);
        }
        Ok(tx_hash)
    }

    async fn get_receipt(&self, tx_hash: B256) -> ChainClientResult<Option<TransactionReceipt>> {
        Ok(self.inner.lock().unwrap().receipts.get(&tx_hash).cloned())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        timeout: Duration,
    ) -> ChainClientResult<TransactionReceipt> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.inner.lock().unwrap().receipts.get(&tx_hash).cloned() {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                return Err(ChainClientError::ReceiptTimeout(tx_hash));
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// Builds a receipt with the provided status and logs.
pub fn receipt(tx_hash: B256, success: bool, logs: Vec<Log>) -> TransactionReceipt {
    TransactionReceipt {
        inner: ReceiptEnvelope::Eip1559(ReceiptWithBloom {
            receipt: Receipt {
                status: Eip658Value::Eip658(success),
                cumulative_gas_used: 21_000,
                logs,
            },
            logs_bloom: Bloom::default(),
        }),
        transaction_hash: tx_hash,
        transaction_index: Some(0),
        block_hash: Some(B256::repeat_byte(0xbb)),
        block_number: Some(1),
        gas_used: 21_000,
        effective_gas_price: 0,
        blob_gas_used: None,
        blob_gas_price: None,
        from: Address::ZERO,
        to: None,
        contract_address: None,
    }
}

/// Builds a log emitted by `address` with the provided topics and data.
pub fn log(address: Address, topics: Vec<B256>, data: Bytes) -> Log {
    Log {
        inner: alloy_primitives::Log {
            address,
            data: LogData::new_unchecked(topics, data),
        },
        block_hash: None,
        block_number: None,
        block_timestamp: None,
        transaction_hash: None,
        transaction_index: None,
        log_index: None,
        removed: false,
    }
}
