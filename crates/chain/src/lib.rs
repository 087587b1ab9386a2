//! Chain client abstraction for the bridge node.
//!
//! A [`ChainClient`] is a thin wrapper over a single chain's read/write RPC:
//! submit a transaction, fetch a receipt, wait for a confirmation. It never
//! retries internally, callers own the retry cadence. Reverted transactions
//! are reported through the receipt, not as errors.

mod error;
pub use error::{ChainClientError, ChainClientResult};

mod client;
pub use client::OnlineChainClient;

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers.
pub mod test_utils;

use alloy_primitives::{Bytes, B256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use std::time::Duration;

/// The interval between receipt polls while waiting for a confirmation.
#[cfg(any(test, feature = "test-utils"))]
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(1);
/// The interval between receipt polls while waiting for a confirmation.
#[cfg(not(any(test, feature = "test-utils")))]
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A thin abstraction over a single chain's read/write RPC. Implementations
/// must be safe for concurrent use by multiple transfers.
#[async_trait::async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait ChainClient: Send + Sync {
    /// The network id of the chain this client talks to.
    fn chain_id(&self) -> u64;

    /// Executes the transaction as a read-only call and returns the raw
    /// return data.
    async fn call(&self, tx: TransactionRequest) -> ChainClientResult<Bytes>;

    /// Broadcasts the transaction to the network and returns its hash without
    /// waiting for inclusion.
    async fn submit(&self, tx: TransactionRequest) -> ChainClientResult<B256>;

    /// Returns the receipt for the provided transaction hash, or `None` if
    /// the transaction is unknown to the chain.
    async fn get_receipt(&self, tx_hash: B256) -> ChainClientResult<Option<TransactionReceipt>>;

    /// Polls for the receipt of the provided transaction hash until it is
    /// available or `timeout` elapses, in which case
    /// [`ChainClientError::ReceiptTimeout`] is returned.
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        timeout: Duration,
    ) -> ChainClientResult<TransactionReceipt>;
}
