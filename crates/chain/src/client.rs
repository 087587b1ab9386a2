use crate::{ChainClient, ChainClientError, ChainClientResult, RECEIPT_POLL_INTERVAL};
use alloy_primitives::{Bytes, B256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use std::time::Duration;
use tokio::time::Instant;

/// A [`ChainClient`] backed by an alloy [`Provider`]. Signing and nonce
/// management are the provider's concern, configure it with a wallet filler.
/// The provider should also implement a backoff strategy using
/// [`alloy_transport::layers::RetryBackoffLayer`] to avoid excessive queries
/// on the RPC endpoint.
#[derive(Debug, Clone)]
pub struct OnlineChainClient<P> {
    /// The provider for the chain.
    provider: P,
    /// The verified network id of the chain.
    chain_id: u64,
}

impl<P: Provider> OnlineChainClient<P> {
    /// Creates a new [`OnlineChainClient`], verifying that the endpoint serves
    /// the expected chain. A mismatch or an unreachable endpoint is fatal and
    /// must abort startup, not be retried per-transfer.
    pub async fn new(provider: P, expected_chain_id: u64) -> ChainClientResult<Self> {
        let actual = provider.get_chain_id().await?;
        if actual != expected_chain_id {
            return Err(ChainClientError::ChainIdMismatch {
                configured: expected_chain_id,
                actual,
            });
        }
        Ok(Self { provider, chain_id: expected_chain_id })
    }
}

#[async_trait::async_trait]
impl<P: Provider> ChainClient for OnlineChainClient<P> {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, tx: TransactionRequest) -> ChainClientResult<Bytes> {
        Ok(self.provider.call(tx).await?)
    }

    async fn submit(&self, tx: TransactionRequest) -> ChainClientResult<B256> {
        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(target: "bridge::chain", chain_id = self.chain_id, %tx_hash, "submitted transaction");
        Ok(tx_hash)
    }

    async fn get_receipt(&self, tx_hash: B256) -> ChainClientResult<Option<TransactionReceipt>> {
        Ok(self.provider.get_transaction_receipt(tx_hash).await?)
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        timeout: Duration,
    ) -> ChainClientResult<TransactionReceipt> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            if Instant::now() >= deadline {
                tracing::warn!(target: "bridge::chain", chain_id = self.chain_id, %tx_hash, "confirmation timed out");
                return Err(ChainClientError::ReceiptTimeout(tx_hash));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
