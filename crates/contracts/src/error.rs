use alloy_primitives::B256;
use bridge_node_chain::ChainClientError;

/// A [`Result`] that uses [`ContractInvokerError`] as the error type.
pub type ContractInvokerResult<T> = Result<T, ContractInvokerError>;

/// An error that occurred while invoking a bridge contract.
#[derive(Debug, thiserror::Error)]
pub enum ContractInvokerError {
    /// An error from the underlying chain client.
    #[error(transparent)]
    ChainClient(#[from] ChainClientError),
    /// The receipt carried no `MessageSent` event. Non-retryable without
    /// re-fetching the receipt, the transaction is malformed or unrelated.
    #[error("no MessageSent event found in receipt for transaction {0}")]
    MessageNotFound(B256),
    /// The return data of a read-only call could not be decoded.
    #[error("failed to decode return data of call to {target}: {source}")]
    AbiDecode {
        /// The contract the call targeted.
        target: alloy_primitives::Address,
        /// The decode error.
        source: alloy_sol_types::Error,
    },
}

impl ContractInvokerError {
    /// Whether the error is transient and the operation may be retried.
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::ChainClient(err) => err.is_retryable(),
            Self::MessageNotFound(_) | Self::AbiDecode { .. } => false,
        }
    }
}
