use alloy_json_rpc::RpcError;
use alloy_primitives::B256;
use alloy_transport::TransportErrorKind;

/// A [`Result`] that uses [`ChainClientError`] as the error type.
pub type ChainClientResult<T> = Result<T, ChainClientError>;

/// An error that occurred in a chain client.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    /// An error at the RPC transport level. Retryable.
    #[error("rpc transport error: {0}")]
    Transport(#[from] RpcError<TransportErrorKind>),
    /// No receipt became available for the transaction within the
    /// confirmation timeout. Retryable, the transaction may still land.
    #[error("timed out waiting for receipt of transaction {0}")]
    ReceiptTimeout(B256),
    /// The chain id reported by the RPC endpoint does not match the
    /// configured one. Fatal misconfiguration, surfaced at startup.
    #[error("configured chain id {configured} does not match rpc chain id {actual}")]
    ChainIdMismatch {
        /// The chain id from the configuration.
        configured: u64,
        /// The chain id reported by the endpoint.
        actual: u64,
    },
}

impl ChainClientError {
    /// Whether the error is transient and the operation may be retried.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ReceiptTimeout(_))
    }
}
