use crate::{
    abi::logs::{try_decode_log, MessageSent},
    ContractInvokerError, ContractInvokerResult,
};
use alloy_primitives::{keccak256, Address, Bytes, B256};
use alloy_rpc_types_eth::TransactionReceipt;

/// Left-zero-pads the recipient address to the destination chain's native
/// 32-byte word width, as expected by the `mintRecipient` parameter of the
/// burn call.
pub fn pad_recipient(recipient: Address) -> B256 {
    B256::left_padding_from(recipient.as_slice())
}

/// Scans the receipt's logs for the `MessageSent` event and returns the raw
/// cross-chain message payload. A pure decode over already-finalized data.
///
/// Fails with [`ContractInvokerError::MessageNotFound`] if no log matches,
/// which signals a malformed or unrelated receipt.
pub fn extract_message(receipt: &TransactionReceipt) -> ContractInvokerResult<Bytes> {
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| try_decode_log::<MessageSent>(&log.inner))
        .map(|log| log.data.message)
        .ok_or(ContractInvokerError::MessageNotFound(receipt.transaction_hash))
}

/// Hashes the raw message payload into the attestation lookup key. The
/// destination chain's message transmitter independently recomputes this hash
/// over the same bytes, so no transformation may be applied between extraction
/// and hashing.
pub fn message_hash(message: &[u8]) -> B256 {
    keccak256(message)
}
