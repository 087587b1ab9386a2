use crate::InvalidRequestError;
use alloy_primitives::{Address, U256};

/// The input to a bridge operation. Immutable once accepted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BridgeRequest {
    /// The network id of the source chain.
    pub source_chain_id: u64,
    /// The network id of the destination chain.
    pub destination_chain_id: u64,
    /// The protocol-level domain code of the destination chain. Distinct from
    /// the network id.
    pub destination_domain: u32,
    /// The recipient of the minted funds on the destination chain.
    pub recipient: Address,
    /// The transfer amount in the token's smallest unit.
    pub amount: U256,
}

impl BridgeRequest {
    /// Returns a new [`BridgeRequest`].
    pub const fn new(
        source_chain_id: u64,
        destination_chain_id: u64,
        destination_domain: u32,
        recipient: Address,
        amount: U256,
    ) -> Self {
        Self { source_chain_id, destination_chain_id, destination_domain, recipient, amount }
    }

    /// Validates the request, rejecting zero amounts and identical source and
    /// destination chains.
    pub fn validate(&self) -> Result<(), InvalidRequestError> {
        if self.amount.is_zero() {
            return Err(InvalidRequestError::ZeroAmount);
        }
        if self.source_chain_id == self.destination_chain_id {
            return Err(InvalidRequestError::SameChain(self.source_chain_id));
        }
        Ok(())
    }
}
