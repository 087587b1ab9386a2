use crate::{
    abi::calls::{approveCall, balanceOfCall, depositForBurnCall, receiveMessageCall},
    extract_message, pad_recipient, ContractInvokerError, ContractInvokerResult,
};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_sol_types::SolCall;
use bridge_node_chain::ChainClient;

/// The contract addresses the invoker operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAddresses {
    /// The burn token on the source chain.
    pub source_token: Address,
    /// The burn-capable token messenger on the source chain.
    pub source_token_messenger: Address,
    /// The message-receiving transmitter on the destination chain.
    pub destination_message_transmitter: Address,
    /// The mint token on the destination chain.
    pub destination_token: Address,
}

/// Encodes and submits the ABI-level protocol calls against the two chains:
/// spend approval and burn on the source chain, mint on the destination
/// chain, plus token balance reads on both.
#[derive(Debug, Clone)]
pub struct ContractInvoker<SC, DC> {
    /// The source chain client.
    source: SC,
    /// The destination chain client.
    destination: DC,
    /// The contract addresses.
    addresses: ContractAddresses,
}

impl<SC: ChainClient, DC: ChainClient> ContractInvoker<SC, DC> {
    /// Returns a new [`ContractInvoker`] over the provided chain clients.
    pub const fn new(source: SC, destination: DC, addresses: ContractAddresses) -> Self {
        Self { source, destination, addresses }
    }

    /// Returns the contract addresses the invoker operates on.
    pub const fn addresses(&self) -> &ContractAddresses {
        &self.addresses
    }

    /// Submits a spend approval of `amount` for the token messenger on the
    /// source chain and returns the transaction hash.
    pub async fn approve_spend(&self, amount: U256) -> ContractInvokerResult<B256> {
        let call = approveCall { spender: self.addresses.source_token_messenger, value: amount };
        let tx = TransactionRequest::default()
            .with_to(self.addresses.source_token)
            .with_input(call.abi_encode());
        tracing::debug!(target: "bridge::contracts", %amount, token = %self.addresses.source_token, "submitting spend approval");
        Ok(self.source.submit(tx).await?)
    }

    /// Submits the burn of `amount` on the source chain and returns the
    /// transaction hash. The recipient is left-zero-padded to the word width
    /// expected by the messenger.
    pub async fn burn_for_transfer(
        &self,
        amount: U256,
        destination_domain: u32,
        recipient: Address,
    ) -> ContractInvokerResult<B256> {
        let call = depositForBurnCall {
            amount,
            destinationDomain: destination_domain,
            mintRecipient: pad_recipient(recipient),
            burnToken: self.addresses.source_token,
        };
        let tx = TransactionRequest::default()
            .with_to(self.addresses.source_token_messenger)
            .with_input(call.abi_encode());
        tracing::debug!(
            target: "bridge::contracts",
            %amount,
            destination_domain,
            %recipient,
            "submitting burn"
        );
        Ok(self.source.submit(tx).await?)
    }

    /// Decodes the cross-chain message payload from the burn receipt.
    pub fn extract_message(&self, receipt: &TransactionReceipt) -> ContractInvokerResult<Bytes> {
        extract_message(receipt)
    }

    /// Submits the mint on the destination chain and returns the transaction
    /// hash. The message bytes must be the untouched extraction output, the
    /// transmitter recomputes their hash against the attestation.
    pub async fn submit_mint(
        &self,
        message: Bytes,
        attestation: Bytes,
    ) -> ContractInvokerResult<B256> {
        let call = receiveMessageCall { message, attestation };
        let tx = TransactionRequest::default()
            .with_to(self.addresses.destination_message_transmitter)
            .with_input(call.abi_encode());
        tracing::debug!(
            target: "bridge::contracts",
            transmitter = %self.addresses.destination_message_transmitter,
            "submitting mint"
        );
        Ok(self.destination.submit(tx).await?)
    }

    /// Reads the source token balance of `owner`.
    pub async fn source_token_balance(&self, owner: Address) -> ContractInvokerResult<U256> {
        self.token_balance(&self.source, self.addresses.source_token, owner).await
    }

    /// Reads the destination token balance of `owner`.
    pub async fn destination_token_balance(&self, owner: Address) -> ContractInvokerResult<U256> {
        self.token_balance(&self.destination, self.addresses.destination_token, owner).await
    }

    async fn token_balance<C: ChainClient>(
        &self,
        client: &C,
        token: Address,
        owner: Address,
    ) -> ContractInvokerResult<U256> {
        let call = balanceOfCall { account: owner };
        let tx = TransactionRequest::default().with_to(token).with_input(call.abi_encode());
        let data = client.call(tx).await?;
        let balance = balanceOfCall::abi_decode_returns(&data)
            .map_err(|source| ContractInvokerError::AbiDecode { target: token, source })?;
        Ok(balance)
    }

    /// Returns a reference to the source chain client.
    pub const fn source(&self) -> &SC {
        &self.source
    }

    /// Returns a reference to the destination chain client.
    pub const fn destination(&self) -> &DC {
        &self.destination
    }
}
