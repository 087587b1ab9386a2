//! Common helpers for bridge node integration tests.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use alloy_rpc_types_eth::TransactionReceipt;
use alloy_sol_types::SolEvent;
use bridge_node_attestation::{test_utils::MockAttestationProvider, AttestationResponse,
    AttestationStatus};
use bridge_node_chain::test_utils::{log, receipt, MockChainClient};
use bridge_node_orchestrator::{
    BridgeOrchestrator, BridgeOrchestratorConfig, BridgeOrchestratorEvent,
    BridgeOrchestratorHandle,
};
use bridge_node_primitives::{BridgeRequest, BridgeTransfer, TransferId, TransferState};
use bridge_node_store::InMemoryTransferStore;
use cctp_contracts::{abi::logs::MessageSent, ContractAddresses, ContractInvoker};
use futures::StreamExt;
use std::time::Duration;

/// The recipient used throughout the tests.
pub const RECIPIENT: Address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

/// A bridge orchestrator over mock collaborators.
#[derive(Debug)]
pub struct TestBridge {
    /// The handle to the running orchestrator.
    pub handle: BridgeOrchestratorHandle,
    /// The mock source chain.
    pub source: MockChainClient,
    /// The mock destination chain.
    pub destination: MockChainClient,
    /// The mock attestation provider.
    pub attestation: MockAttestationProvider,
    /// The shared transfer store.
    pub store: InMemoryTransferStore,
}

/// A bridge request for one unit-million of the smallest token unit.
pub fn request() -> BridgeRequest {
    BridgeRequest::new(8453, 42161, 3, RECIPIENT, U256::from(1_000_000u64))
}

/// The mainnet contract addresses.
pub fn addresses() -> ContractAddresses {
    ContractAddresses {
        source_token: cctp_contracts::BASE_USDC_ADDRESS,
        source_token_messenger: cctp_contracts::BASE_TOKEN_MESSENGER_ADDRESS,
        destination_message_transmitter: cctp_contracts::ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS,
        destination_token: cctp_contracts::ARBITRUM_USDC_ADDRESS,
    }
}

/// A configuration with timings suitable for tests.
pub fn test_config() -> BridgeOrchestratorConfig {
    BridgeOrchestratorConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(1),
        Duration::from_secs(5),
        2,
        1,
    )
}

/// A configuration whose attestation ceiling is hit almost immediately.
pub fn short_attestation_config() -> BridgeOrchestratorConfig {
    BridgeOrchestratorConfig::new(
        Duration::from_millis(50),
        Duration::from_millis(1),
        Duration::from_millis(10),
        2,
        1,
    )
}

/// Spawns an orchestrator over fresh mocks and the provided store and
/// config.
pub async fn spawn_bridge(
    store: InMemoryTransferStore,
    config: BridgeOrchestratorConfig,
) -> eyre::Result<TestBridge> {
    let source = MockChainClient::new(8453);
    let destination = MockChainClient::new(42161);
    let attestation = MockAttestationProvider::default();

    let invoker = ContractInvoker::new(source.clone(), destination.clone(), addresses());
    let (orchestrator, handle) =
        BridgeOrchestrator::new(invoker, attestation.clone(), store.clone(), config).await?;
    tokio::spawn(orchestrator.run());

    Ok(TestBridge { handle, source, destination, attestation, store })
}

/// A confirmed burn receipt carrying a `MessageSent` event with the provided
/// payload.
pub fn burn_receipt(tx_hash: B256, message: &'static [u8]) -> TransactionReceipt {
    let event = MessageSent { message: Bytes::from_static(message) };
    let log_data = event.encode_log_data();
    let log = log(addresses().source_token_messenger, log_data.topics().to_vec(), log_data.data);
    receipt(tx_hash, true, vec![log])
}

/// A pending attestation response.
pub fn pending() -> AttestationResponse {
    AttestationResponse::default()
}

/// A complete attestation response with the provided signature.
pub fn complete(signature: &'static [u8]) -> AttestationResponse {
    AttestationResponse {
        status: AttestationStatus::Complete,
        attestation: Some(Bytes::from_static(signature)),
    }
}

/// Polls the orchestrator until the transfer reaches the expected state.
/// Panics if a different terminal state is reached first or the wait times
/// out.
pub async fn wait_for_state(
    handle: &BridgeOrchestratorHandle,
    id: TransferId,
    state: TransferState,
) -> BridgeTransfer {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(transfer) = handle.status(id).await.expect("status query") {
                if transfer.state == state {
                    return transfer;
                }
                assert!(
                    !transfer.state.is_terminal(),
                    "transfer reached terminal state {} while waiting for {state}",
                    transfer.state,
                );
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("timed out waiting for transfer state")
}

/// Waits for the next event on the handle matching the predicate.
pub async fn wait_for_event(
    handle: &mut BridgeOrchestratorHandle,
    mut predicate: impl FnMut(&BridgeOrchestratorEvent) -> bool,
) -> BridgeOrchestratorEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let event = handle.next().await.expect("event stream closed");
            if predicate(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}
