//! End-to-end lifecycle tests of the bridge orchestrator over mock chains
//! and a mock attestation service.

use alloy_primitives::{keccak256, B256, U256};
use alloy_sol_types::SolCall;
use bridge_node_primitives::{BridgeTransfer, TransferId, TransferState};
use bridge_node_store::{InMemoryTransferStore, TransferStore};
use cctp_contracts::abi::calls::receiveMessageCall;
use tests::{
    burn_receipt, complete, pending, request, spawn_bridge, test_config, wait_for_state,
};

const APPROVE_HASH: B256 = B256::repeat_byte(0xa1);
const BURN_HASH: B256 = B256::repeat_byte(0xb2);
const MINT_HASH: B256 = B256::repeat_byte(0xc3);

#[tokio::test]
async fn test_fault_free_transfer_mints_exactly_once() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge
        .source
        .queue_submission(APPROVE_HASH, bridge_node_chain::test_utils::receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge
        .destination
        .queue_submission(MINT_HASH, bridge_node_chain::test_utils::receipt(MINT_HASH, true, vec![]));
    bridge.attestation.script(complete(&[0xab, 0xcd]));

    let id = bridge.handle.bridge(request()).await?;
    let transfer = wait_for_state(&bridge.handle, id, TransferState::Minted).await;

    // exactly one burn and one mint transaction
    assert_eq!(bridge.source.submission_count(), 2); // approve + burn
    assert_eq!(bridge.destination.submission_count(), 1);

    assert_eq!(transfer.approve_tx_hash, Some(APPROVE_HASH));
    assert_eq!(transfer.burn_tx_hash, Some(BURN_HASH));
    assert_eq!(transfer.mint_tx_hash, Some(MINT_HASH));
    assert!(transfer.last_error.is_none());

    // the recorded hash is derived from the recorded bytes, nothing else
    let message = transfer.message_bytes.expect("message extracted");
    assert_eq!(message.as_ref(), b"cctp message v1");
    assert_eq!(transfer.message_hash, Some(keccak256(&message)));
    assert_eq!(transfer.attestation_signature.unwrap().as_ref(), &[0xab, 0xcd]);
    Ok(())
}

#[tokio::test]
async fn test_attestation_polled_until_complete() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge
        .source
        .queue_submission(APPROVE_HASH, bridge_node_chain::test_utils::receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge
        .destination
        .queue_submission(MINT_HASH, bridge_node_chain::test_utils::receipt(MINT_HASH, true, vec![]));
    // pending twice, then complete
    bridge.attestation.script(pending());
    bridge.attestation.script(pending());
    bridge.attestation.script(complete(&[0xab]));

    let id = bridge.handle.bridge(request()).await?;
    wait_for_state(&bridge.handle, id, TransferState::Minted).await;

    // exactly three polls, then exactly one mint carrying the signature
    assert_eq!(bridge.attestation.fetch_count(), 3);
    let mint_txs = bridge.destination.submitted();
    assert_eq!(mint_txs.len(), 1);
    let call = receiveMessageCall::abi_decode(mint_txs[0].input.input().unwrap())?;
    assert_eq!(call.message.as_ref(), b"cctp message v1");
    assert_eq!(call.attestation.as_ref(), &[0xab]);
    Ok(())
}

#[tokio::test]
async fn test_confirmed_burn_is_not_resubmitted_on_resume() -> eyre::Result<()> {
    let store = InMemoryTransferStore::new();

    // a transfer that crashed after the burn was submitted but before its
    // confirmation was observed
    let mut transfer = BridgeTransfer::new(TransferId(0), request());
    transfer.advance(TransferState::Approved);
    transfer.approve_tx_hash = Some(APPROVE_HASH);
    transfer.burn_tx_hash = Some(BURN_HASH);
    store.insert(transfer).await?;

    let bridge = spawn_bridge(store, test_config()).await?;
    // the burn already confirmed on chain
    bridge.source.insert_receipt(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge
        .destination
        .queue_submission(MINT_HASH, bridge_node_chain::test_utils::receipt(MINT_HASH, true, vec![]));
    bridge.attestation.script(complete(&[0xab]));

    bridge.handle.resume(TransferId(0)).await?;
    let transfer = wait_for_state(&bridge.handle, TransferId(0), TransferState::Minted).await;

    // no second burn was submitted
    assert_eq!(bridge.source.submission_count(), 0);
    assert_eq!(bridge.destination.submission_count(), 1);
    assert_eq!(transfer.burn_tx_hash, Some(BURN_HASH));
    Ok(())
}

#[tokio::test]
async fn test_crash_resume_after_burned_reaches_minted() -> eyre::Result<()> {
    let store = InMemoryTransferStore::new();

    // state persisted after BURNED but before MESSAGE_EXTRACTED
    let mut transfer = BridgeTransfer::new(TransferId(0), request());
    transfer.advance(TransferState::Approved);
    transfer.approve_tx_hash = Some(APPROVE_HASH);
    transfer.burn_tx_hash = Some(BURN_HASH);
    transfer.advance(TransferState::Burned);
    store.insert(transfer).await?;

    // a fresh orchestrator attached to the retained store
    let bridge = spawn_bridge(store, test_config()).await?;
    bridge.source.insert_receipt(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge
        .destination
        .queue_submission(MINT_HASH, bridge_node_chain::test_utils::receipt(MINT_HASH, true, vec![]));
    bridge.attestation.script(complete(&[0xab]));

    bridge.handle.resume(TransferId(0)).await?;
    let transfer = wait_for_state(&bridge.handle, TransferId(0), TransferState::Minted).await;

    // burn was not re-submitted, the message was re-extracted from the
    // stored burn receipt
    assert_eq!(bridge.source.submission_count(), 0);
    assert_eq!(bridge.destination.submission_count(), 1);
    assert_eq!(transfer.message_hash, Some(keccak256(b"cctp message v1")));
    Ok(())
}

#[tokio::test]
async fn test_transfer_ids_continue_after_restart() -> eyre::Result<()> {
    let store = InMemoryTransferStore::new();
    let mut finished = BridgeTransfer::new(TransferId(4), request());
    finished.state = TransferState::Minted;
    store.insert(finished).await?;

    let bridge = spawn_bridge(store, test_config()).await?;
    bridge
        .source
        .queue_submission(APPROVE_HASH, bridge_node_chain::test_utils::receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge
        .destination
        .queue_submission(MINT_HASH, bridge_node_chain::test_utils::receipt(MINT_HASH, true, vec![]));
    bridge.attestation.script(complete(&[0xab]));

    let id = bridge.handle.bridge(request()).await?;
    assert_eq!(id, TransferId(5));
    wait_for_state(&bridge.handle, id, TransferState::Minted).await;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_transfers_progress_independently() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    let hashes: Vec<[B256; 3]> = (0..3u8)
        .map(|i| {
            [
                B256::repeat_byte(0x10 + i),
                B256::repeat_byte(0x20 + i),
                B256::repeat_byte(0x30 + i),
            ]
        })
        .collect();
    // drivers interleave on the shared submission queue, so every source
    // receipt carries the message event to stay valid for either step
    for [approve, burn, mint] in &hashes {
        bridge.source.queue_submission(*approve, burn_receipt(*approve, b"cctp message v1"));
        bridge.source.queue_submission(*burn, burn_receipt(*burn, b"cctp message v1"));
        bridge
            .destination
            .queue_submission(*mint, bridge_node_chain::test_utils::receipt(*mint, true, vec![]));
        bridge.attestation.script(complete(&[0xab]));
    }

    let mut ids = vec![];
    for i in 0..3u64 {
        let mut request = request();
        request.amount = U256::from(1_000_000u64 + i);
        ids.push(bridge.handle.bridge(request).await?);
    }
    for id in ids {
        wait_for_state(&bridge.handle, id, TransferState::Minted).await;
    }

    assert_eq!(bridge.source.submission_count(), 6);
    assert_eq!(bridge.destination.submission_count(), 3);
    Ok(())
}
