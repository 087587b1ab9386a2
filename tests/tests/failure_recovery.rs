//! Failure and recovery behavior of the bridge orchestrator: non-retryable
//! failures, resumable attestation timeouts and cancellation semantics.

use alloy_primitives::B256;
use bridge_node_chain::test_utils::receipt;
use bridge_node_orchestrator::{BridgeOrchestratorError, BridgeOrchestratorEvent};
use bridge_node_primitives::{FailureReason, TransferId, TransferState};
use bridge_node_store::InMemoryTransferStore;
use tests::{
    burn_receipt, complete, request, short_attestation_config, spawn_bridge, test_config,
    wait_for_event, wait_for_state,
};

const APPROVE_HASH: B256 = B256::repeat_byte(0xa1);
const BURN_HASH: B256 = B256::repeat_byte(0xb2);
const MINT_HASH: B256 = B256::repeat_byte(0xc3);
const MINT_RETRY_HASH: B256 = B256::repeat_byte(0xc4);

#[tokio::test]
async fn test_missing_message_event_fails_without_polling() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge.source.queue_submission(APPROVE_HASH, receipt(APPROVE_HASH, true, vec![]));
    // the burn confirms but its receipt carries no message event
    bridge.source.queue_submission(BURN_HASH, receipt(BURN_HASH, true, vec![]));

    let id = bridge.handle.bridge(request()).await?;
    let transfer = wait_for_state(&bridge.handle, id, TransferState::Failed).await;

    assert!(matches!(
        transfer.last_error,
        Some(FailureReason::MessageNotFound { tx_hash }) if tx_hash == BURN_HASH
    ));
    // no attestation polling and no mint happened
    assert_eq!(bridge.attestation.fetch_count(), 0);
    assert_eq!(bridge.destination.submission_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_mint_revert_fails_with_burn_artifacts_intact() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge.source.queue_submission(APPROVE_HASH, receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge.destination.queue_submission(MINT_HASH, receipt(MINT_HASH, false, vec![]));
    bridge.attestation.script(complete(&[0xab]));

    let id = bridge.handle.bridge(request()).await?;
    let transfer = wait_for_state(&bridge.handle, id, TransferState::Failed).await;

    let reason = transfer.last_error.clone().expect("failed transfer holds an error");
    assert_eq!(reason.code(), "mint_reverted");
    assert!(reason.to_string().contains("reverted"));
    assert!(reason.funds_burned());

    // the burn leg artifacts survive for a manual mint retry
    assert_eq!(transfer.burn_tx_hash, Some(BURN_HASH));
    assert!(transfer.message_bytes.is_some());
    assert!(transfer.message_hash.is_some());
    assert!(transfer.attestation_signature.is_some());

    // resuming rewinds to the mint leg and submits a fresh transaction
    bridge.destination.queue_submission(MINT_RETRY_HASH, receipt(MINT_RETRY_HASH, true, vec![]));
    bridge.handle.resume(id).await?;
    let transfer = wait_for_state(&bridge.handle, id, TransferState::Minted).await;
    assert_eq!(transfer.mint_tx_hash, Some(MINT_RETRY_HASH));
    assert_eq!(bridge.destination.submission_count(), 2);
    // attestation was not re-polled, the stored signature was reused
    assert_eq!(bridge.attestation.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_attestation_timeout_suspends_then_resumes() -> eyre::Result<()> {
    let store = InMemoryTransferStore::new();
    let mut bridge = spawn_bridge(store, short_attestation_config()).await?;

    bridge.source.queue_submission(APPROVE_HASH, receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    // the attestation service never reports complete within the ceiling

    let id = bridge.handle.bridge(request()).await?;
    wait_for_event(
        &mut bridge.handle,
        |event| matches!(event, BridgeOrchestratorEvent::AttestationTimedOut { id: event_id } if *event_id == id),
    )
    .await;

    // not failed, not minted, resumable with the same message hash
    let transfer = bridge.handle.status(id).await?.expect("transfer exists");
    assert_eq!(transfer.state, TransferState::MessageExtracted);
    assert!(transfer.last_error.is_none());
    assert!(bridge.attestation.fetch_count() > 1);
    assert_eq!(bridge.destination.submission_count(), 0);

    // the service recovers, resuming picks the polling back up
    bridge.attestation.script(complete(&[0xab]));
    bridge.destination.queue_submission(MINT_HASH, receipt(MINT_HASH, true, vec![]));
    bridge.handle.resume(id).await?;
    wait_for_state(&bridge.handle, id, TransferState::Minted).await;
    // still exactly one burn
    assert_eq!(bridge.source.submission_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_burn_leaves_abandonable_record() -> eyre::Result<()> {
    let mut bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    // the approval sits in the mempool with no receipt
    bridge.source.queue_submission_pending(APPROVE_HASH);

    let id = bridge.handle.bridge(request()).await?;
    bridge.handle.cancel(id).await?;
    wait_for_event(
        &mut bridge.handle,
        |event| matches!(event, BridgeOrchestratorEvent::TransferCancelled { id: event_id, .. } if *event_id == id),
    )
    .await;

    let transfer = bridge.handle.status(id).await?.expect("transfer exists");
    assert_eq!(transfer.state, TransferState::Created);
    assert_eq!(transfer.approve_tx_hash, Some(APPROVE_HASH));
    // nothing burned, nothing minted
    assert_eq!(bridge.destination.submission_count(), 0);

    // resuming replaces the dropped approval after a full confirmation
    // window and completes the transfer
    bridge.source.queue_submission(B256::repeat_byte(0xa2), receipt(B256::repeat_byte(0xa2), true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    bridge.destination.queue_submission(MINT_HASH, receipt(MINT_HASH, true, vec![]));
    bridge.attestation.script(complete(&[0xab]));

    bridge.handle.resume(id).await?;
    wait_for_state(&bridge.handle, id, TransferState::Minted).await;
    assert_eq!(bridge.source.submission_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_resume_rejected_while_driver_active() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge.source.queue_submission(APPROVE_HASH, receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, burn_receipt(BURN_HASH, b"cctp message v1"));
    // the driver hangs in the attestation wait (nothing scripted, 5s ceiling)

    let id = bridge.handle.bridge(request()).await?;
    wait_for_state(&bridge.handle, id, TransferState::MessageExtracted).await;

    let res = bridge.handle.resume(id).await;
    assert!(matches!(res, Err(BridgeOrchestratorError::DriverActive(_))));

    bridge.handle.cancel(id).await?;
    Ok(())
}

#[tokio::test]
async fn test_cancel_unknown_transfer_errors() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;
    let res = bridge.handle.cancel(TransferId(42)).await;
    assert!(matches!(res, Err(BridgeOrchestratorError::UnknownTransfer(TransferId(42)))));
    Ok(())
}

#[tokio::test]
async fn test_burn_revert_is_final() -> eyre::Result<()> {
    let bridge = spawn_bridge(InMemoryTransferStore::new(), test_config()).await?;

    bridge.source.queue_submission(APPROVE_HASH, receipt(APPROVE_HASH, true, vec![]));
    bridge.source.queue_submission(BURN_HASH, receipt(BURN_HASH, false, vec![]));

    let id = bridge.handle.bridge(request()).await?;
    let transfer = wait_for_state(&bridge.handle, id, TransferState::Failed).await;

    let reason = transfer.last_error.expect("failed transfer holds an error");
    assert_eq!(reason.code(), "burn_reverted");
    // no funds moved, the failure is not resumable
    assert!(!reason.funds_burned());
    let res = bridge.handle.resume(id).await;
    assert!(matches!(res, Err(BridgeOrchestratorError::NotResumable(_))));
    Ok(())
}
