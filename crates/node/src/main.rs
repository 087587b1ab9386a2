//! Binary driving a single cross-chain transfer through the bridge
//! orchestrator.

use bridge_node::args::BridgeNodeArgs;
use bridge_node_orchestrator::BridgeOrchestratorEvent;
use bridge_node_primitives::BridgeRequest;
use clap::Parser;
use futures::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    let args = BridgeNodeArgs::parse();
    args.validate().map_err(|err| eyre::eyre!(err))?;

    let request_args = args.clone();
    let (mut handle, invoker, signer_address) = args.build().await?;
    let recipient = request_args.recipient.unwrap_or(signer_address);

    let source_balance = invoker.source_token_balance(signer_address).await?;
    let destination_balance = invoker.destination_token_balance(recipient).await?;
    tracing::info!(
        target: "bridge::node",
        %source_balance,
        %destination_balance,
        "initial token balances"
    );

    let request = BridgeRequest::new(
        request_args.source.chain_id,
        request_args.destination.chain_id,
        request_args.destination.domain,
        recipient,
        request_args.amount,
    );
    let id = handle.bridge(request).await?;
    tracing::info!(target: "bridge::node", %id, "transfer accepted");

    let mut failure = None;
    while let Some(event) = handle.next().await {
        match event {
            BridgeOrchestratorEvent::StateAdvanced { id: event_id, state } if event_id == id => {
                tracing::info!(target: "bridge::node", %id, %state, "transfer advanced");
            }
            BridgeOrchestratorEvent::TransferMinted { id: event_id, mint_tx_hash }
                if event_id == id =>
            {
                tracing::info!(target: "bridge::node", %id, %mint_tx_hash, "transfer minted");
                break;
            }
            BridgeOrchestratorEvent::TransferFailed { id: event_id, reason } if event_id == id => {
                tracing::error!(target: "bridge::node", %id, code = reason.code(), %reason, "transfer failed");
                failure = Some(reason);
                break;
            }
            BridgeOrchestratorEvent::AttestationTimedOut { id: event_id } if event_id == id => {
                tracing::warn!(
                    target: "bridge::node",
                    %id,
                    "attestation wait suspended, re-run with the same parameters later to resume"
                );
                break;
            }
            event => tracing::debug!(target: "bridge::node", ?event, "event"),
        }
    }

    if let Some(transfer) = handle.status(id).await? {
        tracing::info!(target: "bridge::node", "final transfer record:\n{}", serde_json::to_string_pretty(&transfer)?);
    }

    let source_balance = invoker.source_token_balance(signer_address).await?;
    let destination_balance = invoker.destination_token_balance(recipient).await?;
    tracing::info!(
        target: "bridge::node",
        %source_balance,
        %destination_balance,
        "final token balances"
    );

    if let Some(reason) = failure {
        if reason.funds_burned() {
            tracing::warn!(
                target: "bridge::node",
                "source funds are burned, retry the mint leg with the stored message artifacts"
            );
        }
        eyre::bail!("transfer failed: {reason}");
    }
    Ok(())
}
