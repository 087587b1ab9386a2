//! A library responsible for orchestrating cross-chain transfers through the
//! burn, attest and mint lifecycle.
//!
//! There is no atomic cross-chain transaction: the orchestrator models a
//! transfer as an explicit multi-state [`BridgeTransfer`] record persisted
//! through a [`TransferStore`] after every change, so recovery always has
//! something durable to resume from. Each transfer is driven by a single
//! logical task and transfers proceed independently, the only shared state
//! are the chain and attestation clients.

use bridge_node_attestation::AttestationProvider;
use bridge_node_chain::ChainClient;
use bridge_node_primitives::{BridgeRequest, BridgeTransfer, FailureReason, TransferId,
    TransferState};
use bridge_node_store::TransferStore;
use cctp_contracts::ContractInvoker;
use futures::{future::BoxFuture, stream::FuturesUnordered, FutureExt, StreamExt};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{
    mpsc::{self, UnboundedReceiver, UnboundedSender},
    watch,
};

mod config;
pub use config::BridgeOrchestratorConfig;

mod driver;
use driver::{DriverExit, DriverOutcome, TransferDriver};

mod error;
pub use error::BridgeOrchestratorError;

mod event;
pub use event::BridgeOrchestratorEvent;

mod handle;
pub use handle::{BridgeOrchestratorCommand, BridgeOrchestratorHandle};

mod metrics;
use metrics::MetricsHandler;

mod retry;
pub use retry::Retry;

/// The `BridgeOrchestrator` sequences approve, burn, extract, attest and mint
/// for each accepted [`BridgeRequest`], persists progress and exposes
/// resume-from-failure.
pub struct BridgeOrchestrator<SC, DC, AP, S> {
    /// The contract invoker over the source and destination chains.
    invoker: Arc<ContractInvoker<SC, DC>>,
    /// The attestation provider.
    attestation: Arc<AP>,
    /// The transfer store.
    store: Arc<S>,
    /// The orchestrator configuration.
    config: BridgeOrchestratorConfig,
    /// The receiver for commands sent to the orchestrator.
    handle_rx: UnboundedReceiver<BridgeOrchestratorCommand>,
    /// The sender part of the event channel held by the handle.
    events_tx: UnboundedSender<BridgeOrchestratorEvent>,
    /// In-flight transfer drivers.
    drivers: FuturesUnordered<BoxFuture<'static, DriverOutcome>>,
    /// Cancellation signals of the active drivers.
    active: HashMap<TransferId, watch::Sender<bool>>,
    /// The next transfer id to assign.
    next_id: u64,
    /// The orchestrator metrics.
    metrics: MetricsHandler,
}

impl<SC, DC, AP, S> BridgeOrchestrator<SC, DC, AP, S>
where
    SC: ChainClient + 'static,
    DC: ChainClient + 'static,
    AP: AttestationProvider + 'static,
    S: TransferStore + 'static,
{
    /// Creates a new orchestrator over the provided collaborators. Transfer
    /// ids continue after the highest id already present in the store.
    pub async fn new(
        invoker: ContractInvoker<SC, DC>,
        attestation: AP,
        store: S,
        config: BridgeOrchestratorConfig,
    ) -> Result<(Self, BridgeOrchestratorHandle), BridgeOrchestratorError> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let store = Arc::new(store);
        let next_id =
            store.all().await?.into_iter().map(|transfer| transfer.id.0 + 1).max().unwrap_or(0);
        Ok((
            Self {
                invoker: Arc::new(invoker),
                attestation: Arc::new(attestation),
                store,
                config,
                handle_rx: command_rx,
                events_tx: event_tx,
                drivers: FuturesUnordered::new(),
                active: HashMap::new(),
                next_id,
                metrics: MetricsHandler::default(),
            },
            BridgeOrchestratorHandle::new(command_tx, event_rx.into()),
        ))
    }

    /// Main execution loop for the orchestrator. Runs until the handle is
    /// dropped and all drivers finished.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(command) = self.handle_rx.recv() => {
                    self.handle_command(command).await;
                }
                Some(outcome) = self.drivers.next(), if !self.drivers.is_empty() => {
                    self.handle_driver_outcome(outcome);
                }
                else => {
                    tracing::info!(target: "bridge::orchestrator", "command channel closed and no drivers in flight, shutting down");
                    break;
                }
            }
        }
    }

    /// Handles a command sent to the orchestrator.
    async fn handle_command(&mut self, command: BridgeOrchestratorCommand) {
        match command {
            BridgeOrchestratorCommand::Bridge(request, tx) => {
                let _ = tx.send(self.create_transfer(request).await);
            }
            BridgeOrchestratorCommand::Status(id, tx) => {
                let transfer = self.store.get(id).await.unwrap_or_else(|err| {
                    tracing::error!(target: "bridge::orchestrator", %id, ?err, "status query failed against the store");
                    None
                });
                let _ = tx.send(transfer);
            }
            BridgeOrchestratorCommand::Resume(id, tx) => {
                let _ = tx.send(self.resume_transfer(id).await);
            }
            BridgeOrchestratorCommand::Cancel(id, tx) => {
                let _ = tx.send(self.cancel_transfer(id).await);
            }
        }
    }

    /// Validates and persists a new transfer, then attaches a driver to it.
    async fn create_transfer(
        &mut self,
        request: BridgeRequest,
    ) -> Result<TransferId, BridgeOrchestratorError> {
        request.validate()?;
        let id = TransferId(self.next_id);
        self.next_id += 1;

        let transfer = BridgeTransfer::new(id, request);
        self.store.insert(transfer).await?;
        self.metrics.transfers().transfers_created.increment(1);
        let _ = self.events_tx.send(BridgeOrchestratorEvent::TransferCreated { id });
        tracing::info!(target: "bridge::orchestrator", %id, "transfer created");

        self.spawn_driver(id);
        Ok(id)
    }

    /// Resumes a transfer that has no active driver. A failed transfer is
    /// rewound to the step it failed on when its artifacts allow it,
    /// otherwise the resume is rejected.
    async fn resume_transfer(&mut self, id: TransferId) -> Result<(), BridgeOrchestratorError> {
        if self.active.contains_key(&id) {
            return Err(BridgeOrchestratorError::DriverActive(id));
        }
        let mut transfer =
            self.store.get(id).await?.ok_or(BridgeOrchestratorError::UnknownTransfer(id))?;

        match transfer.state {
            TransferState::Minted => return Err(BridgeOrchestratorError::NotResumable(id)),
            TransferState::Failed => {
                let state =
                    resume_state(&transfer).ok_or(BridgeOrchestratorError::NotResumable(id))?;
                tracing::info!(target: "bridge::orchestrator", %id, %state, "rewinding failed transfer for resume");
                // a reverted mint is final on chain, the retry needs a fresh
                // transaction instead of re-confirming the reverted hash
                if matches!(transfer.last_error, Some(FailureReason::MintReverted { .. })) {
                    transfer.mint_tx_hash = None;
                }
                transfer.last_error = None;
                transfer.state = state;
                self.store.update(transfer).await?;
            }
            _ => {}
        }

        tracing::info!(target: "bridge::orchestrator", %id, "resuming transfer");
        self.spawn_driver(id);
        Ok(())
    }

    /// Requests cancellation of a transfer. Stops the driver from continuing
    /// to drive the transfer forward, it does not undo on-chain effects.
    async fn cancel_transfer(&mut self, id: TransferId) -> Result<(), BridgeOrchestratorError> {
        let transfer =
            self.store.get(id).await?.ok_or(BridgeOrchestratorError::UnknownTransfer(id))?;

        if let Some(cancel) = self.active.get(&id) {
            let _ = cancel.send(true);
            tracing::info!(target: "bridge::orchestrator", %id, "cancellation requested");
        } else {
            tracing::debug!(target: "bridge::orchestrator", %id, "cancel with no active driver is a no-op");
        }
        if transfer.burn_confirmed() {
            tracing::warn!(
                target: "bridge::orchestrator",
                %id,
                "transfer has a confirmed burn, source funds are burned and the record stays resumable"
            );
        }
        Ok(())
    }

    /// Attaches a driver to the transfer and tracks its cancellation signal.
    fn spawn_driver(&mut self, id: TransferId) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.active.insert(id, cancel_tx);
        let driver = TransferDriver::new(
            id,
            self.invoker.clone(),
            self.attestation.clone(),
            self.store.clone(),
            self.config.clone(),
            self.events_tx.clone(),
            cancel_rx,
            self.metrics.clone(),
        );
        self.drivers.push(driver.run().boxed());
    }

    /// Handles the exit of a transfer driver.
    fn handle_driver_outcome(&mut self, outcome: DriverOutcome) {
        self.active.remove(&outcome.id);
        let id = outcome.id;
        match outcome.exit {
            DriverExit::Minted => {
                self.metrics.transfers().transfers_minted.increment(1);
                tracing::info!(target: "bridge::orchestrator", %id, "transfer minted");
            }
            DriverExit::Failed(reason) => {
                self.metrics.transfers().transfers_failed.increment(1);
                tracing::warn!(target: "bridge::orchestrator", %id, code = reason.code(), %reason, "transfer failed");
            }
            DriverExit::Cancelled(state) => {
                tracing::info!(target: "bridge::orchestrator", %id, %state, "transfer driver cancelled");
            }
            DriverExit::AttestationTimedOut => {
                tracing::warn!(target: "bridge::orchestrator", %id, "attestation wait suspended, resume the transfer to continue polling");
            }
            DriverExit::Aborted(err) => {
                tracing::error!(target: "bridge::orchestrator", %id, ?err, "transfer driver aborted");
            }
        }
    }
}

/// Maps a failed transfer back to the state its failed step runs from,
/// provided the artifacts that step needs are still intact. Pre-burn
/// failures are final.
fn resume_state(transfer: &BridgeTransfer) -> Option<TransferState> {
    match transfer.last_error.as_ref()? {
        FailureReason::MintReverted { .. } if transfer.attestation_signature.is_some() => {
            Some(TransferState::Attested)
        }
        FailureReason::MessageNotFound { .. } if transfer.burn_tx_hash.is_some() => {
            Some(TransferState::Burned)
        }
        FailureReason::RetryBudgetExhausted { step, .. } => match step.as_str() {
            "mint" if transfer.attestation_signature.is_some() => Some(TransferState::Attested),
            "attest" if transfer.message_hash.is_some() => Some(TransferState::MessageExtracted),
            "extract" if transfer.burn_tx_hash.is_some() => Some(TransferState::Burned),
            "burn" if transfer.burn_tx_hash.is_some() => Some(TransferState::Approved),
            _ => None,
        },
        _ => None,
    }
}

impl<SC, DC, AP, S> std::fmt::Debug for BridgeOrchestrator<SC, DC, AP, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeOrchestrator")
            .field("config", &self.config)
            .field("active", &self.active.keys())
            .field("next_id", &self.next_id)
            .finish()
    }
}
