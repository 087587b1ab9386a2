use crate::{
    metrics::MetricsHandler, BridgeOrchestratorConfig, BridgeOrchestratorError,
    BridgeOrchestratorEvent, Retry,
};
use alloy_primitives::B256;
use alloy_rpc_types_eth::TransactionReceipt;
use bridge_node_attestation::{poll_attestation, AttestationError, AttestationProvider};
use bridge_node_chain::{ChainClient, ChainClientError};
use bridge_node_primitives::{BridgeStep, BridgeTransfer, FailureReason, TransferId, TransferState};
use bridge_node_store::{StoreError, TransferStore};
use cctp_contracts::{message_hash, ContractInvoker, ContractInvokerError};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc::UnboundedSender, watch},
    time::Instant,
};

/// The outcome of a finished transfer driver.
#[derive(Debug)]
pub(crate) struct DriverOutcome {
    /// The transfer the driver was attached to.
    pub(crate) id: TransferId,
    /// How the driver exited.
    pub(crate) exit: DriverExit,
}

/// How a transfer driver exited.
#[derive(Debug)]
pub(crate) enum DriverExit {
    /// The transfer reached [`TransferState::Minted`].
    Minted,
    /// The transfer moved to [`TransferState::Failed`].
    Failed(FailureReason),
    /// The driver stopped on cancellation, the record keeps the provided
    /// state.
    Cancelled(TransferState),
    /// The attestation ceiling was reached, the transfer is resumable.
    AttestationTimedOut,
    /// The driver aborted on an infrastructure error, the record keeps its
    /// last persisted state.
    Aborted(BridgeOrchestratorError),
}

/// What a completed step asks of the driver loop.
enum StepAdvance {
    /// Persist and advance to the provided state.
    To(TransferState),
    /// Persist and stop driving, the transfer is resumable.
    Suspend,
}

/// A step-local error.
enum StepError {
    /// Non-retryable, the transfer moves to [`TransferState::Failed`].
    Fatal(FailureReason),
    /// The driver was asked to stop.
    Cancelled,
    /// The store rejected a write.
    Store(StoreError),
}

impl From<StoreError> for StepError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Drives a single transfer through the lifecycle steps in state-machine
/// order. Exactly one driver is attached to a transfer at any time, which
/// serializes submissions per (transfer, step) and keeps at most one burn and
/// one mint in flight.
pub(crate) struct TransferDriver<SC, DC, AP, S> {
    id: TransferId,
    invoker: Arc<ContractInvoker<SC, DC>>,
    attestation: Arc<AP>,
    store: Arc<S>,
    config: BridgeOrchestratorConfig,
    retry: Retry,
    events: UnboundedSender<BridgeOrchestratorEvent>,
    cancel: watch::Receiver<bool>,
    metrics: MetricsHandler,
}

impl<SC, DC, AP, S> TransferDriver<SC, DC, AP, S>
where
    SC: ChainClient + 'static,
    DC: ChainClient + 'static,
    AP: AttestationProvider + 'static,
    S: TransferStore + 'static,
{
    /// Returns a new driver for the provided transfer.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: TransferId,
        invoker: Arc<ContractInvoker<SC, DC>>,
        attestation: Arc<AP>,
        store: Arc<S>,
        config: BridgeOrchestratorConfig,
        events: UnboundedSender<BridgeOrchestratorEvent>,
        cancel: watch::Receiver<bool>,
        metrics: MetricsHandler,
    ) -> Self {
        let retry =
            Retry::new(Some(config.max_step_retries()), config.backoff_base_ms(), true);
        Self { id, invoker, attestation, store, config, retry, events, cancel, metrics }
    }

    /// Drives the transfer until a terminal state, a suspension or a
    /// cancellation.
    pub(crate) async fn run(self) -> DriverOutcome {
        let id = self.id;
        let exit = self.drive().await;
        DriverOutcome { id, exit }
    }

    async fn drive(&self) -> DriverExit {
        let mut transfer = match self.store.get(self.id).await {
            Ok(Some(transfer)) => transfer,
            Ok(None) => {
                return DriverExit::Aborted(BridgeOrchestratorError::UnknownTransfer(self.id))
            }
            Err(err) => return DriverExit::Aborted(err.into()),
        };

        loop {
            if *self.cancel.borrow() {
                return self.cancelled(&transfer);
            }
            let Some(step) = transfer.state.next_step() else {
                return match transfer.state {
                    TransferState::Minted => DriverExit::Minted,
                    _ => DriverExit::Failed(
                        transfer.last_error.clone().expect("failed transfer holds an error"),
                    ),
                };
            };

            tracing::debug!(target: "bridge::orchestrator", id = %self.id, %step, state = %transfer.state, "driving step");
            transfer.attempts.record(step);

            let started = Instant::now();
            let res = match step {
                BridgeStep::Approve => self.step_approve(&mut transfer).await,
                BridgeStep::Burn => self.step_burn(&mut transfer).await,
                BridgeStep::Extract => self.step_extract(&mut transfer).await,
                BridgeStep::Attest => self.step_attest(&mut transfer).await,
                BridgeStep::Mint => self.step_mint(&mut transfer).await,
            };
            self.metrics.record_step(step, started.elapsed());

            match res {
                Ok(StepAdvance::To(state)) => {
                    transfer.advance(state);
                    if let Err(err) = self.persist(&transfer).await {
                        return DriverExit::Aborted(err.into());
                    }
                    self.notify(BridgeOrchestratorEvent::StateAdvanced { id: self.id, state });
                    if state == TransferState::Minted {
                        let mint_tx_hash =
                            transfer.mint_tx_hash.expect("minted transfer holds a mint hash");
                        self.notify(BridgeOrchestratorEvent::TransferMinted {
                            id: self.id,
                            mint_tx_hash,
                        });
                    }
                }
                Ok(StepAdvance::Suspend) => {
                    if let Err(err) = self.persist(&transfer).await {
                        return DriverExit::Aborted(err.into());
                    }
                    self.notify(BridgeOrchestratorEvent::AttestationTimedOut { id: self.id });
                    return DriverExit::AttestationTimedOut;
                }
                Err(StepError::Cancelled) => {
                    if let Err(err) = self.persist(&transfer).await {
                        return DriverExit::Aborted(err.into());
                    }
                    return self.cancelled(&transfer);
                }
                Err(StepError::Fatal(reason)) => {
                    transfer.fail(reason.clone());
                    if let Err(err) = self.persist(&transfer).await {
                        return DriverExit::Aborted(err.into());
                    }
                    self.notify(BridgeOrchestratorEvent::TransferFailed {
                        id: self.id,
                        reason: reason.clone(),
                    });
                    return DriverExit::Failed(reason);
                }
                Err(StepError::Store(err)) => return DriverExit::Aborted(err.into()),
            }
        }
    }

    async fn step_approve(&self, transfer: &mut BridgeTransfer) -> Result<StepAdvance, StepError> {
        let receipt = match transfer.approve_tx_hash {
            Some(tx_hash) => match self.confirm_prior_source(tx_hash, BridgeStep::Approve).await? {
                Some(receipt) => receipt,
                None => {
                    let tx_hash = self.submit_approve(transfer).await?;
                    self.wait_source(tx_hash, BridgeStep::Approve).await?
                }
            },
            None => {
                let tx_hash = self.submit_approve(transfer).await?;
                self.wait_source(tx_hash, BridgeStep::Approve).await?
            }
        };
        if !receipt.status() {
            return Err(StepError::Fatal(FailureReason::ApproveReverted {
                tx_hash: receipt.transaction_hash,
                detail: "transaction reverted on chain".to_string(),
            }));
        }
        Ok(StepAdvance::To(TransferState::Approved))
    }

    async fn step_burn(&self, transfer: &mut BridgeTransfer) -> Result<StepAdvance, StepError> {
        let receipt = match transfer.burn_tx_hash {
            Some(tx_hash) => match self.confirm_prior_source(tx_hash, BridgeStep::Burn).await? {
                Some(receipt) => receipt,
                None => {
                    let tx_hash = self.submit_burn(transfer).await?;
                    self.wait_source(tx_hash, BridgeStep::Burn).await?
                }
            },
            None => {
                let tx_hash = self.submit_burn(transfer).await?;
                self.wait_source(tx_hash, BridgeStep::Burn).await?
            }
        };
        if !receipt.status() {
            return Err(StepError::Fatal(FailureReason::BurnReverted {
                tx_hash: receipt.transaction_hash,
                detail: "transaction reverted on chain".to_string(),
            }));
        }
        Ok(StepAdvance::To(TransferState::Burned))
    }

    async fn step_extract(&self, transfer: &mut BridgeTransfer) -> Result<StepAdvance, StepError> {
        let tx_hash = transfer.burn_tx_hash.expect("burned transfer holds a burn hash");
        let receipt = self
            .retry
            .retry_if(
                "extract.get_receipt",
                || self.invoker.source().get_receipt(tx_hash),
                |err: &ChainClientError| err.is_retryable(),
            )
            .await
            .map_err(|err| {
                StepError::Fatal(FailureReason::retry_exhausted(BridgeStep::Extract, err))
            })?
            .ok_or_else(|| {
                StepError::Fatal(FailureReason::retry_exhausted(
                    BridgeStep::Extract,
                    format!("no receipt on chain for confirmed burn transaction {tx_hash}"),
                ))
            })?;

        match self.invoker.extract_message(&receipt) {
            Ok(message) => {
                transfer.message_hash = Some(message_hash(&message));
                transfer.message_bytes = Some(message);
                Ok(StepAdvance::To(TransferState::MessageExtracted))
            }
            Err(ContractInvokerError::MessageNotFound(tx_hash)) => {
                Err(StepError::Fatal(FailureReason::MessageNotFound { tx_hash }))
            }
            Err(err) => {
                Err(StepError::Fatal(FailureReason::retry_exhausted(BridgeStep::Extract, err)))
            }
        }
    }

    async fn step_attest(&self, transfer: &mut BridgeTransfer) -> Result<StepAdvance, StepError> {
        let message_hash =
            transfer.message_hash.expect("extracted transfer holds a message hash");
        let mut cancel = self.cancel.clone();
        let poll = poll_attestation(
            self.attestation.as_ref(),
            message_hash,
            self.config.attestation_poll_interval(),
            self.config.attestation_timeout(),
        );
        tokio::select! {
            _ = cancel.changed() => Err(StepError::Cancelled),
            res = poll => match res {
                Ok(signature) => {
                    transfer.attestation_signature = Some(signature);
                    Ok(StepAdvance::To(TransferState::Attested))
                }
                Err(AttestationError::Timeout(_)) => {
                    tracing::warn!(target: "bridge::orchestrator", id = %self.id, %message_hash, "attestation ceiling reached, transfer remains resumable");
                    self.metrics.transfers().attestation_timeouts.increment(1);
                    Ok(StepAdvance::Suspend)
                }
                Err(err) => {
                    tracing::warn!(target: "bridge::orchestrator", id = %self.id, ?err, "attestation wait ended on an error, transfer remains resumable");
                    Ok(StepAdvance::Suspend)
                }
            }
        }
    }

    async fn step_mint(&self, transfer: &mut BridgeTransfer) -> Result<StepAdvance, StepError> {
        let receipt = match transfer.mint_tx_hash {
            Some(tx_hash) => {
                match self.confirm_prior_destination(tx_hash, BridgeStep::Mint).await? {
                    Some(receipt) => receipt,
                    None => {
                        let tx_hash = self.submit_mint(transfer).await?;
                        self.wait_destination(tx_hash, BridgeStep::Mint).await?
                    }
                }
            }
            None => {
                let tx_hash = self.submit_mint(transfer).await?;
                self.wait_destination(tx_hash, BridgeStep::Mint).await?
            }
        };
        if !receipt.status() {
            return Err(StepError::Fatal(FailureReason::MintReverted {
                tx_hash: receipt.transaction_hash,
                detail: "transaction reverted on chain".to_string(),
            }));
        }
        Ok(StepAdvance::To(TransferState::Minted))
    }

    /// Submits the spend approval and persists its hash before waiting for
    /// confirmation, so a crash between submit and confirmation is recovered
    /// by the check-before-submit discipline.
    async fn submit_approve(&self, transfer: &mut BridgeTransfer) -> Result<B256, StepError> {
        let amount = transfer.request.amount;
        let tx_hash = self
            .retry
            .retry_if(
                "approve.submit",
                || self.invoker.approve_spend(amount),
                |err: &ContractInvokerError| err.is_retryable(),
            )
            .await
            .map_err(|err| {
                StepError::Fatal(FailureReason::retry_exhausted(BridgeStep::Approve, err))
            })?;
        transfer.approve_tx_hash = Some(tx_hash);
        self.persist(transfer).await?;
        Ok(tx_hash)
    }

    /// Submits the burn and persists its hash before waiting for
    /// confirmation.
    async fn submit_burn(&self, transfer: &mut BridgeTransfer) -> Result<B256, StepError> {
        let amount = transfer.request.amount;
        let destination_domain = transfer.request.destination_domain;
        let recipient = transfer.request.recipient;
        let tx_hash = self
            .retry
            .retry_if(
                "burn.submit",
                || self.invoker.burn_for_transfer(amount, destination_domain, recipient),
                |err: &ContractInvokerError| err.is_retryable(),
            )
            .await
            .map_err(|err| {
                StepError::Fatal(FailureReason::retry_exhausted(BridgeStep::Burn, err))
            })?;
        transfer.burn_tx_hash = Some(tx_hash);
        self.persist(transfer).await?;
        Ok(tx_hash)
    }

    /// Submits the mint and persists its hash before waiting for
    /// confirmation. Requires the attested message artifacts.
    async fn submit_mint(&self, transfer: &mut BridgeTransfer) -> Result<B256, StepError> {
        let message = transfer.message_bytes.clone().expect("attested transfer holds the message");
        let signature = transfer
            .attestation_signature
            .clone()
            .filter(|signature| !signature.is_empty())
            .expect("attested transfer holds a non-empty signature");
        let tx_hash = self
            .retry
            .retry_if(
                "mint.submit",
                || self.invoker.submit_mint(message.clone(), signature.clone()),
                |err: &ContractInvokerError| err.is_retryable(),
            )
            .await
            .map_err(|err| {
                StepError::Fatal(FailureReason::retry_exhausted(BridgeStep::Mint, err))
            })?;
        transfer.mint_tx_hash = Some(tx_hash);
        self.persist(transfer).await?;
        Ok(tx_hash)
    }

    async fn confirm_prior_source(
        &self,
        tx_hash: B256,
        step: BridgeStep,
    ) -> Result<Option<TransactionReceipt>, StepError> {
        confirm_prior(
            self.invoker.source(),
            self.cancel.clone(),
            &self.retry,
            self.config.receipt_timeout(),
            tx_hash,
            step,
        )
        .await
    }

    async fn confirm_prior_destination(
        &self,
        tx_hash: B256,
        step: BridgeStep,
    ) -> Result<Option<TransactionReceipt>, StepError> {
        confirm_prior(
            self.invoker.destination(),
            self.cancel.clone(),
            &self.retry,
            self.config.receipt_timeout(),
            tx_hash,
            step,
        )
        .await
    }

    async fn wait_source(
        &self,
        tx_hash: B256,
        step: BridgeStep,
    ) -> Result<TransactionReceipt, StepError> {
        wait_for_confirmation(
            self.invoker.source(),
            self.cancel.clone(),
            &self.retry,
            self.config.receipt_timeout(),
            tx_hash,
            step,
        )
        .await
    }

    async fn wait_destination(
        &self,
        tx_hash: B256,
        step: BridgeStep,
    ) -> Result<TransactionReceipt, StepError> {
        wait_for_confirmation(
            self.invoker.destination(),
            self.cancel.clone(),
            &self.retry,
            self.config.receipt_timeout(),
            tx_hash,
            step,
        )
        .await
    }

    async fn persist(&self, transfer: &BridgeTransfer) -> Result<(), StoreError> {
        self.store.update(transfer.clone()).await
    }

    fn notify(&self, event: BridgeOrchestratorEvent) {
        // the handle may have been dropped, the orchestrator keeps driving
        let _ = self.events.send(event);
    }

    fn cancelled(&self, transfer: &BridgeTransfer) -> DriverExit {
        if transfer.burn_confirmed() {
            tracing::warn!(
                target: "bridge::orchestrator",
                id = %self.id,
                state = %transfer.state,
                "cancelled after burn confirmation, source funds are burned and the transfer must be resumed later"
            );
        }
        self.notify(BridgeOrchestratorEvent::TransferCancelled {
            id: self.id,
            state: transfer.state,
        });
        DriverExit::Cancelled(transfer.state)
    }
}

/// Checks whether a previously submitted transaction already confirmed. A
/// prior submission is only treated as dropped, allowing a resubmission,
/// after a full confirmation window passes with no receipt on chain.
async fn confirm_prior<C: ChainClient>(
    client: &C,
    mut cancel: watch::Receiver<bool>,
    retry: &Retry,
    timeout: Duration,
    tx_hash: B256,
    step: BridgeStep,
) -> Result<Option<TransactionReceipt>, StepError> {
    let existing = retry
        .retry_if(
            "confirm_prior.get_receipt",
            || client.get_receipt(tx_hash),
            |err: &ChainClientError| err.is_retryable(),
        )
        .await
        .map_err(|err| StepError::Fatal(FailureReason::retry_exhausted(step, err)))?;
    if let Some(receipt) = existing {
        tracing::info!(target: "bridge::orchestrator", %tx_hash, %step, "found receipt for prior submission, skipping resubmission");
        return Ok(Some(receipt));
    }

    let wait = retry.retry_if(
        "confirm_prior.wait_for_receipt",
        || client.wait_for_receipt(tx_hash, timeout),
        |err: &ChainClientError| matches!(err, ChainClientError::Transport(_)),
    );
    tokio::select! {
        _ = cancel.changed() => Err(StepError::Cancelled),
        res = wait => match res {
            Ok(receipt) => Ok(Some(receipt)),
            Err(ChainClientError::ReceiptTimeout(_)) => {
                tracing::warn!(target: "bridge::orchestrator", %tx_hash, %step, "prior submission has no receipt after a full confirmation window, resubmitting");
                Ok(None)
            }
            Err(err) => Err(StepError::Fatal(FailureReason::retry_exhausted(step, err))),
        },
    }
}

/// Waits for the confirmation of a freshly submitted transaction, retrying
/// transient failures within the step budget.
async fn wait_for_confirmation<C: ChainClient>(
    client: &C,
    mut cancel: watch::Receiver<bool>,
    retry: &Retry,
    timeout: Duration,
    tx_hash: B256,
    step: BridgeStep,
) -> Result<TransactionReceipt, StepError> {
    let wait = retry.retry_if(
        "wait_for_receipt",
        || client.wait_for_receipt(tx_hash, timeout),
        |err: &ChainClientError| err.is_retryable(),
    );
    tokio::select! {
        _ = cancel.changed() => Err(StepError::Cancelled),
        res = wait => {
            res.map_err(|err| StepError::Fatal(FailureReason::retry_exhausted(step, err)))
        }
    }
}
