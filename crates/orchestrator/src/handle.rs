use super::{BridgeOrchestratorError, BridgeOrchestratorEvent};
use bridge_node_primitives::{BridgeRequest, BridgeTransfer, TransferId};
use futures::{Stream, StreamExt};
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

/// A handle to interact with the `BridgeOrchestrator`.
#[derive(Debug)]
pub struct BridgeOrchestratorHandle {
    /// The command sender to send commands to the `BridgeOrchestrator`.
    command_sender: UnboundedSender<BridgeOrchestratorCommand>,
    /// The event receiver to receive events from the `BridgeOrchestrator`.
    event_receiver: UnboundedReceiverStream<BridgeOrchestratorEvent>,
}

impl BridgeOrchestratorHandle {
    /// Creates a new [`BridgeOrchestratorHandle`].
    pub const fn new(
        command_sender: UnboundedSender<BridgeOrchestratorCommand>,
        event_receiver: UnboundedReceiverStream<BridgeOrchestratorEvent>,
    ) -> Self {
        Self { command_sender, event_receiver }
    }

    /// Submits a bridge request. The transfer id is returned as soon as the
    /// request is validated and persisted, the terminal state is reported
    /// asynchronously via the event stream or [`Self::status`].
    pub async fn bridge(
        &self,
        request: BridgeRequest,
    ) -> Result<TransferId, BridgeOrchestratorError> {
        let (tx, rx) = oneshot::channel();
        self.command_sender
            .send(BridgeOrchestratorCommand::Bridge(request, tx))
            .map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?;
        rx.await.map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?
    }

    /// Returns the current record of the provided transfer, if any.
    pub async fn status(
        &self,
        id: TransferId,
    ) -> Result<Option<BridgeTransfer>, BridgeOrchestratorError> {
        let (tx, rx) = oneshot::channel();
        self.command_sender
            .send(BridgeOrchestratorCommand::Status(id, tx))
            .map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?;
        rx.await.map_err(|_| BridgeOrchestratorError::CommandChannelClosed)
    }

    /// Resumes driving a transfer that has no active driver.
    pub async fn resume(&self, id: TransferId) -> Result<(), BridgeOrchestratorError> {
        let (tx, rx) = oneshot::channel();
        self.command_sender
            .send(BridgeOrchestratorCommand::Resume(id, tx))
            .map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?;
        rx.await.map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?
    }

    /// Requests cancellation of the provided transfer. Stops the driver at
    /// its next suspension point, a transfer with a confirmed burn remains
    /// resumable.
    pub async fn cancel(&self, id: TransferId) -> Result<(), BridgeOrchestratorError> {
        let (tx, rx) = oneshot::channel();
        self.command_sender
            .send(BridgeOrchestratorCommand::Cancel(id, tx))
            .map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?;
        rx.await.map_err(|_| BridgeOrchestratorError::CommandChannelClosed)?
    }
}

/// A command to be sent to the `BridgeOrchestrator`.
#[derive(Debug)]
pub enum BridgeOrchestratorCommand {
    /// Accept a bridge request and start driving it.
    Bridge(BridgeRequest, oneshot::Sender<Result<TransferId, BridgeOrchestratorError>>),
    /// Query the record of a transfer.
    Status(TransferId, oneshot::Sender<Option<BridgeTransfer>>),
    /// Resume driving a transfer with no active driver.
    Resume(TransferId, oneshot::Sender<Result<(), BridgeOrchestratorError>>),
    /// Stop driving a transfer.
    Cancel(TransferId, oneshot::Sender<Result<(), BridgeOrchestratorError>>),
}

impl Stream for BridgeOrchestratorHandle {
    type Item = BridgeOrchestratorEvent;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.event_receiver.poll_next_unpin(cx)
    }
}
