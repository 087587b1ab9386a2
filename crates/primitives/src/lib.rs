//! Primitive types for the bridge node.

pub use error::{FailureReason, InvalidRequestError};
mod error;

pub use request::BridgeRequest;
mod request;

pub use state::{BridgeStep, TransferState};
mod state;

pub use transfer::{BridgeTransfer, StepAttempts, TransferId};
mod transfer;
