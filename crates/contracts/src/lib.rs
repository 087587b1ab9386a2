//! A library containing the logic required to interact with the CCTP
//! contracts on the source and destination chains.

pub mod abi;

mod constants;
pub use constants::*;

mod error;
pub use error::{ContractInvokerError, ContractInvokerResult};

mod invoker;
pub use invoker::{ContractAddresses, ContractInvoker};

mod message;
pub use message::{extract_message, message_hash, pad_recipient};
