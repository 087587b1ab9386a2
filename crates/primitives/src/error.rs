use crate::BridgeStep;
use alloy_primitives::B256;

/// An error returned when a [`crate::BridgeRequest`] fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequestError {
    /// The transfer amount is zero.
    #[error("transfer amount is zero")]
    ZeroAmount,
    /// The source and destination chain ids are identical.
    #[error("source and destination chain are identical: {0}")]
    SameChain(u64),
}

/// The reason a transfer moved to [`crate::TransferState::Failed`]. Carries a
/// stable machine-readable code plus human-readable detail.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FailureReason {
    /// The spend approval transaction reverted on the source chain. Funds
    /// were not moved.
    ApproveReverted {
        /// The hash of the reverted transaction.
        tx_hash: B256,
        /// Detail reported by the chain.
        detail: String,
    },
    /// The burn transaction reverted on the source chain. Funds were not
    /// moved.
    BurnReverted {
        /// The hash of the reverted transaction.
        tx_hash: B256,
        /// Detail reported by the chain.
        detail: String,
    },
    /// The mint transaction reverted on the destination chain. Source-chain
    /// funds are burned, the mint leg can be retried with the stored message
    /// artifacts.
    MintReverted {
        /// The hash of the reverted transaction.
        tx_hash: B256,
        /// Detail reported by the chain.
        detail: String,
    },
    /// The burn receipt carried no cross-chain message event.
    MessageNotFound {
        /// The hash of the burn transaction whose receipt was scanned.
        tx_hash: B256,
    },
    /// A step exhausted its retry budget on transient errors.
    RetryBudgetExhausted {
        /// The step that exhausted its budget.
        step: String,
        /// The last transient error observed.
        detail: String,
    },
}

impl FailureReason {
    /// Returns the stable machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ApproveReverted { .. } => "approve_reverted",
            Self::BurnReverted { .. } => "burn_reverted",
            Self::MintReverted { .. } => "mint_reverted",
            Self::MessageNotFound { .. } => "message_not_found",
            Self::RetryBudgetExhausted { .. } => "retry_budget_exhausted",
        }
    }

    /// Returns a retry-budget failure for the provided step.
    pub fn retry_exhausted(step: BridgeStep, detail: impl std::fmt::Display) -> Self {
        Self::RetryBudgetExhausted { step: step.as_str().to_string(), detail: detail.to_string() }
    }

    /// Whether source-chain funds are burned for a transfer that failed with
    /// this reason. Operators use this to decide whether the mint leg should
    /// be retried manually.
    pub fn funds_burned(&self) -> bool {
        match self {
            Self::MintReverted { .. } | Self::MessageNotFound { .. } => true,
            Self::ApproveReverted { .. } | Self::BurnReverted { .. } => false,
            Self::RetryBudgetExhausted { step, .. } => {
                matches!(step.as_str(), "extract" | "attest" | "mint")
            }
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApproveReverted { tx_hash, detail } => {
                write!(f, "approve transaction {tx_hash} reverted: {detail}")
            }
            Self::BurnReverted { tx_hash, detail } => {
                write!(f, "burn transaction {tx_hash} reverted: {detail}")
            }
            Self::MintReverted { tx_hash, detail } => {
                write!(
                    f,
                    "mint transaction {tx_hash} reverted: {detail} (source funds are burned, retry the mint leg)"
                )
            }
            Self::MessageNotFound { tx_hash } => {
                write!(f, "no cross-chain message event in receipt for {tx_hash}")
            }
            Self::RetryBudgetExhausted { step, detail } => {
                write!(f, "retry budget exhausted at step {step}: {detail}")
            }
        }
    }
}
