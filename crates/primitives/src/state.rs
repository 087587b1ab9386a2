/// The lifecycle state of a [`crate::BridgeTransfer`]. Transitions are
/// strictly forward, a state is only revisited via an explicit resume of the
/// same step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    /// The transfer has been accepted and persisted.
    #[default]
    Created,
    /// The spend approval transaction is confirmed on the source chain.
    Approved,
    /// The burn transaction is confirmed on the source chain.
    Burned,
    /// The cross-chain message has been decoded from the burn receipt.
    MessageExtracted,
    /// The attestation service has returned a signature for the message hash.
    Attested,
    /// The mint transaction is confirmed on the destination chain.
    Minted,
    /// The transfer hit a non-retryable error or exhausted its retry budget.
    Failed,
}

impl TransferState {
    /// Returns `true` for the terminal states [`Self::Minted`] and
    /// [`Self::Failed`].
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Minted | Self::Failed)
    }

    /// Returns the next step to drive for a transfer in this state, or `None`
    /// if the transfer is terminal.
    pub const fn next_step(&self) -> Option<BridgeStep> {
        match self {
            Self::Created => Some(BridgeStep::Approve),
            Self::Approved => Some(BridgeStep::Burn),
            Self::Burned => Some(BridgeStep::Extract),
            Self::MessageExtracted => Some(BridgeStep::Attest),
            Self::Attested => Some(BridgeStep::Mint),
            Self::Minted | Self::Failed => None,
        }
    }
}

impl std::fmt::Display for TransferState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Approved => "approved",
            Self::Burned => "burned",
            Self::MessageExtracted => "message_extracted",
            Self::Attested => "attested",
            Self::Minted => "minted",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A single step of the bridge lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeStep {
    /// Approve the token messenger to spend the transfer amount.
    Approve,
    /// Burn the funds on the source chain.
    Burn,
    /// Decode the cross-chain message from the burn receipt.
    Extract,
    /// Poll the attestation service for the message signature.
    Attest,
    /// Submit the mint on the destination chain.
    Mint,
}

impl BridgeStep {
    /// Returns the step name used in logs and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Burn => "burn",
            Self::Extract => "extract",
            Self::Attest => "attest",
            Self::Mint => "mint",
        }
    }
}

impl std::fmt::Display for BridgeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
