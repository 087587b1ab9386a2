use crate::constants;
use alloy_network::EthereumWallet;
use alloy_primitives::{Address, U256};
use alloy_provider::ProviderBuilder;
use alloy_rpc_client::RpcClient;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport::layers::RetryBackoffLayer;
use bridge_node_attestation::OnlineAttestationClient;
use bridge_node_chain::{ChainClient, OnlineChainClient};
use bridge_node_orchestrator::{
    BridgeOrchestrator, BridgeOrchestratorConfig, BridgeOrchestratorHandle,
};
use bridge_node_store::InMemoryTransferStore;
use cctp_contracts::{ContractAddresses, ContractInvoker};
use std::{fs, path::PathBuf, time::Duration};

/// A struct that represents the arguments for the bridge node.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "bridge-node", about = "Drives a burn/attest/mint transfer between two chains")]
pub struct BridgeNodeArgs {
    /// Source chain args
    #[command(flatten)]
    pub source: SourceChainArgs,
    /// Destination chain args
    #[command(flatten)]
    pub destination: DestinationChainArgs,
    /// Attestation service args
    #[command(flatten)]
    pub attestation: AttestationArgs,
    /// Orchestrator args
    #[command(flatten)]
    pub orchestrator: OrchestratorArgs,
    /// Signer args
    #[command(flatten)]
    pub signer: SignerArgs,
    /// The transfer amount in the token's smallest unit.
    #[arg(long, value_name = "AMOUNT")]
    pub amount: U256,
    /// The recipient on the destination chain. Defaults to the signer
    /// address.
    #[arg(long, value_name = "ADDRESS")]
    pub recipient: Option<Address>,
}

impl BridgeNodeArgs {
    /// Validate the argument combination before building the node.
    pub fn validate(&self) -> Result<(), String> {
        if self.signer.key_file.is_none() && self.signer.private_key.is_none() {
            return Err("Either a signer key file or a private key is required".to_string());
        }
        if self.signer.key_file.is_some() && self.signer.private_key.is_some() {
            return Err("Cannot specify more than one signer key source".to_string());
        }
        if self.source.chain_id == self.destination.chain_id {
            return Err(format!(
                "Source and destination chain must differ, both are {}",
                self.source.chain_id
            ));
        }
        Ok(())
    }

    /// Builds the orchestrator and its collaborators, spawns the orchestrator
    /// onto the runtime and returns the handle, a contract invoker for
    /// balance reads and the signer address.
    ///
    /// Chain id verification happens here: an unreachable endpoint or a
    /// mismatching chain id aborts startup.
    pub async fn build(
        self,
    ) -> eyre::Result<(
        BridgeOrchestratorHandle,
        ContractInvoker<impl ChainClient + Clone, impl ChainClient + Clone>,
        Address,
    )> {
        let signer = self.signer.signer()?;
        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let source_client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(
                self.source.max_retries,
                self.source.initial_backoff,
                self.source.compute_units_per_second,
            ))
            .http(self.source.url.clone());
        let source_provider =
            ProviderBuilder::new().wallet(wallet.clone()).connect_client(source_client);
        let source = OnlineChainClient::new(source_provider, self.source.chain_id).await?;

        let destination_client = RpcClient::builder()
            .layer(RetryBackoffLayer::new(
                self.destination.max_retries,
                self.destination.initial_backoff,
                self.destination.compute_units_per_second,
            ))
            .http(self.destination.url.clone());
        let destination_provider =
            ProviderBuilder::new().wallet(wallet).connect_client(destination_client);
        let destination =
            OnlineChainClient::new(destination_provider, self.destination.chain_id).await?;

        let addresses = ContractAddresses {
            source_token: self.source.token,
            source_token_messenger: self.source.token_messenger,
            destination_message_transmitter: self.destination.message_transmitter,
            destination_token: self.destination.token,
        };
        let invoker = ContractInvoker::new(source, destination, addresses);

        let attestation = OnlineAttestationClient::new_http(self.attestation.url.clone());
        let store = InMemoryTransferStore::new();
        let config = BridgeOrchestratorConfig::new(
            Duration::from_secs(self.orchestrator.receipt_timeout),
            Duration::from_secs(self.attestation.poll_interval),
            Duration::from_secs(self.attestation.timeout),
            self.orchestrator.max_step_retries,
            self.orchestrator.backoff_base_ms,
        );

        let (orchestrator, handle) =
            BridgeOrchestrator::new(invoker.clone(), attestation, store, config).await?;
        tokio::spawn(orchestrator.run());

        Ok((handle, invoker, signer_address))
    }
}

/// The arguments for the source chain.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceChainArgs {
    /// The URL of the source chain RPC endpoint.
    #[arg(long = "source.rpc-url", id = "source_rpc_url", value_name = "SOURCE_RPC_URL")]
    pub url: reqwest::Url,
    /// The chain id of the source chain.
    #[arg(long = "source.chain-id", id = "source_chain_id", value_name = "SOURCE_CHAIN_ID", default_value_t = cctp_contracts::BASE_CHAIN_ID)]
    pub chain_id: u64,
    /// The burn token on the source chain.
    #[arg(long = "source.token", id = "source_token", value_name = "SOURCE_TOKEN", default_value_t = cctp_contracts::BASE_USDC_ADDRESS)]
    pub token: Address,
    /// The token messenger on the source chain.
    #[arg(long = "source.token-messenger", id = "source_token_messenger", value_name = "SOURCE_TOKEN_MESSENGER", default_value_t = cctp_contracts::BASE_TOKEN_MESSENGER_ADDRESS)]
    pub token_messenger: Address,
    /// The compute units per second for the provider.
    #[arg(long = "source.cups", id = "source_compute_units_per_second", value_name = "SOURCE_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "source.max-retries", id = "source_max_retries", value_name = "SOURCE_MAX_RETRIES", default_value_t = constants::PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider.
    #[arg(long = "source.initial-backoff", id = "source_initial_backoff", value_name = "SOURCE_INITIAL_BACKOFF", default_value_t = constants::PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The arguments for the destination chain.
#[derive(Debug, Clone, clap::Args)]
pub struct DestinationChainArgs {
    /// The URL of the destination chain RPC endpoint.
    #[arg(long = "destination.rpc-url", id = "destination_rpc_url", value_name = "DESTINATION_RPC_URL")]
    pub url: reqwest::Url,
    /// The chain id of the destination chain.
    #[arg(long = "destination.chain-id", id = "destination_chain_id", value_name = "DESTINATION_CHAIN_ID", default_value_t = cctp_contracts::ARBITRUM_CHAIN_ID)]
    pub chain_id: u64,
    /// The protocol domain code of the destination chain.
    #[arg(long = "destination.domain", id = "destination_domain", value_name = "DESTINATION_DOMAIN", default_value_t = cctp_contracts::ARBITRUM_DOMAIN)]
    pub domain: u32,
    /// The message transmitter on the destination chain.
    #[arg(long = "destination.message-transmitter", id = "destination_message_transmitter", value_name = "DESTINATION_MESSAGE_TRANSMITTER", default_value_t = cctp_contracts::ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS)]
    pub message_transmitter: Address,
    /// The mint token on the destination chain.
    #[arg(long = "destination.token", id = "destination_token", value_name = "DESTINATION_TOKEN", default_value_t = cctp_contracts::ARBITRUM_USDC_ADDRESS)]
    pub token: Address,
    /// The compute units per second for the provider.
    #[arg(long = "destination.cups", id = "destination_compute_units_per_second", value_name = "DESTINATION_COMPUTE_UNITS_PER_SECOND", default_value_t = constants::PROVIDER_COMPUTE_UNITS_PER_SECOND)]
    pub compute_units_per_second: u64,
    /// The max amount of retries for the provider.
    #[arg(long = "destination.max-retries", id = "destination_max_retries", value_name = "DESTINATION_MAX_RETRIES", default_value_t = constants::PROVIDER_MAX_RETRIES)]
    pub max_retries: u32,
    /// The initial backoff for the provider.
    #[arg(long = "destination.initial-backoff", id = "destination_initial_backoff", value_name = "DESTINATION_INITIAL_BACKOFF", default_value_t = constants::PROVIDER_INITIAL_BACKOFF)]
    pub initial_backoff: u64,
}

/// The arguments for the attestation service.
#[derive(Debug, Clone, clap::Args)]
pub struct AttestationArgs {
    /// The base URL of the attestation service.
    #[arg(long = "attestation.url", id = "attestation_url", value_name = "ATTESTATION_URL", default_value = cctp_contracts::IRIS_API_URL)]
    pub url: String,
    /// The interval between attestation polls in seconds.
    #[arg(long = "attestation.poll-interval", id = "attestation_poll_interval", value_name = "ATTESTATION_POLL_INTERVAL", default_value_t = constants::DEFAULT_ATTESTATION_POLL_INTERVAL)]
    pub poll_interval: u64,
    /// The ceiling on a single attestation wait in seconds.
    #[arg(long = "attestation.timeout", id = "attestation_timeout", value_name = "ATTESTATION_TIMEOUT", default_value_t = constants::DEFAULT_ATTESTATION_TIMEOUT)]
    pub timeout: u64,
}

/// The arguments for the orchestrator.
#[derive(Debug, Clone, clap::Args)]
pub struct OrchestratorArgs {
    /// The ceiling on a single confirmation wait in seconds.
    #[arg(long = "orchestrator.receipt-timeout", id = "orchestrator_receipt_timeout", value_name = "ORCHESTRATOR_RECEIPT_TIMEOUT", default_value_t = constants::DEFAULT_RECEIPT_TIMEOUT)]
    pub receipt_timeout: u64,
    /// The per-step retry ceiling for transient errors.
    #[arg(long = "orchestrator.max-step-retries", id = "orchestrator_max_step_retries", value_name = "ORCHESTRATOR_MAX_STEP_RETRIES", default_value_t = constants::DEFAULT_MAX_STEP_RETRIES)]
    pub max_step_retries: usize,
    /// The initial retry backoff in milliseconds.
    #[arg(long = "orchestrator.backoff-base-ms", id = "orchestrator_backoff_base_ms", value_name = "ORCHESTRATOR_BACKOFF_BASE_MS", default_value_t = constants::DEFAULT_BACKOFF_BASE_MS)]
    pub backoff_base_ms: u64,
}

/// The arguments for the signer.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SignerArgs {
    /// Path to the file containing the signer's private key
    #[arg(
        long = "signer.key-file",
        value_name = "FILE_PATH",
        help = "Path to the hex-encoded private key file for the signer (optional 0x prefix). Mutually exclusive with --signer.private-key"
    )]
    pub key_file: Option<PathBuf>,
    /// The private key signer, if any.
    #[arg(
        long = "signer.private-key",
        value_name = "PRIVATE_KEY",
        env = "BRIDGE_SIGNER_PRIVATE_KEY",
        help = "Hex-encoded private key for the signer. Mutually exclusive with --signer.key-file"
    )]
    pub private_key: Option<PrivateKeySigner>,
}

impl SignerArgs {
    /// Create a signer based on the configured arguments
    pub fn signer(&self) -> eyre::Result<PrivateKeySigner> {
        if let Some(key_file_path) = &self.key_file {
            // Load the private key from the file
            let key_content = fs::read_to_string(key_file_path).map_err(|e| {
                eyre::eyre!("Failed to read signer key file {}: {}", key_file_path.display(), e)
            })?;
            let key_hex = key_content.trim().trim_start_matches("0x");
            let key_bytes = alloy_primitives::hex::decode(key_hex).map_err(|e| {
                eyre::eyre!(
                    "Failed to decode signer key file {}: {}",
                    key_file_path.display(),
                    e
                )
            })?;
            let signer = PrivateKeySigner::from_slice(&key_bytes)
                .map_err(|e| eyre::eyre!("Failed to create signer from key file: {}", e))?;
            tracing::info!(target: "bridge::node::args", "Created signer with address: {} from key file", signer.address());
            Ok(signer)
        } else if let Some(private_key) = &self.private_key {
            tracing::info!(target: "bridge::node::args", "Created private key signer with address: {}", private_key.address());
            Ok(private_key.clone())
        } else {
            Err(eyre::eyre!("No signer key source configured"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn args(extra: &[&str]) -> BridgeNodeArgs {
        let mut argv = vec![
            "bridge-node",
            "--source.rpc-url",
            "http://localhost:8545",
            "--destination.rpc-url",
            "http://localhost:8546",
            "--amount",
            "1000000",
        ];
        argv.extend_from_slice(extra);
        BridgeNodeArgs::parse_from(argv)
    }

    #[test]
    fn test_validate_requires_a_key_source() {
        let args = args(&[]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_two_key_sources() {
        let args = args(&[
            "--signer.key-file",
            "/path/to/key",
            "--signer.private-key",
            "0x4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_identical_chains() {
        let args = args(&[
            "--signer.private-key",
            "0x4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f",
            "--destination.chain-id",
            "8453",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_defaults_follow_protocol_constants() {
        let args = args(&[
            "--signer.private-key",
            "0x4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f",
        ]);
        args.validate().unwrap();
        assert_eq!(args.source.chain_id, cctp_contracts::BASE_CHAIN_ID);
        assert_eq!(args.destination.domain, cctp_contracts::ARBITRUM_DOMAIN);
        assert_eq!(args.destination.chain_id, cctp_contracts::ARBITRUM_CHAIN_ID);
        assert_eq!(args.attestation.url, cctp_contracts::IRIS_API_URL);
        assert_eq!(args.attestation.poll_interval, 2);
    }

    #[test]
    fn test_signer_from_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0x4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f")
            .unwrap();
        let args = SignerArgs { key_file: Some(file.path().to_path_buf()), private_key: None };
        let signer = args.signer().unwrap();

        let from_key = SignerArgs {
            key_file: None,
            private_key: Some(
                "0x4c0883a69102937d6231471b5dbb6204fe51296170827936ea5cce4b76994b0f"
                    .parse()
                    .unwrap(),
            ),
        }
        .signer()
        .unwrap();
        assert_eq!(signer.address(), from_key.address());
    }
}
