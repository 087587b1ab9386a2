use alloy_primitives::{address, Address};

// <https://developers.circle.com/stablecoins/evm-smart-contracts> lists the
// CCTP contract addresses, <https://developers.circle.com/stablecoins/usdc-on-main-networks>
// the USDC token addresses.

/// The address of the CCTP token messenger contract on Base mainnet.
pub const BASE_TOKEN_MESSENGER_ADDRESS: Address =
    address!("1682Ae6375C4E4A97e4B583BC394c861A46D8962");

/// The address of the USDC token contract on Base mainnet.
pub const BASE_USDC_ADDRESS: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");

/// The address of the CCTP message transmitter contract on Arbitrum One.
pub const ARBITRUM_MESSAGE_TRANSMITTER_ADDRESS: Address =
    address!("C30362313FBBA5cf9163F0bb16a0e01f01A896ca");

/// The address of the USDC token contract on Arbitrum One.
pub const ARBITRUM_USDC_ADDRESS: Address = address!("af88d065e77c8cC2239327C5EDb3A432268e5831");

/// The CCTP domain code of Arbitrum One. Distinct from the chain id.
pub const ARBITRUM_DOMAIN: u32 = 3;

/// The chain id of Base mainnet.
pub const BASE_CHAIN_ID: u64 = 8453;

/// The chain id of Arbitrum One.
pub const ARBITRUM_CHAIN_ID: u64 = 42161;

/// The base URL of Circle's Iris attestation service.
pub const IRIS_API_URL: &str = "https://iris-api.circle.com";
