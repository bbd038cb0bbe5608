//! Minting generated pieces on chain.
//!
//! The service validates its inputs before anything touches the network,
//! derives a token id and hands the actual transaction to a
//! [`ChainClient`]. There are no retries: a failed submission is reported
//! as-is.

pub mod rpc;

use crate::config::ChainConfig;
use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sha3::Keccak256;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use rpc::RpcChainClient;

/// Token ids are reduced modulo this value.
pub const TOKEN_ID_MODULUS: u64 = 0xFFFF_FFFF_FFFF_FFFF;

const TOKEN_SALT_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum MintError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("blockchain configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("RPC transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("unexpected RPC response: {0}")]
    BadResponse(String),

    #[error("transaction {0} reverted")]
    Reverted(String),

    #[error("no receipt for transaction {hash} after {polls} polls")]
    ReceiptTimeout { hash: String, polls: u32 },
}

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case rendering.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let shift = if i % 2 == 0 { 4 } else { 0 };
            let nibble = (hash[i / 2] >> shift) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = MintError;

    /// `0x` followed by 40 hex digits. All-lowercase and all-uppercase
    /// digits are accepted as-is; mixed case must carry a valid EIP-55
    /// checksum.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MintError::InvalidInput(format!("invalid wallet address {s:?}"));

        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        let address = Address(bytes);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum() != s {
            return Err(MintError::InvalidInput(format!(
                "wallet address {s:?} has a bad checksum"
            )));
        }
        Ok(address)
    }
}

/// Derive a token id from the piece id and a salt.
///
/// The SHA-256 digest of `nft_id ‖ salt`, read as a big-endian integer,
/// reduced modulo [`TOKEN_ID_MODULUS`].
pub fn derive_token_id(nft_id: &str, salt: &[u8]) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(nft_id.as_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();

    let modulus = TOKEN_ID_MODULUS as u128;
    digest
        .iter()
        .fold(0u128, |acc, byte| (acc * 256 + *byte as u128) % modulus) as u64
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub transaction_hash: String,
    /// Decimal string; token ids can exceed what JSON numbers hold exactly.
    pub token_id: String,
}

/// Something that can put a mint transaction on chain and wait for it.
#[async_trait]
pub trait ChainClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Submit `mintNFT(recipient, token_id)` and wait for confirmation.
    /// Returns the confirmed transaction hash.
    async fn submit_mint(&self, recipient: Address, token_id: u64) -> Result<String, MintError>;
}

enum Backend {
    Ready(Arc<dyn ChainClient>),
    Unconfigured(String),
}

pub struct MintService {
    backend: Backend,
}

impl MintService {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        Self {
            backend: Backend::Ready(client),
        }
    }

    /// A service that fails every valid mint with
    /// [`MintError::ConfigurationMissing`].
    pub fn unconfigured(reason: impl Into<String>) -> Self {
        Self {
            backend: Backend::Unconfigured(reason.into()),
        }
    }

    /// Build the JSON-RPC backed service, or an unconfigured one when the
    /// chain settings are incomplete.
    pub fn from_config(config: &ChainConfig) -> Self {
        match RpcChainClient::from_config(config) {
            Ok(client) => {
                info!(rpc_url = %client.url(), "minting enabled");
                Self::new(Arc::new(client))
            }
            Err(err) => {
                warn!(error = %err, "minting disabled");
                Self::unconfigured(err.to_string())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    pub async fn mint(&self, nft_id: &str, wallet_address: &str) -> Result<MintReceipt, MintError> {
        let nft_id = nft_id.trim();
        if nft_id.is_empty() {
            return Err(MintError::InvalidInput(
                "nftId must be a non-empty string".to_string(),
            ));
        }
        let recipient: Address = wallet_address.trim().parse()?;

        let client = match &self.backend {
            Backend::Ready(client) => client,
            Backend::Unconfigured(reason) => {
                return Err(MintError::ConfigurationMissing(reason.clone()))
            }
        };

        let mut salt = [0u8; TOKEN_SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let token_id = derive_token_id(nft_id, &salt);

        info!(nft_id, %recipient, token_id, backend = client.name(), "submitting mint");
        let transaction_hash = client.submit_mint(recipient, token_id).await?;
        info!(nft_id, %transaction_hash, token_id, "mint confirmed");

        Ok(MintReceipt {
            transaction_hash,
            token_id: token_id.to_string(),
        })
    }
}
