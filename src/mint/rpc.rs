//! Ethereum JSON-RPC chain client.
//!
//! Sends `mintNFT(address,uint256)` from an account the node manages via
//! `personal_sendTransaction`, then polls `eth_getTransactionReceipt`
//! until the transaction is mined. Keys never leave the node; the
//! configured credential is the account passphrase.

use super::{Address, ChainClient, MintError};
use crate::config::ChainConfig;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

const MINT_SIGNATURE: &str = "mintNFT(address,uint256)";

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptBody {
    transaction_hash: String,
    #[serde(default)]
    status: Option<String>,
}

/// ABI-encoded call data for `mintNFT(recipient, token_id)`.
pub fn mint_calldata(recipient: &Address, token_id: u64) -> String {
    let selector = &Keccak256::digest(MINT_SIGNATURE.as_bytes())[..4];

    let mut data = Vec::with_capacity(4 + 64);
    data.extend_from_slice(selector);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(recipient.as_bytes());
    data.extend_from_slice(&[0u8; 24]);
    data.extend_from_slice(&token_id.to_be_bytes());
    format!("0x{}", hex::encode(data))
}

pub struct RpcChainClient {
    http: reqwest::Client,
    url: String,
    minter: Address,
    passphrase: String,
    contract: Address,
    poll_interval: Duration,
    max_polls: u32,
    next_id: AtomicU64,
}

fn required<'a>(value: &'a Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> &'a str {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(key);
            ""
        }
    }
}

impl RpcChainClient {
    pub fn from_config(config: &ChainConfig) -> Result<Self, MintError> {
        let mut missing = Vec::new();
        let url = required(&config.rpc_url, "chain.rpc_url", &mut missing);
        let minter = required(&config.minter_account, "chain.minter_account", &mut missing);
        let passphrase = required(&config.minter_passphrase, "chain.minter_passphrase", &mut missing);
        let contract = required(&config.contract_address, "chain.contract_address", &mut missing);
        if !missing.is_empty() {
            return Err(MintError::ConfigurationMissing(format!(
                "set {}",
                missing.join(", ")
            )));
        }

        let minter: Address = minter.parse().map_err(|_| {
            MintError::ConfigurationMissing("chain.minter_account is not a valid address".into())
        })?;
        let contract: Address = contract.parse().map_err(|_| {
            MintError::ConfigurationMissing("chain.contract_address is not a valid address".into())
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
            minter,
            passphrase: passphrase.to_string(),
            contract,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls.max(1),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, MintError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(MintError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn wait_for_receipt(&self, hash: String) -> Result<String, MintError> {
        for poll in 1..=self.max_polls {
            let receipt = self.call("eth_getTransactionReceipt", json!([hash])).await?;
            if !receipt.is_null() {
                let receipt: ReceiptBody = serde_json::from_value(receipt)
                    .map_err(|e| MintError::BadResponse(format!("receipt: {e}")))?;
                if receipt.status.as_deref() == Some("0x0") {
                    return Err(MintError::Reverted(receipt.transaction_hash));
                }
                return Ok(receipt.transaction_hash);
            }
            debug!(%hash, poll, "receipt pending");
            if poll < self.max_polls {
                tokio::time::sleep(self.poll_interval).await;
            }
        }
        Err(MintError::ReceiptTimeout {
            hash,
            polls: self.max_polls,
        })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn name(&self) -> &'static str {
        "json-rpc"
    }

    async fn submit_mint(&self, recipient: Address, token_id: u64) -> Result<String, MintError> {
        let transaction = json!({
            "from": self.minter.to_string(),
            "to": self.contract.to_string(),
            "data": mint_calldata(&recipient, token_id),
        });
        let hash = self
            .call("personal_sendTransaction", json!([transaction, self.passphrase]))
            .await?;
        let hash = hash
            .as_str()
            .ok_or_else(|| MintError::BadResponse(format!("transaction hash: {hash}")))?
            .to_string();
        debug!(%hash, "transaction sent");

        self.wait_for_receipt(hash).await
    }
}
