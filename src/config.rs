//! Configuration loading for zigzag.
//!
//! Configuration is loaded from TOML files with environment variable
//! overrides, e.g. `ZIGZAG__CHAIN__RPC_URL` sets `chain.rpc_url`.

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "config.default.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ZigzagConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Rendered images kept in memory for `/api/nft/image/{id}`.
    #[serde(default = "default_gallery_capacity")]
    pub gallery_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            gallery_capacity: default_gallery_capacity(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_gallery_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_directory")]
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
        }
    }
}

fn default_directory() -> String {
    "output".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_style")]
    pub style: String,

    #[serde(default = "default_palette")]
    pub palette: String,

    #[serde(default = "default_complexity")]
    pub complexity: i64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            palette: default_palette(),
            complexity: default_complexity(),
        }
    }
}

fn default_style() -> String {
    "Psychedelic".to_string()
}

fn default_palette() -> String {
    "Rainbow".to_string()
}

fn default_complexity() -> i64 {
    5
}

/// Chain settings. Minting stays disabled until the four connection
/// fields are all present.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub rpc_url: Option<String>,

    #[serde(default)]
    pub minter_account: Option<String>,

    #[serde(default)]
    pub minter_passphrase: Option<String>,

    #[serde(default)]
    pub contract_address: Option<String>,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            minter_account: None,
            minter_passphrase: None,
            contract_address: None,
            poll_interval_ms: default_poll_interval_ms(),
            max_polls: default_max_polls(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_max_polls() -> u32 {
    120
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub allowed_login: Option<String>,

    /// Request header carrying the login asserted by the identity proxy.
    #[serde(default = "default_login_header")]
    pub login_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            allowed_login: None,
            login_header: default_login_header(),
        }
    }
}

fn default_auth_enabled() -> bool {
    true
}

fn default_login_header() -> String {
    "x-github-login".to_string()
}

impl ZigzagConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false))
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("ZIGZAG").separator("__"))
            .build()?;

        let zigzag_config: ZigzagConfig = config.try_deserialize()?;
        Ok(zigzag_config)
    }
}
