//! App configuration - passed from higher layers
//!
//! Defaults target Monad Testnet. Load order: defaults, then an optional
//! JSON file, then `BLOCKLEARN_*` environment overrides.

use crate::core::ChainConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_INSTALL_URL: &str = "https://metamask.io/download/";
pub const DEFAULT_PASS_THRESHOLD: u8 = 70;
pub const DEFAULT_CLAIM_DELAY_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read: {0}")]
    Io(#[from] std::io::Error),
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: String,
    pub chain: ChainConfig,
    /// Minimum quiz score, in percent.
    pub pass_threshold: u8,
    /// Simulated mint time for badge claims.
    pub claim_delay_ms: u64,
    pub install_url: String,
    pub next_tier_threshold: u64,
    pub starting_tokens: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: "blocklearn".into(),
            chain: ChainConfig::monad_testnet(),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
            claim_delay_ms: DEFAULT_CLAIM_DELAY_MS,
            install_url: DEFAULT_INSTALL_URL.into(),
            next_tier_threshold: 100,
            starting_tokens: 50,
        }
    }
}

impl AppConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), ..Default::default() }
    }
    pub fn with_chain(mut self, chain: ChainConfig) -> Self { self.chain = chain; self }
    pub fn with_pass_threshold(mut self, percent: u8) -> Self { self.pass_threshold = percent; self }
    pub fn with_claim_delay_ms(mut self, ms: u64) -> Self { self.claim_delay_ms = ms; self }
    pub fn with_install_url(mut self, url: impl Into<String>) -> Self { self.install_url = url.into(); self }
    pub fn with_starting_tokens(mut self, tokens: u64) -> Self { self.starting_tokens = tokens; self }

    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "native")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Apply `BLOCKLEARN_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("BLOCKLEARN_CHAIN_ID") { self.chain.chain_id = v; }
        if let Some(v) = lookup("BLOCKLEARN_CHAIN_NAME") { self.chain.chain_name = v; }
        if let Some(v) = lookup("BLOCKLEARN_RPC_URL") { self.chain.rpc_urls = vec![v]; }
        if let Some(v) = lookup("BLOCKLEARN_EXPLORER_URL") { self.chain.block_explorer_urls = vec![v]; }
        if let Some(v) = lookup("BLOCKLEARN_PASS_THRESHOLD") {
            self.pass_threshold = v.trim().parse().map_err(|_| ConfigError::Invalid(format!("pass threshold {:?}", v)))?;
        }
        if let Some(v) = lookup("BLOCKLEARN_CLAIM_DELAY_MS") {
            self.claim_delay_ms = v.trim().parse().map_err(|_| ConfigError::Invalid(format!("claim delay {:?}", v)))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let hex_id = Regex::new(r"^0[xX][0-9a-fA-F]+$").map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let http = Regex::new(r"^https?://\S+$").map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if !hex_id.is_match(&self.chain.chain_id) {
            return Err(ConfigError::Invalid(format!("chain id must be hex: {}", self.chain.chain_id)));
        }
        if self.chain.rpc_urls.is_empty() {
            return Err(ConfigError::Invalid("at least one rpc url is required".into()));
        }
        if let Some(bad) = self.chain.rpc_urls.iter().chain(&self.chain.block_explorer_urls).find(|u| !http.is_match(u)) {
            return Err(ConfigError::Invalid(format!("not an http(s) url: {}", bad)));
        }
        if self.pass_threshold > 100 {
            return Err(ConfigError::Invalid(format!("pass threshold above 100: {}", self.pass_threshold)));
        }
        Ok(())
    }
}
