//! Chain descriptor - the network the app targets
//!
//! Serializes with camelCase keys so it can be handed to
//! `wallet_addEthereumChain` unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Hex chain id, e.g. `0x279f`
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self { Self::monad_testnet() }
}

impl ChainConfig {
    pub fn monad_testnet() -> Self {
        Self {
            chain_id: "0x279f".into(),
            chain_name: "Monad Testnet".into(),
            native_currency: NativeCurrency { name: "Monad".into(), symbol: "MON".into(), decimals: 18 },
            rpc_urls: vec!["https://testnet-rpc.monad.xyz/".into()],
            block_explorer_urls: vec!["https://testnet.monadexplorer.com/".into()],
        }
    }

    /// Numeric chain id, if the hex form parses.
    pub fn chain_id_u64(&self) -> Option<u64> {
        let digits = self.chain_id.strip_prefix("0x").or_else(|| self.chain_id.strip_prefix("0X"))?;
        u64::from_str_radix(digits, 16).ok()
    }

    /// Case-insensitive comparison against a chain id reported by a provider.
    pub fn is_chain(&self, chain_id: &str) -> bool {
        self.chain_id.eq_ignore_ascii_case(chain_id)
    }

    /// Params for `wallet_switchEthereumChain`
    pub fn switch_params(&self) -> Value {
        json!([{ "chainId": self.chain_id }])
    }

    /// Params for `wallet_addEthereumChain`
    pub fn add_params(&self) -> Value {
        json!([self])
    }

    pub fn explorer_address_url(&self, address: &str) -> Option<String> {
        self.block_explorer_urls.first().map(|base| format!("{}/address/{}", base.trim_end_matches('/'), address))
    }
}
