//! Provider wire constants
//!
//! Centralized registry for EIP-1193 method names, event names and the raw
//! provider error codes. Session logic never matches on `code` directly; it
//! goes through `provider::classify`.

/// JSON-RPC methods issued against the injected provider
pub mod method {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const GET_BALANCE: &str = "eth_getBalance";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
}

/// Provider event names
pub mod event {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const CHAIN_CHANGED: &str = "chainChanged";
}

/// Raw provider error codes
pub mod code {
    /// User denied the interactive request.
    pub const USER_REJECTED: i64 = 4001;
    /// The provider does not know the requested chain.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// A previous interactive request is still open in the extension.
    pub const REQUEST_PENDING: i64 = -32002;
    /// Generic internal error, used when a thrown value carries no code.
    pub const INTERNAL: i64 = -32603;
}

/// Block tag for balance queries
pub const LATEST: &str = "latest";
