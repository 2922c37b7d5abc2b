//! Provider errors and the closed wallet error taxonomy
//!
//! `classify` is the only place that looks at raw provider codes.

use crate::core::rpc::code;
use thiserror::Error;

/// Raw error as thrown by the injected provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn user_rejected() -> Self { Self::new(code::USER_REJECTED, "User rejected the request.") }
    pub fn request_pending() -> Self { Self::new(code::REQUEST_PENDING, "Request already pending.") }
    pub fn unrecognized_chain(chain_id: &str) -> Self {
        Self::new(code::UNRECOGNIZED_CHAIN, format!("Unrecognized chain ID \"{}\".", chain_id))
    }
    pub fn internal(message: impl Into<String>) -> Self { Self::new(code::INTERNAL, message) }

    pub fn is_unrecognized_chain(&self) -> bool { self.code == code::UNRECOGNIZED_CHAIN }
}

/// Every failure a wallet session can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("no wallet provider found; install one from {install_url}")]
    ProviderMissing { install_url: String },
    #[error("user rejected the connection request")]
    UserRejected,
    #[error("wallet is already processing a request")]
    RequestPending,
    #[error("no accounts returned from wallet")]
    NoAccounts,
    #[error("network setup failed: {0}")]
    NetworkSetup(String),
    #[error("balance query failed: {0}")]
    BalanceQuery(String),
    #[error("wallet error {code}: {message}")]
    Provider { code: i64, message: String },
}

impl WalletError {
    /// Stable identifier for UI layers
    pub fn kind(&self) -> &'static str {
        match self {
            WalletError::ProviderMissing { .. } => "provider_missing",
            WalletError::UserRejected => "user_rejected",
            WalletError::RequestPending => "request_pending",
            WalletError::NoAccounts => "no_accounts",
            WalletError::NetworkSetup(_) => "network_setup",
            WalletError::BalanceQuery(_) => "balance_query",
            WalletError::Provider { .. } => "provider",
        }
    }

    /// Whether the failure leaves the connection usable.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WalletError::NetworkSetup(_) | WalletError::BalanceQuery(_))
    }

    /// Whether the user can fix it (install, retry, wait).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WalletError::Provider { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            WalletError::ProviderMissing { .. } => "Please install MetaMask to connect your wallet".into(),
            WalletError::UserRejected => {
                "You rejected the connection request. Please try again and approve the connection in MetaMask.".into()
            }
            WalletError::RequestPending => {
                "MetaMask is already processing a request. Please check your MetaMask extension.".into()
            }
            WalletError::NoAccounts => "No accounts returned from wallet".into(),
            WalletError::NetworkSetup(_) => "Could not switch your wallet to the course network".into(),
            WalletError::BalanceQuery(_) => "Could not load your balance".into(),
            WalletError::Provider { message, .. } if !message.is_empty() => message.clone(),
            WalletError::Provider { .. } => {
                "Failed to connect wallet. Please make sure MetaMask is unlocked and try again.".into()
            }
        }
    }
}

/// Map a raw provider error onto the taxonomy.
pub fn classify(err: &ProviderError) -> WalletError {
    match err.code {
        code::USER_REJECTED => WalletError::UserRejected,
        code::REQUEST_PENDING => WalletError::RequestPending,
        _ => WalletError::Provider { code: err.code, message: err.message.clone() },
    }
}
