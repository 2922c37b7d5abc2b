//! BlockLearn: wallet session, quiz grading and reward rules for a learn-to-earn site.
//!
//! # Architecture
//!
//! ```text
//! WalletSession (entry point)
//!   │
//!   ├── ProviderLocator ──► WalletProvider (EIP-1193)
//!   │     ├── InjectedProvider (window.ethereum, wasm)
//!   │     └── MemoryProvider   (scripted, tests + CLI)
//!   │
//!   ├── ChainConfig (target network, switch/add descriptor)
//!   │
//!   └── SessionNotice channel ──► UI (status, failures, reload)
//!
//! Quiz ──grade──► QuizResult ──ClaimDesk──► BadgeClaim
//! TokenBalance ──redeem──► RewardItem
//! ```
//!
//! # Features
//!
//! - `native` - CLI, tokio timer, tracing subscriber
//! - `wasm` - browser bindings (`BlockLearnWallet`, `BadgeDesk`, `gradeQuiz`)
//!
//! # Usage
//!
//! ```ignore
//! use blocklearn::{AppConfig, WalletSession};
//! use blocklearn::provider::MemoryProvider;
//!
//! let provider = MemoryProvider::new().with_accounts(["0xabc..."]);
//! let session = WalletSession::from_config(provider, &AppConfig::default());
//! session.connect().await?;
//! assert!(session.snapshot().is_connected());
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod core;
pub mod learn;
pub mod provider;
pub mod rewards;
pub mod session;

// =============================================================================
// Native-only modules (CLI, tracing subscriber)
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports: Shared
// =============================================================================
pub use config::{AppConfig, ConfigError};
pub use crate::core::{format_units, short_address, ChainConfig, NativeCurrency};
pub use learn::{grade, require_connected, AccessDenied, Quiz, QuizAttempt, QuizResult};
pub use provider::{ProviderError, WalletError, WalletProvider};
pub use rewards::{ClaimDesk, RewardError, TokenBalance};
pub use session::{ConnectOutcome, ConnectionStatus, SessionNotice, SessionSnapshot, WalletSession};

// =============================================================================
// Re-exports: WASM
// =============================================================================
#[cfg(feature = "wasm")]
pub use wasm::{BadgeDesk, BlockLearnWallet};
