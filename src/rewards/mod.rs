//! Rewards - badge claims and token redemption
//!
//! Nothing here touches a chain: badge "minting" waits on a `Timer` and the
//! token balance lives in memory for the current visit.
//!
//! ```text
//! QuizResult ─┐
//!             ├─► check_eligibility ─► ClaimDesk::claim_badge ─► Timer ─► BadgeClaim
//! Snapshot ───┘
//!
//! TokenBalance::redeem(RewardItem) ─► remaining tokens | InsufficientTokens
//! ```

mod catalog;
mod claim;

pub use catalog::{filter_by_category, tier_progress, CategoryFilter, RewardCategory, RewardItem, TokenBalance};
pub use claim::{check_eligibility, BadgeClaim, ClaimDesk, ImmediateTimer, Timer};
#[cfg(feature = "native")]
pub use claim::TokioTimer;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RewardError {
    #[error("connect your wallet to claim rewards")]
    NotConnected,
    #[error("quiz not passed: scored {percentage:.0}%, need {threshold}%")]
    NotPassed { percentage: f64, threshold: u8 },
    #[error("a claim is already in progress")]
    ClaimInProgress,
    #[error("not enough tokens: need {needed}, have {available}")]
    InsufficientTokens { needed: u64, available: u64 },
    #[error("unknown reward category: {0}")]
    UnknownCategory(String),
}
