//! Badge claims for passed quizzes. Minting is simulated with a timer.

use super::RewardError;
use crate::core::flight::InFlight;
use crate::learn::{require_connected, QuizResult};
use crate::session::SessionSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tracing::info;

#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}

/// Resolves at once; for simulations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateTimer;

#[async_trait(?Send)]
impl Timer for ImmediateTimer {
    async fn sleep(&self, _duration: Duration) {}
}

#[cfg(feature = "native")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[cfg(feature = "native")]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeClaim {
    pub quiz_id: String,
    pub address: String,
    pub claimed_at: DateTime<Utc>,
}

/// Why a result/session pair cannot claim, if it cannot.
pub fn check_eligibility<'s>(result: &QuizResult, snapshot: &'s SessionSnapshot) -> Result<&'s str, RewardError> {
    let address = require_connected(snapshot).map_err(|_| RewardError::NotConnected)?;
    if !result.passed {
        return Err(RewardError::NotPassed { percentage: result.percentage, threshold: result.threshold });
    }
    Ok(address)
}

pub struct ClaimDesk<T: Timer> {
    timer: T,
    delay: Duration,
    claiming: Cell<bool>,
    claims: RefCell<Vec<BadgeClaim>>,
}

impl<T: Timer> ClaimDesk<T> {
    pub fn new(timer: T, delay: Duration) -> Self {
        Self { timer, delay, claiming: Cell::new(false), claims: RefCell::new(Vec::new()) }
    }

    pub fn is_claiming(&self) -> bool { self.claiming.get() }

    pub fn claims(&self) -> Vec<BadgeClaim> { self.claims.borrow().clone() }

    /// One claim at a time; a second call while one is pending is refused.
    pub async fn claim_badge(&self, result: &QuizResult, snapshot: &SessionSnapshot) -> Result<BadgeClaim, RewardError> {
        let address = check_eligibility(result, snapshot)?;
        let Some(_guard) = InFlight::acquire(&self.claiming) else {
            return Err(RewardError::ClaimInProgress);
        };

        self.timer.sleep(self.delay).await;

        let claim = BadgeClaim { quiz_id: result.quiz_id.clone(), address: address.to_string(), claimed_at: Utc::now() };
        info!(quiz = %claim.quiz_id, address = %claim.address, "badge claimed");
        self.claims.borrow_mut().push(claim.clone());
        Ok(claim)
    }
}
