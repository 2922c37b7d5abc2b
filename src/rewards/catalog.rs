//! Token balance, reward catalog filtering and tier progress

use super::RewardError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    Courses,
    Digital,
    Physical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cost: u64,
    pub category: RewardCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(RewardCategory),
}

impl FromStr for CategoryFilter {
    type Err = RewardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(CategoryFilter::All),
            "courses" => Ok(CategoryFilter::Only(RewardCategory::Courses)),
            "digital" => Ok(CategoryFilter::Only(RewardCategory::Digital)),
            "physical" => Ok(CategoryFilter::Only(RewardCategory::Physical)),
            other => Err(RewardError::UnknownCategory(other.to_string())),
        }
    }
}

pub fn filter_by_category(items: &[RewardItem], filter: CategoryFilter) -> Vec<&RewardItem> {
    items
        .iter()
        .filter(|item| match filter {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == category,
        })
        .collect()
}

/// Percent of the way to the next tier, capped at 100.
pub fn tier_progress(tokens: u64, next_tier: u64) -> f64 {
    if next_tier == 0 {
        return 100.0;
    }
    (tokens as f64 / next_tier as f64 * 100.0).min(100.0)
}

/// In-memory token balance for the current visit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenBalance {
    tokens: u64,
    redeemed: Vec<u32>,
}

impl TokenBalance {
    pub fn new(tokens: u64) -> Self { Self { tokens, redeemed: Vec::new() } }

    pub fn tokens(&self) -> u64 { self.tokens }

    pub fn redeemed(&self) -> &[u32] { &self.redeemed }

    pub fn can_afford(&self, item: &RewardItem) -> bool { self.tokens >= item.cost }

    pub fn credit(&mut self, amount: u64) { self.tokens = self.tokens.saturating_add(amount); }

    /// Spend tokens on an item; the balance is untouched on failure.
    pub fn redeem(&mut self, item: &RewardItem) -> Result<u64, RewardError> {
        if !self.can_afford(item) {
            return Err(RewardError::InsufficientTokens { needed: item.cost, available: self.tokens });
        }
        self.tokens -= item.cost;
        self.redeemed.push(item.id);
        info!(reward = item.id, remaining = self.tokens, "reward redeemed");
        Ok(self.tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, cost: u64, category: RewardCategory) -> RewardItem {
        RewardItem { id, title: format!("Reward {}", id), description: String::new(), cost, category }
    }

    #[test]
    fn redeem_deducts_when_affordable() {
        let mut balance = TokenBalance::new(120);
        assert_eq!(balance.redeem(&item(6, 80, RewardCategory::Physical)), Ok(40));
        assert_eq!(balance.redeemed(), &[6]);
    }

    #[test]
    fn redeem_refuses_and_keeps_balance() {
        let mut balance = TokenBalance::new(50);
        let err = balance.redeem(&item(1, 100, RewardCategory::Courses)).unwrap_err();
        assert_eq!(err, RewardError::InsufficientTokens { needed: 100, available: 50 });
        assert_eq!(balance.tokens(), 50);
        assert!(balance.redeemed().is_empty());
    }

    #[test]
    fn filters_by_category() {
        let items = vec![
            item(1, 100, RewardCategory::Courses),
            item(3, 200, RewardCategory::Digital),
            item(5, 120, RewardCategory::Physical),
            item(6, 80, RewardCategory::Physical),
        ];
        assert_eq!(filter_by_category(&items, CategoryFilter::All).len(), 4);
        let physical: Vec<u32> = filter_by_category(&items, "physical".parse().unwrap()).iter().map(|i| i.id).collect();
        assert_eq!(physical, vec![5, 6]);
        assert!("merch".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn tier_progress_caps() {
        assert_eq!(tier_progress(50, 100), 50.0);
        assert_eq!(tier_progress(250, 100), 100.0);
        assert_eq!(tier_progress(10, 0), 100.0);
    }
}
