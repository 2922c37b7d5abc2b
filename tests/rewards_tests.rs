//! Rewards Tests: badge claims on the tokio timer, token redemption

#![cfg(feature = "native")]

use blocklearn::provider::MemoryProvider;
use blocklearn::rewards::{filter_by_category, tier_progress, CategoryFilter, RewardCategory, RewardItem, TokioTimer};
use blocklearn::{AppConfig, ClaimDesk, QuizResult, RewardError, TokenBalance, WalletSession};
use std::time::{Duration, Instant};

const ALICE: &str = "0x71c7656ec7ab88b098defb751b7401b5f6d8976f";

fn passed() -> QuizResult {
    QuizResult { quiz_id: "blockchain-basics".into(), correct: 4, total: 5, percentage: 80.0, threshold: 70, passed: true }
}

fn catalog() -> Vec<RewardItem> {
    let item = |id, title: &str, cost, category| RewardItem {
        id,
        title: title.into(),
        description: String::new(),
        cost,
        category,
    };
    vec![
        item(1, "Advanced DeFi Course", 100, RewardCategory::Courses),
        item(2, "NFT Creation Workshop", 150, RewardCategory::Courses),
        item(3, "Exclusive NFT Badge", 200, RewardCategory::Digital),
        item(4, "Premium Community Access", 300, RewardCategory::Digital),
        item(5, "BlockLearn T-Shirt", 120, RewardCategory::Physical),
        item(6, "Sticker Pack", 80, RewardCategory::Physical),
    ]
}

#[tokio::test]
async fn claim_waits_for_mint_and_records_address() {
    let provider = MemoryProvider::new().with_accounts([ALICE]);
    let session = WalletSession::from_config(provider, &AppConfig::default());
    session.connect().await.unwrap();

    let desk = ClaimDesk::new(TokioTimer, Duration::from_millis(20));
    let started = Instant::now();
    let claim = desk.claim_badge(&passed(), &session.snapshot()).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(20));
    assert_eq!(claim.address, ALICE);
    assert_eq!(claim.quiz_id, "blockchain-basics");
    assert_eq!(desk.claims(), vec![claim]);
}

#[tokio::test]
async fn second_claim_while_minting_is_refused() {
    let provider = MemoryProvider::new().with_accounts([ALICE]);
    let session = WalletSession::from_config(provider, &AppConfig::default());
    session.connect().await.unwrap();
    let snapshot = session.snapshot();
    let result = passed();

    let desk = ClaimDesk::new(TokioTimer, Duration::from_millis(20));
    let (first, second) = futures::join!(desk.claim_badge(&result, &snapshot), async {
        assert!(desk.is_claiming());
        desk.claim_badge(&result, &snapshot).await
    });

    assert!(first.is_ok());
    assert_eq!(second.unwrap_err(), RewardError::ClaimInProgress);
    assert!(!desk.is_claiming());

    // Settled; claiming again is allowed.
    desk.claim_badge(&result, &snapshot).await.unwrap();
    assert_eq!(desk.claims().len(), 2);
}

#[tokio::test]
async fn claim_requires_connection() {
    let session = WalletSession::from_config(MemoryProvider::new(), &AppConfig::default());
    let desk = ClaimDesk::new(TokioTimer, Duration::ZERO);

    let err = desk.claim_badge(&passed(), &session.snapshot()).await.unwrap_err();
    assert_eq!(err, RewardError::NotConnected);
    assert!(desk.claims().is_empty());
}

#[test]
fn redemption_spends_until_short() {
    let config = AppConfig::default();
    let mut balance = TokenBalance::new(config.starting_tokens);
    let items = catalog();

    assert_eq!(balance.redeem(&items[5]), Err(RewardError::InsufficientTokens { needed: 80, available: 50 }));
    assert_eq!(balance.tokens(), 50);

    balance.credit(100);
    assert_eq!(balance.redeem(&items[5]), Ok(70));
    assert_eq!(balance.redeem(&items[0]), Err(RewardError::InsufficientTokens { needed: 100, available: 70 }));
    assert_eq!(balance.redeemed(), &[6]);
}

#[test]
fn catalog_filters_and_tier_progress() {
    let items = catalog();
    let digital: Vec<&str> = filter_by_category(&items, "Digital".parse().unwrap())
        .into_iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(digital, vec!["Exclusive NFT Badge", "Premium Community Access"]);
    assert_eq!(filter_by_category(&items, CategoryFilter::default()).len(), items.len());

    let config = AppConfig::default();
    assert_eq!(tier_progress(config.starting_tokens, config.next_tier_threshold), 50.0);
}
