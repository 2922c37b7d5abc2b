//! Config Tests: file loading and BLOCKLEARN_* environment overrides

#![cfg(feature = "native")]

use blocklearn::{AppConfig, ChainConfig, ConfigError};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use tempfile::TempDir;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}

const ENV_KEYS: &[&str] = &[
    "BLOCKLEARN_CHAIN_ID",
    "BLOCKLEARN_CHAIN_NAME",
    "BLOCKLEARN_RPC_URL",
    "BLOCKLEARN_EXPLORER_URL",
    "BLOCKLEARN_PASS_THRESHOLD",
    "BLOCKLEARN_CLAIM_DELAY_MS",
];

fn clear_env() {
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
}

#[test]
fn load_partial_file_over_defaults() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("blocklearn.json");
    std::fs::write(&path, r#"{"pass_threshold": 80, "claim_delay_ms": 500}"#).unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.pass_threshold, 80);
    assert_eq!(config.claim_delay_ms, 500);
    assert_eq!(config.chain, ChainConfig::monad_testnet());
}

#[test]
fn config_round_trips_through_json() {
    let config = AppConfig::new("course-site").with_pass_threshold(90).with_starting_tokens(10);
    let raw = serde_json::to_string(&config).unwrap();
    assert!(raw.contains(r#""chainId":"0x279f""#));
    assert_eq!(AppConfig::from_json(&raw).unwrap(), config);
}

#[test]
fn load_reports_missing_and_malformed_files() {
    let dir = TempDir::new().expect("tempdir");
    assert!(matches!(AppConfig::load(dir.path().join("absent.json")), Err(ConfigError::Io(_))));

    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(AppConfig::load(&path), Err(ConfigError::Json(_))));
}

#[test]
fn threshold_above_hundred_is_invalid() {
    let err = AppConfig::from_json(r#"{"pass_threshold": 101}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn env_overrides_file_values() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var("BLOCKLEARN_CHAIN_ID", "0x2a");
    std::env::set_var("BLOCKLEARN_CHAIN_NAME", "Local Devnet");
    std::env::set_var("BLOCKLEARN_RPC_URL", "http://127.0.0.1:8545");
    std::env::set_var("BLOCKLEARN_CLAIM_DELAY_MS", "0");

    let config = AppConfig::from_json(r#"{"pass_threshold": 60}"#).unwrap().with_env();
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.chain.chain_id, "0x2a");
    assert_eq!(config.chain.chain_id_u64(), Some(42));
    assert_eq!(config.chain.chain_name, "Local Devnet");
    assert_eq!(config.chain.rpc_urls, vec!["http://127.0.0.1:8545".to_string()]);
    assert_eq!(config.pass_threshold, 60);
    assert_eq!(config.claim_delay_ms, 0);
}

#[test]
fn malformed_env_chain_id_is_rejected() {
    let _guard = lock_env();
    clear_env();
    std::env::set_var("BLOCKLEARN_CHAIN_ID", "10143");

    let result = AppConfig::default().with_env();
    clear_env();
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
}
