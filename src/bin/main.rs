//! BlockLearn CLI - inspect config, grade quizzes, rehearse wallet flows
//!
//!   blocklearn chain                       → chain descriptor JSON (wallet_addEthereumChain)
//!   blocklearn config                      → effective AppConfig
//!   blocklearn grade <quiz.json> <ans>...  → {"correct": 4, "total": 5, "passed": true, ...}
//!   blocklearn claim <quiz.json> <ans>...  → grade, connect a scripted wallet, claim the badge
//!   blocklearn simulate <scenario>         → run a WalletSession against a scripted provider
//!
//! Answers are option ids in question order; `-` leaves a question unanswered.
//!
//! Scenarios: connect, restore, reject, pending, no-accounts, no-provider,
//! unknown-chain, network-fail, switch-account, revoke, chain-change
//!
//! Configuration:
//!   --config <file>   JSON AppConfig (partial is fine), then BLOCKLEARN_* env overrides
//!   --pretty          Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context};
use blocklearn::logging::init_logging;
use blocklearn::provider::{MemoryProvider, NoProvider, ProviderError, ProviderEvent};
use blocklearn::rewards::{ClaimDesk, TokioTimer};
use blocklearn::session::{ConnectOutcome, NetworkSetup, SessionNotice, WalletSession};
use blocklearn::{grade, short_address, AppConfig, Quiz, WalletError};
use futures::StreamExt;
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::time::Duration;
use tracing::{debug, info};

const ALICE: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";
const BOB: &str = "0x2546BcD3c84621e976D8185a91A922aE77ECEc30";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("blocklearn {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = load_config(&opts).and_then(|config| match opts.command.as_deref() {
        Some("chain") => Ok(json!(config.chain)),
        Some("config") => Ok(json!(config)),
        Some("grade") => cmd_grade(&opts, &config),
        Some("claim") => run_local(cmd_claim(&opts, &config)),
        Some("simulate") => run_local(cmd_simulate(&opts, &config)),
        Some(cmd) => Err(format!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            std::process::exit(0);
        }
    });

    let pretty = opts.pretty || std::io::stdout().is_terminal();
    let render = |value: &Value| {
        let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
        rendered.unwrap_or_else(|_| value.to_string())
    };

    match result {
        Ok(output) => println!("{}", render(&output)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": e})));
            std::process::exit(1);
        }
    }
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    config: Option<String>,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            match arg.as_str() {
                "--help" | "-h" => opts.help = true,
                "--version" | "-V" => opts.version = true,
                "--pretty" => opts.pretty = true,
                "--config" | "-c" => {
                    if i + 1 < args.len() {
                        opts.config = Some(args[i + 1].clone());
                        i += 1;
                    }
                }
                _ if opts.command.is_none() => opts.command = Some(arg.clone()),
                _ => opts.positional.push(arg.clone()),
            }
            i += 1;
        }
        opts
    }
}

fn print_usage() {
    println!(
        "blocklearn - wallet session, quiz and reward rules

USAGE:
    blocklearn [--config <file>] [--pretty] <command> [args]

COMMANDS:
    chain                         Print the target chain descriptor
    config                        Print the effective configuration
    grade <quiz.json> <ans>...    Grade answers ('-' = unanswered)
    claim <quiz.json> <ans>...    Grade, connect a scripted wallet, claim the badge
    simulate <scenario>           Rehearse a wallet flow against a scripted provider

SCENARIOS:
    connect restore reject pending no-accounts no-provider
    unknown-chain network-fail switch-account revoke chain-change

ENVIRONMENT:
    BLOCKLEARN_CHAIN_ID, BLOCKLEARN_CHAIN_NAME, BLOCKLEARN_RPC_URL,
    BLOCKLEARN_EXPLORER_URL, BLOCKLEARN_PASS_THRESHOLD, BLOCKLEARN_CLAIM_DELAY_MS,
    BLOCKLEARN_LOG_FORMAT=compact|pretty|json, BLOCKLEARN_LOG_JSON=1, RUST_LOG"
    );
}

fn load_config(opts: &ParsedArgs) -> Result<AppConfig, String> {
    let config = match &opts.config {
        Some(path) => AppConfig::load(path).map_err(|e| e.to_string())?,
        None => AppConfig::default(),
    };
    config.with_env().map_err(|e| e.to_string())
}

/// Sessions are `!Send`, so async commands run on a current-thread runtime.
fn run_local<F: std::future::Future<Output = anyhow::Result<Value>>>(fut: F) -> Result<Value, String> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("runtime: {}", e))?;
    rt.block_on(fut).map_err(|e| format!("{:#}", e))
}

fn read_quiz(opts: &ParsedArgs) -> Result<(Quiz, Vec<Option<String>>), String> {
    let path = opts.positional.first().ok_or("Missing quiz file")?;
    let raw = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    let quiz: Quiz = serde_json::from_str(&raw).map_err(|e| format!("{}: {}", path, e))?;
    let answers = opts.positional[1..]
        .iter()
        .map(|a| if a == "-" { None } else { Some(a.clone()) })
        .collect();
    Ok((quiz, answers))
}

fn cmd_grade(opts: &ParsedArgs, config: &AppConfig) -> Result<Value, String> {
    let (quiz, answers) = read_quiz(opts)?;
    let result = grade(&quiz, &answers, config.pass_threshold).map_err(|e| e.to_string())?;
    debug!(quiz = %quiz.id, correct = result.correct, total = result.total, "graded");
    Ok(json!(result))
}

async fn cmd_claim(opts: &ParsedArgs, config: &AppConfig) -> anyhow::Result<Value> {
    let (quiz, answers) = read_quiz(opts).map_err(|e| anyhow!(e))?;
    let result = grade(&quiz, &answers, config.pass_threshold)?;

    let provider = MemoryProvider::new().with_accounts([ALICE]);
    let session = WalletSession::from_config(provider, config);
    session.connect().await.context("connect scripted wallet")?;

    let desk = ClaimDesk::new(TokioTimer, Duration::from_millis(config.claim_delay_ms));
    info!(delay_ms = config.claim_delay_ms, "claiming badge");
    let claim = desk.claim_badge(&result, &session.snapshot()).await?;
    Ok(json!({"result": result, "claim": claim}))
}

fn describe(outcome: &Result<ConnectOutcome, WalletError>) -> Value {
    match outcome {
        Ok(ConnectOutcome::Connected { address, network }) => {
            let network = match network {
                NetworkSetup::Switched => json!("switched"),
                NetworkSetup::Added => json!("added"),
                NetworkSetup::Failed(err) => json!({"failed": err.to_string()}),
            };
            json!({"connected": address, "network": network})
        }
        Ok(ConnectOutcome::Ignored) => json!("ignored"),
        Err(err) => json!({"failed": err.kind(), "message": err.user_message()}),
    }
}

async fn cmd_simulate(opts: &ParsedArgs, config: &AppConfig) -> anyhow::Result<Value> {
    let scenario = opts.positional.first().map(String::as_str).context("Missing scenario")?;

    let provider = MemoryProvider::new()
        .with_balance(ALICE, 1_500_000_000_000_000_000)
        .with_balance(BOB, 250_000_000_000_000_000);
    let provider = match scenario {
        "connect" | "switch-account" | "revoke" | "chain-change" | "no-provider" => provider.with_accounts([ALICE]),
        "restore" => provider.with_authorized([ALICE]),
        "reject" => provider.failing_request_accounts(ProviderError::user_rejected()),
        "pending" => provider.failing_request_accounts(ProviderError::request_pending()),
        "no-accounts" => provider,
        "unknown-chain" => provider
            .with_accounts([ALICE])
            .failing_switch(ProviderError::unrecognized_chain(&config.chain.chain_id)),
        "network-fail" => provider.with_accounts([ALICE]).failing_switch(ProviderError::user_rejected()),
        other => bail!("Unknown scenario: {}", other),
    };

    let session = if scenario == "no-provider" {
        WalletSession::from_config(NoProvider, config)
    } else {
        WalletSession::from_config(provider.clone(), config)
    };
    let notices = session.watch();
    let events = session.subscribe_events();

    let outcome = if scenario == "restore" {
        json!({"restored": session.probe_existing_connection().await})
    } else {
        describe(&session.connect().await)
    };

    match scenario {
        "switch-account" => provider.emit(ProviderEvent::AccountsChanged(vec![BOB.into()])),
        "revoke" => provider.emit(ProviderEvent::AccountsChanged(Vec::new())),
        "chain-change" => provider.emit(ProviderEvent::ChainChanged("0x1".into())),
        _ => {}
    }

    // Detach so the event loop drains what was emitted and returns.
    session.teardown();
    if let Some(events) = events {
        session.run_events(events).await;
    }

    let snapshot = session.snapshot();
    let explorer = snapshot.address.as_deref().and_then(|a| session.chain().explorer_address_url(a));
    let display = snapshot.address.as_deref().map(short_address);
    drop(session);
    let notices: Vec<SessionNotice> = notices.collect().await;

    Ok(json!({
        "scenario": scenario,
        "outcome": outcome,
        "snapshot": snapshot,
        "display": display,
        "explorer": explorer,
        "notices": notices,
        "calls": provider.calls(),
    }))
}
