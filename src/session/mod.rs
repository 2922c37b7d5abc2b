//! WalletSession - connection lifecycle against an injected wallet
//!
//! # State machine
//!
//! ```text
//! Disconnected --connect() ok-------------> Connected
//! Disconnected --connect() failure--------> Disconnected
//! Connected    --disconnect()-------------> Disconnected
//! Connected    --accountsChanged([])------> Disconnected
//! Connected    --accountsChanged([a,..])--> Connected (address = a)
//! (any)        --connect() while in flight-> ignored
//! ```
//!
//! Provider failures stop at this boundary: `connect()` returns a classified
//! `WalletError` and publishes it once on the notice channel; probe and event
//! failures are only logged.

mod state;

pub use state::{ConnectionStatus, SessionSnapshot, ZERO_BALANCE};

use crate::config::AppConfig;
use crate::core::flight::InFlight;
use crate::core::{format_units, ChainConfig};
use crate::provider::{classify, ProviderEvent, ProviderLocator, Subscription, WalletError, WalletProvider};
use futures::channel::mpsc;
use futures::StreamExt;
use serde::Serialize;
use state::Connection;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Everything a presentation layer may want to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionNotice {
    Status(SessionSnapshot),
    Failed { kind: String, message: String },
    /// Chain changed underneath us; the host should reload.
    ReloadRequested { chain_id: String },
}

impl SessionNotice {
    fn failed(err: &WalletError) -> Self {
        SessionNotice::Failed { kind: err.kind().into(), message: err.user_message() }
    }
}

/// Result of the network step of `connect()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkSetup {
    Switched,
    Added,
    /// Connection kept; user may be on the wrong network.
    Failed(WalletError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    Connected { address: String, network: NetworkSetup },
    /// Another `connect()` was already in flight.
    Ignored,
}

pub struct WalletSession {
    locator: Box<dyn ProviderLocator>,
    chain: ChainConfig,
    install_url: String,
    state: RefCell<Connection>,
    in_flight: Cell<bool>,
    active: RefCell<Option<Rc<dyn WalletProvider>>>,
    subscription: RefCell<Option<Subscription>>,
    watchers: RefCell<Vec<mpsc::UnboundedSender<SessionNotice>>>,
}

impl WalletSession {
    pub fn new(locator: impl ProviderLocator + 'static, chain: ChainConfig) -> Self {
        Self {
            locator: Box::new(locator),
            chain,
            install_url: crate::config::DEFAULT_INSTALL_URL.into(),
            state: RefCell::new(Connection::Disconnected),
            in_flight: Cell::new(false),
            active: RefCell::new(None),
            subscription: RefCell::new(None),
            watchers: RefCell::new(Vec::new()),
        }
    }

    pub fn from_config(locator: impl ProviderLocator + 'static, config: &AppConfig) -> Self {
        Self::new(locator, config.chain.clone()).with_install_url(config.install_url.clone())
    }

    pub fn with_install_url(mut self, url: impl Into<String>) -> Self { self.install_url = url.into(); self }

    pub fn chain(&self) -> &ChainConfig { &self.chain }

    pub fn snapshot(&self) -> SessionSnapshot { self.state.borrow().snapshot() }

    pub fn status(&self) -> ConnectionStatus { self.snapshot().status }

    pub fn address(&self) -> Option<String> { self.state.borrow().address().map(str::to_string) }

    pub fn balance(&self) -> String { self.snapshot().balance }

    pub fn is_connecting(&self) -> bool { self.in_flight.get() }

    /// Notice channel (status, classified failures, reload requests).
    pub fn watch(&self) -> mpsc::UnboundedReceiver<SessionNotice> {
        let (tx, rx) = mpsc::unbounded();
        self.watchers.borrow_mut().push(tx);
        rx
    }

    fn publish(&self, notice: SessionNotice) {
        self.watchers.borrow_mut().retain(|tx| tx.unbounded_send(notice.clone()).is_ok());
    }

    fn transition(&self, next: Connection) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            if *state == next {
                return;
            }
            *state = next;
            state.snapshot()
        };
        debug!(status = snapshot.status.as_str(), "wallet session transition");
        self.publish(SessionNotice::Status(snapshot));
    }

    fn reset(&self) {
        *self.active.borrow_mut() = None;
        self.transition(Connection::Disconnected);
    }

    fn provider(&self) -> Option<Rc<dyn WalletProvider>> {
        self.active.borrow().clone().or_else(|| self.locator.locate())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Startup check for an already-authorized account. Never prompts and
    /// never reports failures beyond the log.
    pub async fn probe_existing_connection(&self) -> bool {
        let Some(provider) = self.locator.locate() else {
            debug!("no wallet provider present; skipping probe");
            return false;
        };

        let accounts = match provider.authorized_accounts().await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(error = %err, "failed to check wallet connection");
                return false;
            }
        };
        let Some(address) = accounts.into_iter().next() else {
            return false;
        };

        info!(%address, "restored wallet connection");
        *self.active.borrow_mut() = Some(provider);
        self.transition(Connection::connected(address.clone()));
        let _ = self.refresh_balance(&address).await;
        true
    }

    /// Interactive connect. Re-entry while a connect is in flight is ignored.
    pub async fn connect(&self) -> Result<ConnectOutcome, WalletError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("connect already in flight; ignoring");
            return Ok(ConnectOutcome::Ignored);
        };

        match self.try_connect().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(kind = err.kind(), error = %err, "failed to connect wallet");
                self.reset();
                self.publish(SessionNotice::failed(&err));
                Err(err)
            }
        }
    }

    async fn try_connect(&self) -> Result<ConnectOutcome, WalletError> {
        let provider = self
            .locator
            .locate()
            .ok_or_else(|| WalletError::ProviderMissing { install_url: self.install_url.clone() })?;

        self.transition(Connection::Connecting);
        debug!("requesting accounts");
        let accounts = provider.request_accounts().await.map_err(|e| classify(&e))?;
        let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;

        info!(%address, "wallet connected");
        *self.active.borrow_mut() = Some(provider.clone());
        self.transition(Connection::connected(address.clone()));

        let network = self.ensure_network(provider.as_ref()).await;
        let _ = self.refresh_balance(&address).await;
        Ok(ConnectOutcome::Connected { address, network })
    }

    /// Switch to the configured chain, adding it when the wallet lacks it.
    async fn ensure_network(&self, provider: &dyn WalletProvider) -> NetworkSetup {
        let switch_err = match provider.switch_chain(&self.chain).await {
            Ok(()) => return NetworkSetup::Switched,
            Err(err) => err,
        };

        if !switch_err.is_unrecognized_chain() {
            warn!(error = %switch_err, "network switch failed; staying connected");
            return NetworkSetup::Failed(WalletError::NetworkSetup(switch_err.message));
        }

        info!(chain = %self.chain.chain_name, "chain unknown to wallet; adding it");
        match provider.add_chain(&self.chain).await {
            Ok(()) => NetworkSetup::Added,
            Err(err) => {
                warn!(error = %err, chain = %self.chain.chain_name, "failed to add chain; staying connected");
                NetworkSetup::Failed(WalletError::NetworkSetup(format!("failed to add {}: {}", self.chain.chain_name, err.message)))
            }
        }
    }

    /// Local reset only; injected wallets have no programmatic revoke.
    pub fn disconnect(&self) {
        info!("wallet disconnected");
        self.reset();
    }

    /// Query the native balance. Failure zeroes the balance but keeps the
    /// connection status.
    pub async fn refresh_balance(&self, address: &str) -> Result<String, WalletError> {
        let Some(provider) = self.provider() else {
            return Err(WalletError::ProviderMissing { install_url: self.install_url.clone() });
        };

        let result = provider
            .balance(address)
            .await
            .map(|wei| format_units(wei, self.chain.native_currency.decimals))
            .map_err(|err| {
                warn!(error = %err, %address, "failed to fetch balance");
                WalletError::BalanceQuery(err.message)
            });

        let balance = result.clone().unwrap_or_else(|_| ZERO_BALANCE.to_string());
        let current = self.state.borrow().clone();
        match current {
            // Account may have changed while the query was pending. Wallets
            // mix checksum and lowercase forms of the same address.
            Connection::Connected { address: current, .. } if current.eq_ignore_ascii_case(address) => {
                self.transition(Connection::Connected { address: current, balance });
            }
            _ => debug!(%address, "dropping balance for inactive account"),
        }
        result
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Attach to provider events. A previous subscription is released first.
    pub fn subscribe_events(&self) -> Option<mpsc::UnboundedReceiver<ProviderEvent>> {
        let provider = self.locator.locate()?;
        match provider.subscribe() {
            Ok(stream) => {
                if let Some(old) = self.subscription.borrow_mut().replace(stream.subscription) {
                    old.release();
                }
                Some(stream.events)
            }
            Err(err) => {
                warn!(error = %err, "failed to subscribe to wallet events");
                None
            }
        }
    }

    /// Apply events in arrival order until the subscription goes away.
    pub async fn run_events(&self, mut events: mpsc::UnboundedReceiver<ProviderEvent>) {
        while let Some(event) = events.next().await {
            self.handle_event(event).await;
        }
        debug!("wallet event stream closed");
    }

    pub async fn handle_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    info!("wallet reported no accounts; disconnecting");
                    self.reset();
                }
                Some(address) => {
                    info!(%address, "wallet account changed");
                    if let Some(provider) = self.locator.locate() {
                        *self.active.borrow_mut() = Some(provider);
                    }
                    self.transition(Connection::connected(address.clone()));
                    let _ = self.refresh_balance(&address).await;
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                let on_target = self.chain.is_chain(&chain_id);
                info!(%chain_id, on_target, "wallet chain changed; requesting reload");
                self.publish(SessionNotice::ReloadRequested { chain_id });
            }
        }
    }

    /// Release provider listeners. Safe to call more than once.
    pub fn teardown(&self) {
        if let Some(subscription) = self.subscription.borrow_mut().take() {
            debug!("releasing wallet event subscription");
            subscription.release();
        }
    }

    pub fn is_subscribed(&self) -> bool { self.subscription.borrow().is_some() }
}

impl Drop for WalletSession {
    fn drop(&mut self) { self.teardown(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MemoryProvider, NoProvider, ProviderError};
    use futures::executor::block_on;

    const ALICE: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn missing_provider_is_reported_with_install_url() {
        let session = WalletSession::new(NoProvider, ChainConfig::default()).with_install_url("https://example.test/install");
        let err = block_on(session.connect()).unwrap_err();
        assert_eq!(err, WalletError::ProviderMissing { install_url: "https://example.test/install".into() });
        assert_eq!(session.snapshot(), SessionSnapshot::default());
        assert!(!session.is_connecting());
    }

    #[test]
    fn stale_balance_is_dropped() {
        let provider = MemoryProvider::new().with_balance(ALICE, 5);
        let session = WalletSession::new(provider, ChainConfig::default());
        let balance = block_on(session.refresh_balance(ALICE)).unwrap();
        assert_eq!(balance, "0.000000000000000005");
        assert_eq!(session.snapshot(), SessionSnapshot::default());
    }

    #[test]
    fn balance_failure_keeps_status() {
        let provider = MemoryProvider::new()
            .with_accounts([ALICE])
            .failing_balance(ProviderError::internal("rpc down"));
        let session = WalletSession::new(provider, ChainConfig::default());
        block_on(session.connect()).unwrap();

        let err = block_on(session.refresh_balance(ALICE)).unwrap_err();
        assert_eq!(err, WalletError::BalanceQuery("rpc down".into()));
        assert!(session.snapshot().is_connected());
        assert_eq!(session.balance(), "0");
    }
}
