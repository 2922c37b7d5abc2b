//! Provider - the injected wallet capability
//!
//! # Architecture
//!
//! ```text
//! WalletSession
//!     │  locate() on every operation
//!     ▼
//! ProviderLocator ──► Option<Rc<dyn WalletProvider>>
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!          ▼                                       ▼
//!   InjectedProvider (wasm)               MemoryProvider (scripted)
//!   window.ethereum.request()             tests + CLI simulator
//! ```
//!
//! Events flow back through `subscribe()`: the provider pushes
//! `ProviderEvent`s into an unbounded channel until the returned
//! `Subscription` is dropped.

mod error;
mod memory;

pub use error::{classify, ProviderError, ProviderResult, WalletError};
pub use memory::MemoryProvider;

use crate::core::ChainConfig;
use async_trait::async_trait;
use futures::channel::mpsc;
use std::fmt;
use std::rc::Rc;

/// Notifications emitted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
}

/// EIP-1193 subset the session relies on. Single-threaded by nature.
#[async_trait(?Send)]
pub trait WalletProvider {
    /// Interactive: may prompt the user.
    async fn request_accounts(&self) -> ProviderResult<Vec<String>>;
    /// Non-interactive: accounts already authorized for this origin.
    async fn authorized_accounts(&self) -> ProviderResult<Vec<String>>;
    /// Native balance in smallest units.
    async fn balance(&self, address: &str) -> ProviderResult<u128>;
    async fn switch_chain(&self, chain: &ChainConfig) -> ProviderResult<()>;
    async fn add_chain(&self, chain: &ChainConfig) -> ProviderResult<()>;
    /// Attach listeners for account and chain changes.
    fn subscribe(&self) -> ProviderResult<EventStream>;
}

/// Capability check, evaluated lazily (extensions may inject late).
pub trait ProviderLocator {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>>;
}

impl ProviderLocator for Option<Rc<dyn WalletProvider>> {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>> { self.clone() }
}

/// Environment without any wallet extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProvider;

impl ProviderLocator for NoProvider {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>> { None }
}

/// Live event feed plus the handle that keeps it attached.
pub struct EventStream {
    pub subscription: Subscription,
    pub events: mpsc::UnboundedReceiver<ProviderEvent>,
}

/// Disposable listener registration. Dropping it detaches the listeners.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self { release: Some(Box::new(release)) }
    }

    pub fn release(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    /// One handle for both registrations; releasing it releases `self` first.
    pub fn and(mut self, mut other: Subscription) -> Subscription {
        let first = self.release.take();
        let second = other.release.take();
        Subscription::new(move || {
            first.into_iter().chain(second).for_each(|release| release());
        })
    }
}

/// Account list from an `accountsChanged` payload. `None` when the payload is
/// not a list of strings; that is malformed, not a revoke.
pub fn parse_accounts(payload: serde_json::Value) -> Option<Vec<String>> {
    serde_json::from_value(payload).ok()
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("attached", &self.release.is_some()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscription_releases_once() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let sub = Subscription::new(move || counter.set(counter.get() + 1));
        sub.release();
        assert_eq!(released.get(), 1);

        let counter = released.clone();
        drop(Subscription::new(move || counter.set(counter.get() + 1)));
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn combined_subscription_releases_both_in_order() {
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let (a, b) = (log.clone(), log.clone());
        let combined = Subscription::new(move || a.borrow_mut().push("accounts"))
            .and(Subscription::new(move || b.borrow_mut().push("chain")));
        assert!(log.borrow().is_empty());

        drop(combined);
        assert_eq!(*log.borrow(), vec!["accounts", "chain"]);
    }

    #[test]
    fn failed_second_registration_rolls_back_first() {
        let released = Rc::new(Cell::new(0));
        let counter = released.clone();
        let attach = |ok: bool| -> ProviderResult<Subscription> {
            if ok { Ok(Subscription::new(|| {})) } else { Err(ProviderError::internal("on() failed")) }
        };

        let result = (|| -> ProviderResult<Subscription> {
            let first = Subscription::new(move || counter.set(counter.get() + 1));
            let second = attach(false)?;
            Ok(first.and(second))
        })();
        assert!(result.is_err());
        assert_eq!(released.get(), 1);
        assert!(attach(true).is_ok());
    }

    #[test]
    fn malformed_accounts_payload_is_not_a_revoke() {
        use serde_json::json;
        assert_eq!(parse_accounts(json!([])), Some(Vec::new()));
        assert_eq!(parse_accounts(json!(["0xabc"])), Some(vec!["0xabc".to_string()]));
        assert_eq!(parse_accounts(json!("0xabc")), None);
        assert_eq!(parse_accounts(json!([1, 2])), None);
        assert_eq!(parse_accounts(json!(null)), None);
    }

    #[test]
    fn no_provider_locates_nothing() {
        assert!(NoProvider.locate().is_none());
        let none: Option<Rc<dyn WalletProvider>> = None;
        assert!(none.locate().is_none());
    }
}
