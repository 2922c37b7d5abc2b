//! MemoryProvider - scripted in-memory wallet
//!
//! Answers every call from a script, records the calls it received and
//! delivers `emit()`ed events to live subscribers in order. Used as the test
//! double for sessions and by the CLI simulator.

use super::{EventStream, ProviderError, ProviderEvent, ProviderLocator, ProviderResult, Subscription, WalletProvider};
use crate::core::rpc::method;
use crate::core::ChainConfig;
use async_trait::async_trait;
use futures::channel::{mpsc, oneshot};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct Script {
    request_accounts: ProviderResult<Vec<String>>,
    authorized_accounts: ProviderResult<Vec<String>>,
    balances: HashMap<String, u128>,
    balance_error: Option<ProviderError>,
    switch_error: Option<ProviderError>,
    add_error: Option<ProviderError>,
    hold: Option<oneshot::Receiver<()>>,
    calls: Vec<String>,
    added_chains: Vec<ChainConfig>,
    subscribers: Vec<(u64, mpsc::UnboundedSender<ProviderEvent>)>,
    next_subscriber: u64,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            request_accounts: Ok(Vec::new()),
            authorized_accounts: Ok(Vec::new()),
            balances: HashMap::new(),
            balance_error: None,
            switch_error: None,
            add_error: None,
            hold: None,
            calls: Vec::new(),
            added_chains: Vec::new(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryProvider {
    script: Rc<RefCell<Script>>,
}

impl MemoryProvider {
    pub fn new() -> Self { Self::default() }

    /// Accounts granted by `eth_requestAccounts`.
    pub fn with_accounts<S: Into<String>>(self, accounts: impl IntoIterator<Item = S>) -> Self {
        self.set_accounts(accounts);
        self
    }

    /// Accounts reported by `eth_accounts` (already authorized).
    pub fn with_authorized<S: Into<String>>(self, accounts: impl IntoIterator<Item = S>) -> Self {
        self.script.borrow_mut().authorized_accounts = Ok(accounts.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_balance(self, address: impl Into<String>, wei: u128) -> Self {
        self.script.borrow_mut().balances.insert(address.into().to_ascii_lowercase(), wei);
        self
    }

    pub fn failing_request_accounts(self, err: ProviderError) -> Self {
        self.script.borrow_mut().request_accounts = Err(err);
        self
    }

    pub fn failing_authorized(self, err: ProviderError) -> Self {
        self.script.borrow_mut().authorized_accounts = Err(err);
        self
    }

    pub fn failing_balance(self, err: ProviderError) -> Self {
        self.script.borrow_mut().balance_error = Some(err);
        self
    }

    pub fn failing_switch(self, err: ProviderError) -> Self {
        self.script.borrow_mut().switch_error = Some(err);
        self
    }

    pub fn failing_add(self, err: ProviderError) -> Self {
        self.script.borrow_mut().add_error = Some(err);
        self
    }

    pub fn set_accounts<S: Into<String>>(&self, accounts: impl IntoIterator<Item = S>) {
        self.script.borrow_mut().request_accounts = Ok(accounts.into_iter().map(Into::into).collect());
    }

    pub fn set_balance(&self, address: impl Into<String>, wei: u128) {
        self.script.borrow_mut().balances.insert(address.into().to_ascii_lowercase(), wei);
    }

    /// Keep the next `eth_requestAccounts` open until the sender fires (or drops).
    pub fn hold_request_accounts(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.borrow_mut().hold = Some(rx);
        tx
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&self, event: ProviderEvent) {
        let mut script = self.script.borrow_mut();
        script.subscribers.retain(|(_, tx)| tx.unbounded_send(event.clone()).is_ok());
    }

    pub fn calls(&self) -> Vec<String> { self.script.borrow().calls.clone() }

    pub fn call_count(&self, method: &str) -> usize {
        self.script.borrow().calls.iter().filter(|c| c.as_str() == method).count()
    }

    pub fn added_chains(&self) -> Vec<ChainConfig> { self.script.borrow().added_chains.clone() }

    pub fn subscriber_count(&self) -> usize { self.script.borrow().subscribers.len() }

    fn record(&self, method: &str) {
        self.script.borrow_mut().calls.push(method.to_string());
    }
}

#[async_trait(?Send)]
impl WalletProvider for MemoryProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<String>> {
        self.record(method::REQUEST_ACCOUNTS);
        let hold = self.script.borrow_mut().hold.take();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        self.script.borrow().request_accounts.clone()
    }

    async fn authorized_accounts(&self) -> ProviderResult<Vec<String>> {
        self.record(method::ACCOUNTS);
        self.script.borrow().authorized_accounts.clone()
    }

    async fn balance(&self, address: &str) -> ProviderResult<u128> {
        self.record(method::GET_BALANCE);
        let script = self.script.borrow();
        match &script.balance_error {
            Some(err) => Err(err.clone()),
            None => Ok(script.balances.get(&address.to_ascii_lowercase()).copied().unwrap_or(0)),
        }
    }

    async fn switch_chain(&self, _chain: &ChainConfig) -> ProviderResult<()> {
        self.record(method::SWITCH_CHAIN);
        match &self.script.borrow().switch_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn add_chain(&self, chain: &ChainConfig) -> ProviderResult<()> {
        self.record(method::ADD_CHAIN);
        let mut script = self.script.borrow_mut();
        script.added_chains.push(chain.clone());
        match &script.add_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> ProviderResult<EventStream> {
        let (tx, rx) = mpsc::unbounded();
        let id = {
            let mut script = self.script.borrow_mut();
            let id = script.next_subscriber;
            script.next_subscriber += 1;
            script.subscribers.push((id, tx));
            id
        };

        let script = Rc::downgrade(&self.script);
        let subscription = Subscription::new(move || {
            if let Some(script) = script.upgrade() {
                script.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
            }
        });
        Ok(EventStream { subscription, events: rx })
    }
}

impl ProviderLocator for MemoryProvider {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>> {
        Some(Rc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::StreamExt;

    #[test]
    fn records_calls_and_answers_from_script() {
        let provider = MemoryProvider::new()
            .with_accounts(["0xAbC"])
            .with_balance("0xabc", 42);

        block_on(async {
            assert_eq!(provider.request_accounts().await.unwrap(), vec!["0xAbC".to_string()]);
            assert_eq!(provider.balance("0xABC").await.unwrap(), 42);
            assert!(provider.authorized_accounts().await.unwrap().is_empty());
        });
        assert_eq!(provider.calls(), vec![method::REQUEST_ACCOUNTS, method::GET_BALANCE, method::ACCOUNTS]);
    }

    #[test]
    fn emit_reaches_live_subscribers_only() {
        let provider = MemoryProvider::new();
        let EventStream { subscription, mut events } = provider.subscribe().unwrap();
        assert_eq!(provider.subscriber_count(), 1);

        provider.emit(ProviderEvent::ChainChanged("0x1".into()));
        drop(subscription);
        assert_eq!(provider.subscriber_count(), 0);
        provider.emit(ProviderEvent::ChainChanged("0x2".into()));

        block_on(async {
            assert_eq!(events.next().await, Some(ProviderEvent::ChainChanged("0x1".into())));
            assert_eq!(events.next().await, None);
        });
    }
}
