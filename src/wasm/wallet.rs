//! BlockLearnWallet: the wallet session exposed to JavaScript
//!
//! Connect failures resolve (never reject) with `{outcome: "failed", error}`
//! so the page decides how to show them.

use super::provider::InjectedLocator;
use super::{js_error, log, to_js};
use crate::config::AppConfig;
use crate::core::{short_address, Listeners};
use crate::provider::WalletError;
use crate::session::{ConnectOutcome, NetworkSetup, SessionNotice, WalletSession};
use futures::StreamExt;
use js_sys::{Function, Promise};
use serde_json::{json, Value};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

fn network_json(network: &NetworkSetup) -> Value {
    match network {
        NetworkSetup::Switched => json!({"status": "switched"}),
        NetworkSetup::Added => json!({"status": "added"}),
        NetworkSetup::Failed(err) => json!({"status": "failed", "message": err.to_string()}),
    }
}

async fn connect_result(session: &WalletSession) -> Value {
    match session.connect().await {
        Ok(ConnectOutcome::Connected { address, network }) => {
            json!({"outcome": "connected", "address": address, "network": network_json(&network)})
        }
        Ok(ConnectOutcome::Ignored) => json!({"outcome": "ignored"}),
        Err(err) => {
            log!("[BlockLearnWallet] connect failed: {}", err);
            let mut value = json!({
                "outcome": "failed",
                "error": {"kind": err.kind(), "message": err.user_message(), "recoverable": err.is_recoverable()}
            });
            if let WalletError::ProviderMissing { install_url } = &err {
                value["error"]["installUrl"] = json!(install_url);
            }
            value
        }
    }
}

fn reload_page() {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().reload() {
            log!("[BlockLearnWallet] reload failed: {:?}", err);
        }
    }
}

#[wasm_bindgen]
pub struct BlockLearnWallet {
    session: Rc<WalletSession>,
    listeners: Rc<Listeners<Function>>,
}

#[wasm_bindgen]
impl BlockLearnWallet {
    /// Create a session; `config` is an optional partial AppConfig object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BlockLearnWallet, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            AppConfig::default()
        } else {
            let config: AppConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
            config.validate().map_err(js_error)?;
            config
        };
        log!("[BlockLearnWallet] target chain {} ({})", config.chain.chain_name, config.chain.chain_id);

        let session = Rc::new(WalletSession::from_config(InjectedLocator, &config));
        let listeners: Rc<Listeners<Function>> = Rc::new(Listeners::new());

        // Forward notices to JS callbacks; chain changes reload the tab.
        let mut notices = session.watch();
        let forward = listeners.clone();
        spawn_local(async move {
            while let Some(notice) = notices.next().await {
                if let Ok(js) = to_js(&notice) {
                    for callback in forward.snapshot() {
                        let _ = callback.call1(&JsValue::NULL, &js);
                    }
                }
                if matches!(notice, SessionNotice::ReloadRequested { .. }) {
                    reload_page();
                }
            }
        });

        Ok(Self { session, listeners })
    }

    /// Subscribe to provider events and restore an authorized account.
    /// Resolves to whether an account was restored.
    #[wasm_bindgen]
    pub fn start(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move {
            if let Some(events) = session.subscribe_events() {
                let runner = session.clone();
                spawn_local(async move { runner.run_events(events).await });
            }
            Ok(JsValue::from_bool(session.probe_existing_connection().await))
        })
    }

    #[wasm_bindgen]
    pub fn connect(&self) -> Promise {
        let session = self.session.clone();
        future_to_promise(async move { to_js(&connect_result(&session).await) })
    }

    #[wasm_bindgen]
    pub fn disconnect(&self) {
        self.session.disconnect();
    }

    /// Release provider listeners (component teardown).
    #[wasm_bindgen]
    pub fn stop(&self) {
        self.session.teardown();
    }

    /// Register a callback for notices (`{type: "status" | "failed" | "reload_requested", ...}`).
    #[wasm_bindgen(js_name = "onNotice")]
    pub fn on_notice(&self, callback: Function) {
        self.listeners.register(callback);
    }

    #[wasm_bindgen(getter, js_name = "isConnected")]
    pub fn is_connected(&self) -> bool {
        self.session.snapshot().is_connected()
    }

    #[wasm_bindgen(getter, js_name = "isConnecting")]
    pub fn is_connecting(&self) -> bool {
        self.session.is_connecting()
    }

    #[wasm_bindgen(getter)]
    pub fn address(&self) -> Option<String> {
        self.session.address()
    }

    /// `0x1234...abcd` for the header button.
    #[wasm_bindgen(getter, js_name = "shortAddress")]
    pub fn short_address(&self) -> Option<String> {
        self.session.address().map(|a| short_address(&a))
    }

    #[wasm_bindgen(getter)]
    pub fn balance(&self) -> String {
        self.session.balance()
    }

    /// Block explorer page for the connected account.
    #[wasm_bindgen(getter, js_name = "explorerUrl")]
    pub fn explorer_url(&self) -> Option<String> {
        let address = self.session.address()?;
        self.session.chain().explorer_address_url(&address)
    }

    /// `{status, address, balance}`
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.snapshot())
    }

    /// Chain descriptor, as handed to `wallet_addEthereumChain`.
    #[wasm_bindgen]
    pub fn chain(&self) -> Result<JsValue, JsValue> {
        to_js(self.session.chain())
    }
}

/// `free()` from JS. The event loop holds its own session handle, so the
/// listeners must be released here or they outlive the wallet.
impl Drop for BlockLearnWallet {
    fn drop(&mut self) {
        self.session.teardown();
    }
}
