//! InjectedProvider - `window.ethereum` behind the WalletProvider trait

use crate::core::rpc::{code, event, method, LATEST};
use crate::core::{parse_quantity, ChainConfig};
use crate::provider::{
    parse_accounts, EventStream, ProviderError, ProviderEvent, ProviderLocator, ProviderResult, Subscription,
    WalletProvider,
};
use super::log;
use async_trait::async_trait;
use futures::channel::mpsc;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::{json, Value};
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// Turn a thrown JS value into a provider error, keeping its `code`.
fn provider_error(value: JsValue) -> ProviderError {
    let code = Reflect::get(&value, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_f64())
        .map(|c| c as i64)
        .unwrap_or(code::INTERNAL);
    let message = Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| value.as_string())
        .unwrap_or_else(|| "unknown provider error".into());
    ProviderError::new(code, message)
}

fn function(target: &JsValue, name: &str) -> ProviderResult<Function> {
    Reflect::get(target, &JsValue::from_str(name))
        .map_err(provider_error)?
        .dyn_into::<Function>()
        .map_err(|_| ProviderError::internal(format!("provider has no {}()", name)))
}

fn listener(target: &JsValue, verb: &str, event: &str, handler: &JsValue) -> ProviderResult<()> {
    function(target, verb)?
        .call2(target, &JsValue::from_str(event), handler)
        .map_err(provider_error)?;
    Ok(())
}

/// Register `handler` for `event`. The returned subscription removes it and
/// frees the closure; dropping it early (a later `on` failed) does the same.
fn attach(ethereum: &JsValue, event: &'static str, handler: Closure<dyn FnMut(JsValue)>) -> ProviderResult<Subscription> {
    listener(ethereum, "on", event, handler.as_ref())?;
    let ethereum = ethereum.clone();
    Ok(Subscription::new(move || {
        // Older providers lack removeListener; the closure is dropped either way.
        let _ = listener(&ethereum, "removeListener", event, handler.as_ref());
        drop(handler);
    }))
}

#[derive(Clone)]
pub struct InjectedProvider {
    ethereum: JsValue,
}

impl InjectedProvider {
    /// `None` when no extension injected `window.ethereum`.
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if ethereum.is_undefined() || ethereum.is_null() {
            return None;
        }
        Some(Self { ethereum })
    }

    async fn request(&self, method: &str, params: Option<Value>) -> ProviderResult<JsValue> {
        debug!(method, "provider request");
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method)).map_err(provider_error)?;
        if let Some(params) = params {
            let params = params
                .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
                .map_err(|e| ProviderError::internal(e.to_string()))?;
            Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(provider_error)?;
        }

        let promise = function(&self.ethereum, "request")?
            .call1(&self.ethereum, &args)
            .map_err(provider_error)?
            .dyn_into::<Promise>()
            .map_err(|_| ProviderError::internal("request() did not return a promise"))?;
        JsFuture::from(promise).await.map_err(provider_error)
    }

    async fn request_list(&self, method: &str) -> ProviderResult<Vec<String>> {
        let value = self.request(method, None).await?;
        if value.is_null() || value.is_undefined() {
            return Ok(Vec::new());
        }
        serde_wasm_bindgen::from_value(value).map_err(|e| ProviderError::internal(e.to_string()))
    }
}

#[async_trait(?Send)]
impl WalletProvider for InjectedProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<String>> {
        self.request_list(method::REQUEST_ACCOUNTS).await
    }

    async fn authorized_accounts(&self) -> ProviderResult<Vec<String>> {
        self.request_list(method::ACCOUNTS).await
    }

    async fn balance(&self, address: &str) -> ProviderResult<u128> {
        let raw = self
            .request(method::GET_BALANCE, Some(json!([address, LATEST])))
            .await?
            .as_string()
            .ok_or_else(|| ProviderError::internal("balance is not a hex string"))?;
        parse_quantity(&raw).map_err(|e| ProviderError::internal(e.to_string()))
    }

    async fn switch_chain(&self, chain: &ChainConfig) -> ProviderResult<()> {
        self.request(method::SWITCH_CHAIN, Some(chain.switch_params())).await?;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainConfig) -> ProviderResult<()> {
        self.request(method::ADD_CHAIN, Some(chain.add_params())).await?;
        Ok(())
    }

    fn subscribe(&self) -> ProviderResult<EventStream> {
        let (tx, rx) = mpsc::unbounded();

        let accounts_tx = tx.clone();
        let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let accounts = serde_wasm_bindgen::from_value::<Value>(value).ok().and_then(parse_accounts);
            match accounts {
                Some(accounts) => {
                    let _ = accounts_tx.unbounded_send(ProviderEvent::AccountsChanged(accounts));
                }
                None => log!("[InjectedProvider] ignoring malformed accountsChanged payload"),
            }
        });
        let on_chain = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let chain_id = value.as_string().unwrap_or_default();
            let _ = tx.unbounded_send(ProviderEvent::ChainChanged(chain_id));
        });

        let accounts = attach(&self.ethereum, event::ACCOUNTS_CHANGED, on_accounts)?;
        let chain = attach(&self.ethereum, event::CHAIN_CHANGED, on_chain)?;
        Ok(EventStream { subscription: accounts.and(chain), events: rx })
    }
}

/// Looks for `window.ethereum` on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectedLocator;

impl ProviderLocator for InjectedLocator {
    fn locate(&self) -> Option<Rc<dyn WalletProvider>> {
        InjectedProvider::from_window().map(|p| Rc::new(p) as Rc<dyn WalletProvider>)
    }
}
