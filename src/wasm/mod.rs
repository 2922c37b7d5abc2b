//! WASM module: the wallet session inside a browser tab
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      BlockLearnWallet (JS API)          │
//! │  start, connect, disconnect, stop       │
//! │  isConnected, address, balance          │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │          WalletSession (core)           │
//! │  state machine, notices, event loop     │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   InjectedProvider (window.ethereum)    │
//! │  request(), on(), removeListener()      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! `BadgeDesk` and `gradeQuiz` expose the quiz/reward rules, with
//! `BrowserTimer` (setTimeout) standing in for the mint.

mod learn;
mod provider;
mod timer;
mod wallet;

pub use learn::{grade_quiz, BadgeDesk};
pub use provider::{InjectedLocator, InjectedProvider};
pub use timer::BrowserTimer;
pub use wallet::BlockLearnWallet;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

pub(crate) fn js_error(message: impl ToString) -> JsValue {
    JsValue::from_str(&message.to_string())
}

pub(crate) fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}
