//! Quiz grading and badge claims for the browser

use super::timer::BrowserTimer;
use super::{js_error, to_js};
use crate::config::{DEFAULT_CLAIM_DELAY_MS, DEFAULT_PASS_THRESHOLD};
use crate::learn::{grade, Quiz, QuizResult};
use crate::rewards::ClaimDesk;
use crate::session::SessionSnapshot;
use js_sys::Promise;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Grade `answers` (one option id or null per question) against a quiz.
#[wasm_bindgen(js_name = "gradeQuiz")]
pub fn grade_quiz(quiz: JsValue, answers: JsValue, threshold: Option<u8>) -> Result<JsValue, JsValue> {
    let quiz: Quiz = serde_wasm_bindgen::from_value(quiz).map_err(js_error)?;
    let answers: Vec<Option<String>> = serde_wasm_bindgen::from_value(answers).map_err(js_error)?;
    let result = grade(&quiz, &answers, threshold.unwrap_or(DEFAULT_PASS_THRESHOLD)).map_err(js_error)?;
    to_js(&result)
}

#[wasm_bindgen]
pub struct BadgeDesk {
    desk: Rc<ClaimDesk<BrowserTimer>>,
}

#[wasm_bindgen]
impl BadgeDesk {
    #[wasm_bindgen(constructor)]
    pub fn new(delay_ms: Option<u32>) -> BadgeDesk {
        let delay = delay_ms.map(u64::from).unwrap_or(DEFAULT_CLAIM_DELAY_MS);
        Self { desk: Rc::new(ClaimDesk::new(BrowserTimer, Duration::from_millis(delay))) }
    }

    #[wasm_bindgen(getter, js_name = "isClaiming")]
    pub fn is_claiming(&self) -> bool {
        self.desk.is_claiming()
    }

    /// Claim the badge for a graded result, given `wallet.snapshot()`.
    #[wasm_bindgen]
    pub fn claim(&self, result: JsValue, snapshot: JsValue) -> Result<Promise, JsValue> {
        let result: QuizResult = serde_wasm_bindgen::from_value(result).map_err(js_error)?;
        let snapshot: SessionSnapshot = serde_wasm_bindgen::from_value(snapshot).map_err(js_error)?;
        let desk = self.desk.clone();
        Ok(future_to_promise(async move {
            let claim = desk.claim_badge(&result, &snapshot).await.map_err(js_error)?;
            to_js(&claim)
        }))
    }

    #[wasm_bindgen]
    pub fn claims(&self) -> Result<JsValue, JsValue> {
        to_js(&self.desk.claims())
    }
}
