use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::controller::ChatController;
use super::gateway::{response_or_fallback, GradingGateway};
use super::message::{FileRef, Message};
use super::store::MemoryStore;
use crate::error::GatewayError;
use crate::reveal::wasm::{config_from_js, TickView};

fn to_js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Gateway backed by a JS function `(context: string) => Promise<string>`
pub struct JsGateway {
    submit: Function,
}

impl JsGateway {
    pub fn new(submit: Function) -> Self {
        Self { submit }
    }
}

impl GradingGateway for JsGateway {
    async fn submit(&self, context: &str) -> Result<String, GatewayError> {
        let returned = self
            .submit
            .call1(&JsValue::NULL, &JsValue::from_str(context))
            .map_err(|e| GatewayError::Js(format!("{:?}", e)))?;
        // Plain strings are accepted as well as promises
        let settled = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| GatewayError::Network(format!("{:?}", e)))?;
        settled.as_string().ok_or(GatewayError::EmptyResponse)
    }
}

/// Call a JS grader function; on rejection resolve to the fallback text
/// instead. Never rejects.
#[wasm_bindgen(js_name = gradeWithFallback)]
pub async fn grade_with_fallback(gateway: Function, context: String, fallback: String) -> String {
    let gateway = JsGateway::new(gateway);
    response_or_fallback(gateway.submit(&context).await, &fallback)
}

/// Chat view for one session, with an in-memory log.
///
/// # Example (TypeScript)
/// ```typescript
/// const chat = new TutorChat(sessionId, storedMessages, {});
/// const context = chat.beginTurn(input, files, null);
/// try {
///   chat.receiveResponse(await grade(context));
/// } catch (e) {
///   chat.receiveFailure(String(e));
/// }
/// const timer = setInterval(() => {
///   const tick = chat.tick();
///   render(tick);
///   if (tick.kind === "done") { persist(chat.lastMessage()); clearInterval(timer); }
/// }, chat.frameIntervalMs());
/// ```
#[wasm_bindgen]
pub struct TutorChat {
    inner: ChatController<MemoryStore>,
}

#[wasm_bindgen]
impl TutorChat {
    /// `history` is an array of stored messages (may be empty/undefined)
    #[wasm_bindgen(constructor)]
    pub fn new(session_id: String, history: JsValue, config: JsValue) -> Result<TutorChat, JsValue> {
        let config = config_from_js(config)?;
        let history: Vec<Message> = if history.is_undefined() || history.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(history)
                .map_err(|e| JsValue::from_str(&format!("Invalid history: {}", e)))?
        };
        let store = MemoryStore::with_history(&session_id, history);
        Ok(Self {
            inner: ChatController::new(config, session_id, store),
        })
    }

    /// Record the user message; returns the context to send to the grader
    #[wasm_bindgen(js_name = beginTurn)]
    pub fn begin_turn(&mut self, input: &str, files: JsValue, extracted_text: Option<String>) -> Result<String, JsValue> {
        let files: Vec<FileRef> = if files.is_undefined() || files.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(files).map_err(|e| {
                web_sys::console::error_1(&format!("[TutorChat] Invalid files: {}", e).into());
                JsValue::from_str(&format!("Invalid files: {}", e))
            })?
        };
        self.inner
            .begin_turn(input, files, extracted_text.as_deref())
            .map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = receiveResponse)]
    pub fn receive_response(&mut self, text: &str) -> Result<usize, JsValue> {
        self.inner.receive_response(text).map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = receiveFailure)]
    pub fn receive_failure(&mut self, reason: &str) -> Result<usize, JsValue> {
        self.inner
            .receive_failure(&GatewayError::Network(reason.to_string()))
            .map_err(to_js_err)
    }

    #[wasm_bindgen(js_name = extractionFailed)]
    pub fn extraction_failed(&mut self) -> Result<usize, JsValue> {
        self.inner.receive_extraction_failure().map_err(to_js_err)
    }

    #[wasm_bindgen]
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let tick = self.inner.tick();
        TickView::from_tick(&tick, self.inner.scheduler().revealed()).to_js()
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.inner.stop();
        TickView::from_stop(&outcome).to_js()
    }

    /// Messages to display, greeting included for an empty session
    #[wasm_bindgen]
    pub fn transcript(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.transcript()).map_err(to_js_err)
    }

    /// Most recently committed message, for the host to persist
    #[wasm_bindgen(js_name = lastMessage)]
    pub fn last_message(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.history().last()).map_err(to_js_err)
    }

    /// The session's stored messages as a JSON array string
    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.inner
            .store()
            .session_json(self.inner.session_id())
            .map_err(to_js_err)
    }

    /// New chat: stop typing and drop the session's messages
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen]
    pub fn title(&self) -> Option<String> {
        self.inner.title()
    }

    #[wasm_bindgen(js_name = isTyping)]
    pub fn is_typing(&self) -> bool {
        self.inner.is_typing()
    }

    #[wasm_bindgen(js_name = frameIntervalMs)]
    pub fn frame_interval_ms(&self) -> u32 {
        self.inner.scheduler().frame_interval_ms()
    }
}
