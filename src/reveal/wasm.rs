use std::cell::{Cell, RefCell};

use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::TutorConfig;
use crate::reveal::scheduler::{RevelationScheduler, StopOutcome, Tick};

/// What `tick()` and `stop()` hand back to JavaScript
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum TickView<'a> {
    Idle,
    Frame { text: &'a str, atomic: bool },
    Done { content: &'a str },
    Stopped { content: Option<&'a str> },
}

impl<'a> TickView<'a> {
    pub(crate) fn from_tick(tick: &'a Tick, revealed: &'a str) -> Self {
        match tick {
            Tick::Idle => TickView::Idle,
            Tick::Frame { atomic, .. } => TickView::Frame {
                text: revealed,
                atomic: *atomic,
            },
            Tick::Done(message) => TickView::Done {
                content: &message.content,
            },
        }
    }

    pub(crate) fn from_stop(outcome: &'a StopOutcome) -> Self {
        match outcome {
            StopOutcome::Interrupted(message) => TickView::Stopped {
                content: message.as_ref().map(|m| m.content.as_str()),
            },
            StopOutcome::NotRunning(_) => TickView::Idle,
        }
    }

    pub(crate) fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Parse an optional JS config object; `undefined`/`null` means defaults
pub(crate) fn config_from_js(config: JsValue) -> Result<TutorConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(TutorConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))
}

/// JS callbacks registered through `subscribe`
#[derive(Clone)]
struct JsCallbacks {
    on_frame: Option<Function>,
    on_finish: Option<Function>,
}

/// Notification captured while the scheduler is borrowed, delivered after
enum Notice {
    Frame { text: String, atomic: bool },
    Finish { status: &'static str, content: Option<String> },
}

impl Notice {
    fn from_tick(tick: &Tick, revealed: &str) -> Option<Self> {
        match tick {
            Tick::Idle => None,
            Tick::Frame { atomic, .. } => Some(Notice::Frame {
                text: revealed.to_string(),
                atomic: *atomic,
            }),
            Tick::Done(message) => Some(Notice::Finish {
                status: "completed",
                content: Some(message.content.clone()),
            }),
        }
    }

    fn from_stop(outcome: &StopOutcome) -> Option<Self> {
        match outcome {
            StopOutcome::Interrupted(message) => Some(Notice::Finish {
                status: "stopped",
                content: message.as_ref().map(|m| m.content.clone()),
            }),
            StopOutcome::NotRunning(_) => None,
        }
    }
}

impl JsCallbacks {
    fn deliver(&self, notice: &Notice) {
        let (callback, first, second, what) = match notice {
            Notice::Frame { text, atomic } => (
                &self.on_frame,
                JsValue::from_str(text),
                JsValue::from_bool(*atomic),
                "frame",
            ),
            Notice::Finish { status, content } => (
                &self.on_finish,
                JsValue::from_str(status),
                content.as_deref().map_or(JsValue::NULL, JsValue::from_str),
                "finish",
            ),
        };
        if let Some(callback) = callback {
            if let Err(e) = callback.call2(&JsValue::NULL, &first, &second) {
                web_sys::console::error_1(&format!("[TypingEngine] {} callback failed: {:?}", what, e).into());
            }
        }
    }
}

/// Typing effect for one conversation view.
///
/// Callbacks run after the engine has finished its own update, so a
/// callback may call `stop()`, `tick()` or `subscribe()` on the same engine.
///
/// # Example (TypeScript)
/// ```typescript
/// const engine = new TypingEngine();
/// engine.subscribe((text, atomic) => render(text), (status, content) => save(content));
/// engine.start(response);
/// const timer = setInterval(() => {
///   if (engine.tick().kind === "done") clearInterval(timer);
/// }, engine.frameIntervalMs());
/// ```
#[wasm_bindgen]
pub struct TypingEngine {
    inner: RefCell<RevelationScheduler>,
    callbacks: RefCell<Vec<(u32, JsCallbacks)>>,
    next_subscription: Cell<u32>,
}

impl TypingEngine {
    fn dispatch(&self, notice: Option<Notice>) {
        let Some(notice) = notice else {
            return;
        };
        // Snapshot so callbacks can (un)subscribe while being called
        let callbacks: Vec<JsCallbacks> = self.callbacks.borrow().iter().map(|(_, c)| c.clone()).collect();
        for callback in &callbacks {
            callback.deliver(&notice);
        }
    }
}

#[wasm_bindgen]
impl TypingEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TypingEngine, JsValue> {
        let config = config_from_js(config)?;
        Ok(Self {
            inner: RefCell::new(RevelationScheduler::new(&config)),
            callbacks: RefCell::new(Vec::new()),
            next_subscription: Cell::new(1),
        })
    }

    /// Start revealing a response. Returns the number of reveal units.
    #[wasm_bindgen]
    pub fn start(&self, text: &str) -> Result<usize, JsValue> {
        self.inner
            .borrow_mut()
            .start(text)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Advance one frame. Returns { kind: "idle" | "frame" | "done", ... }
    #[wasm_bindgen]
    pub fn tick(&self) -> Result<JsValue, JsValue> {
        let (view, notice) = {
            let mut inner = self.inner.borrow_mut();
            let tick = inner.tick();
            let view = TickView::from_tick(&tick, inner.revealed()).to_js()?;
            (view, Notice::from_tick(&tick, inner.revealed()))
        };
        self.dispatch(notice);
        Ok(view)
    }

    /// Stop typing. Returns { kind: "stopped", content } or { kind: "idle" }
    #[wasm_bindgen]
    pub fn stop(&self) -> Result<JsValue, JsValue> {
        let outcome = self.inner.borrow_mut().stop();
        let view = TickView::from_stop(&outcome).to_js()?;
        self.dispatch(Notice::from_stop(&outcome));
        Ok(view)
    }

    /// Register callbacks: onFrame(text, atomic), onFinish(status, content)
    #[wasm_bindgen]
    pub fn subscribe(&self, on_frame: Option<Function>, on_finish: Option<Function>) -> u32 {
        let id = self.next_subscription.get();
        self.next_subscription.set(id + 1);
        self.callbacks
            .borrow_mut()
            .push((id, JsCallbacks { on_frame, on_finish }));
        id
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&self, id: u32) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(sid, _)| *sid != id);
        callbacks.len() != before
    }

    #[wasm_bindgen]
    pub fn revealed(&self) -> String {
        self.inner.borrow().revealed().to_string()
    }

    #[wasm_bindgen]
    pub fn status(&self) -> String {
        self.inner.borrow().status().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isTyping)]
    pub fn is_typing(&self) -> bool {
        self.inner.borrow().is_running()
    }

    #[wasm_bindgen(js_name = frameIntervalMs)]
    pub fn frame_interval_ms(&self) -> u32 {
        self.inner.borrow().frame_interval_ms()
    }
}
