use wasm_bindgen::prelude::*;

use crate::markdown::{normalize, sanitize, scan, scan_lines};

/// Normalize blank lines and regroup sections
#[wasm_bindgen(js_name = normalizeText)]
pub fn normalize_text(text: &str) -> String {
    normalize(text)
}

/// Repair malformed tables and stray emphasis
#[wasm_bindgen(js_name = sanitizeMarkdown)]
pub fn sanitize_markdown(text: &str) -> String {
    sanitize(text)
}

/// normalize + sanitize, the exact text a reveal session will show
#[wasm_bindgen(js_name = prepareResponse)]
pub fn prepare_response(text: &str) -> String {
    sanitize(&normalize(text))
}

/// Reveal units of prepared text.
/// Returns [{ kind, start, lines: [{ raw_text, category }] }]
#[wasm_bindgen(js_name = scanStructure)]
pub fn scan_structure(text: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&scan(text)).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Per-line categories of prepared text
#[wasm_bindgen(js_name = classifyLines)]
pub fn classify_lines(text: &str) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&scan_lines(text)).map_err(|e| JsValue::from_str(&e.to_string()))
}
