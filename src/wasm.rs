//! WASM bindings for browser-based document conversion.
//!
//! Documents cross the boundary as JSON strings. Presets are given by name.

use wasm_bindgen::prelude::*;

use crate::mdast::{self, EncodeOptions};
use crate::{curvenote, normalize_footnotes};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Convert a curvenote document to mdast.
///
/// Footnotes in the result are numbered canonically.
#[wasm_bindgen(js_name = curvenoteToMdast)]
pub fn curvenote_to_mdast(doc: &str, preset: &str) -> Result<String, JsValue> {
    let doc: serde_json::Value = serde_json::from_str(doc).map_err(js_err)?;
    let tree = curvenote::from_json(&doc, preset).map_err(js_err)?;
    let out = mdast::to_mdast(&tree, &EncodeOptions::new().with_preset(preset)).map_err(js_err)?;
    serde_json::to_string(&normalize_footnotes(out)).map_err(js_err)
}

/// Convert mdast to a curvenote document.
#[wasm_bindgen(js_name = mdastToCurvenote)]
pub fn mdast_to_curvenote(tree: &str, preset: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(tree).map_err(js_err)?;
    let tree = mdast::Node::from_value(value).map_err(js_err)?;
    let doc = mdast::from_mdast(&tree, preset).map_err(js_err)?;
    serde_json::to_string(&curvenote::to_json(&doc)).map_err(js_err)
}

/// Validate a curvenote document against a preset and return it with
/// defaults filled in.
#[wasm_bindgen(js_name = normalizeCurvenote)]
pub fn normalize_curvenote(doc: &str, preset: &str) -> Result<String, JsValue> {
    let doc: serde_json::Value = serde_json::from_str(doc).map_err(js_err)?;
    let tree = curvenote::from_json(&doc, preset).map_err(js_err)?;
    serde_json::to_string(&curvenote::to_json(&tree)).map_err(js_err)
}

/// Renumber footnotes in an mdast tree.
#[wasm_bindgen(js_name = normalizeFootnotes)]
pub fn normalize_mdast_footnotes(tree: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(tree).map_err(js_err)?;
    let tree = mdast::Node::from_value(value).map_err(js_err)?;
    serde_json::to_string(&normalize_footnotes(tree)).map_err(js_err)
}
