//! WebAssembly bindings for the OSS Alternative Finder engine
//!
//! The extension's service worker keeps the `chrome.*` glue in JS and calls
//! into this module for everything with actual logic: host normalization,
//! dataset resolution, search and settings sanitization. The dataset is
//! installed once per wasm instance and read-only afterwards.

use std::sync::OnceLock;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use web_sys::console;

use oaf_core::dataset::{Alternative, Dataset, MappingEntry};
use oaf_core::host::normalize_host as normalize;
use oaf_core::settings::{Settings, SettingsPatch};
use oaf_core::url::extract_host;

static DATASET: OnceLock<Dataset> = OnceLock::new();

#[wasm_bindgen]
pub fn init(mappings_json: &[u8]) -> Result<(), JsValue> {
    if DATASET.get().is_some() {
        return Err(JsValue::from_str(
            "Already initialized. Reload the worker to reinitialize.",
        ));
    }

    let dataset = Dataset::from_slice(mappings_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to load mappings: {}", e)))?;

    console::log_1(&JsValue::from_str(&format!(
        "oaf-wasm: dataset ready ({} domains)",
        dataset.len()
    )));

    DATASET
        .set(dataset)
        .map_err(|_| JsValue::from_str("Failed to set dataset state"))?;

    Ok(())
}

#[wasm_bindgen]
pub fn is_initialized() -> bool {
    DATASET.get().is_some()
}

#[wasm_bindgen]
pub fn dataset_info() -> JsValue {
    let result = js_sys::Object::new();
    if let Some(dataset) = DATASET.get() {
        let _ = Reflect::set(&result, &"initialized".into(), &JsValue::from(true));
        let _ = Reflect::set(&result, &"domains".into(), &JsValue::from(dataset.len() as u32));
    } else {
        let _ = Reflect::set(&result, &"initialized".into(), &JsValue::from(false));
    }
    result.into()
}

#[wasm_bindgen]
pub fn normalize_host(hostname: &str) -> String {
    normalize(hostname)
}

/// Resolve a hostname against the dataset. Returns the found mapping (with
/// the key it matched under) or `null`.
#[wasm_bindgen]
pub fn resolve_host(hostname: &str) -> JsValue {
    let dataset = match DATASET.get() {
        Some(dataset) => dataset,
        None => return JsValue::NULL,
    };

    match dataset.resolve(hostname) {
        Some(resolved) => found_to_js(resolved.key, resolved.entry).into(),
        None => JsValue::NULL,
    }
}

/// Resolve the hostname of a full URL. Errors on input `new URL` would
/// reject; the caller converts that into its failure response.
#[wasm_bindgen]
pub fn resolve_url(url: &str) -> Result<JsValue, JsValue> {
    let host = extract_host(url).ok_or_else(|| JsValue::from_str("Invalid URL"))?;

    let result = js_sys::Object::new();
    let _ = Reflect::set(&result, &"hostname".into(), &JsValue::from_str(&normalize(host)));
    let _ = Reflect::set(&result, &"found".into(), &resolve_host(host));
    Ok(result.into())
}

/// Substring search over the dataset for the popup. Returns an array of
/// `{ domain, name, category?, alternatives }` objects.
#[wasm_bindgen]
pub fn search(query: &str, limit: usize) -> JsValue {
    let results = js_sys::Array::new();
    let dataset = match DATASET.get() {
        Some(dataset) => dataset,
        None => return results.into(),
    };

    for hit in dataset.search(query, limit) {
        let obj = entry_to_js(hit.entry);
        let _ = Reflect::set(&obj, &"domain".into(), &JsValue::from_str(hit.domain));
        results.push(&obj.into());
    }
    results.into()
}

/// Sanitize a raw settings patch from the options page. Always returns a
/// full `{ bannerEnabled, bannerMaxItems }` record.
#[wasm_bindgen]
pub fn sanitize_settings(patch: JsValue) -> JsValue {
    let patch = SettingsPatch {
        banner_enabled: get_field(&patch, "bannerEnabled"),
        banner_max_items: get_field(&patch, "bannerMaxItems"),
    };
    let safe = Settings::sanitize(&patch);

    let result = js_sys::Object::new();
    let _ = Reflect::set(&result, &"bannerEnabled".into(), &JsValue::from(safe.banner_enabled));
    let _ = Reflect::set(&result, &"bannerMaxItems".into(), &JsValue::from(safe.banner_max_items));
    result.into()
}

fn get_field(value: &JsValue, name: &str) -> Option<serde_json::Value> {
    let field = Reflect::get(value, &name.into()).ok()?;
    if field.is_undefined() {
        return None;
    }
    Some(jsvalue_to_json(&field))
}

/// Map a JS value onto JSON so the core's coercion rules apply unchanged.
/// Arrays and objects only matter for truthiness, so their contents are
/// dropped.
fn jsvalue_to_json(value: &JsValue) -> serde_json::Value {
    if value.is_null() || value.is_undefined() {
        serde_json::Value::Null
    } else if let Some(b) = value.as_bool() {
        serde_json::Value::Bool(b)
    } else if let Some(n) = value.as_f64() {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    } else if let Some(s) = value.as_string() {
        serde_json::Value::String(s)
    } else if js_sys::Array::is_array(value) {
        serde_json::Value::Array(Vec::new())
    } else {
        serde_json::Value::Object(serde_json::Map::new())
    }
}

fn found_to_js(key: &str, entry: &MappingEntry) -> js_sys::Object {
    let obj = entry_to_js(entry);
    let _ = Reflect::set(&obj, &"key".into(), &JsValue::from_str(key));
    obj
}

fn entry_to_js(entry: &MappingEntry) -> js_sys::Object {
    let obj = js_sys::Object::new();
    let _ = Reflect::set(&obj, &"name".into(), &JsValue::from_str(&entry.name));
    if let Some(category) = &entry.category {
        let _ = Reflect::set(&obj, &"category".into(), &JsValue::from_str(category));
    }

    let alternatives = js_sys::Array::new();
    for alt in &entry.alternatives {
        alternatives.push(&alternative_to_js(alt).into());
    }
    let _ = Reflect::set(&obj, &"alternatives".into(), &alternatives);
    obj
}

fn alternative_to_js(alt: &Alternative) -> js_sys::Object {
    let obj = js_sys::Object::new();
    let _ = Reflect::set(&obj, &"name".into(), &JsValue::from_str(&alt.name));
    let _ = Reflect::set(&obj, &"url".into(), &JsValue::from_str(&alt.url));

    let tags = js_sys::Array::new();
    for tag in &alt.tags {
        tags.push(&JsValue::from_str(tag));
    }
    let _ = Reflect::set(&obj, &"tags".into(), &tags);

    if let Some(notes) = &alt.notes {
        let _ = Reflect::set(&obj, &"notes".into(), &JsValue::from_str(notes));
    }
    obj
}
