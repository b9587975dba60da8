//! WASM bindings for the section solver
//!
//! Runs the solver in the browser with the same JSON contract as the
//! HTTP server.

use wasm_bindgen::prelude::*;

use crate::request;

// Use wee_alloc for smaller WASM binary
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Solve a section
///
/// Takes a JSON `SolveRequest` and returns a JSON `SolveResponse` with an
/// extra `ms_elapsed` field.
#[wasm_bindgen]
pub fn solve(request_json: &str) -> String {
    let start = js_sys::Date::now();
    let response = request::run_json(request_json);
    let elapsed = (js_sys::Date::now() - start) as u64;

    match serde_json::from_str::<serde_json::Value>(&response) {
        Ok(serde_json::Value::Object(mut map)) => {
            map.insert("ms_elapsed".to_string(), elapsed.into());
            serde_json::Value::Object(map).to_string()
        }
        _ => response,
    }
}

/// Log a message to the browser console
#[wasm_bindgen]
pub fn log_message(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get solver version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
