#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// This allows us to access console.log from JS
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log_js(s: &str);
}

/// Write an informational message to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn log(s: &str) {
    console_log_js(s);
}

/// Write a warning to the browser console.
#[cfg(target_arch = "wasm32")]
pub fn warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(s));
}

// Native builds (tests, tooling) have no JS host to call into
#[cfg(not(target_arch = "wasm32"))]
pub fn log(s: &str) {
    eprintln!("{}", s);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(s: &str) {
    eprintln!("warning: {}", s);
}

// Note: The console_log and console_warn macros are defined in lib.rs to avoid duplication
