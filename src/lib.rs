/// BV Picker - Chrome Extension that copies BV numbers from video links
/// Built with Rust + WASM + Yew

mod background;
mod bv;
mod chrome;
mod clipboard;
mod config;
pub mod content;
mod error;
mod history;
mod liveness;
mod protocol;
mod timer;
pub mod ui;

use wasm_bindgen::prelude::*;

pub use background::BackgroundWorker;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export identifier extraction for JavaScript access
#[wasm_bindgen]
pub fn extract_bv(url: &str) -> Option<String> {
    bv::extract_bv(url)
}

// Start the background service worker logic; the worker script forwards
// browser events to the returned handle
#[wasm_bindgen]
pub fn start_background() -> BackgroundWorker {
    background::start()
}

// Start the content agent in a web page
#[wasm_bindgen]
pub fn start_content_agent() -> Result<(), JsValue> {
    content::start()
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
