/// Error kinds shared by all extension contexts

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Substring the browser puts in errors raised after the extension reloads
pub const CONTEXT_INVALIDATED_SIGNATURE: &str = "Extension context invalidated";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("extension context invalidated")]
    ContextInvalidated,

    #[error("no active tab")]
    NoActiveTab,

    #[error("message timed out")]
    MessageTimeout,

    #[error("message delivery failed: {0}")]
    MessageDelivery(String),

    #[error("clipboard write denied: {0}")]
    ClipboardDenied(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ExtensionError {
    /// Short text suitable for an on-screen notification
    pub fn user_message(&self) -> String {
        match self {
            ExtensionError::ContextInvalidated => {
                "Extension was reloaded, please refresh the page".to_string()
            }
            ExtensionError::NoActiveTab => {
                "No active tab found, please refresh the page".to_string()
            }
            ExtensionError::MessageTimeout => "Connection timed out".to_string(),
            ExtensionError::MessageDelivery(reason) => {
                format!("Could not reach the page: {}", reason)
            }
            ExtensionError::ClipboardDenied(_) => "Copy failed, please copy manually".to_string(),
            ExtensionError::Storage(reason) => format!("Storage unavailable: {}", reason),
            ExtensionError::Serialization(reason) => format!("Unexpected data: {}", reason),
        }
    }

    /// Classify a rejected bridge call as a delivery failure, unless the
    /// browser says the extension context is gone.
    pub fn delivery(err: JsValue) -> Self {
        let message = js_error_message(&err);
        if is_context_invalidated(&message) {
            ExtensionError::ContextInvalidated
        } else {
            ExtensionError::MessageDelivery(message)
        }
    }

    pub fn storage(err: JsValue) -> Self {
        let message = js_error_message(&err);
        if is_context_invalidated(&message) {
            ExtensionError::ContextInvalidated
        } else {
            ExtensionError::Storage(message)
        }
    }

    pub fn clipboard(err: JsValue) -> Self {
        ExtensionError::ClipboardDenied(js_error_message(&err))
    }
}

impl From<serde_wasm_bindgen::Error> for ExtensionError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        ExtensionError::Serialization(err.to_string())
    }
}

pub fn is_context_invalidated(message: &str) -> bool {
    message.contains(CONTEXT_INVALIDATED_SIGNATURE)
}

/// Best-effort human-readable text from a thrown JS value
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}
