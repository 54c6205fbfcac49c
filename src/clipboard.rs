/// Clipboard writes with a fallback technique

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

use crate::chrome;
use crate::error::{ExtensionError, js_error_message};

/// Which technique to try first; the other one is the fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOrder {
    /// `navigator.clipboard` first (content pages)
    ApiFirst,
    /// Hidden textarea + `execCommand("copy")` first (popup)
    TextareaFirst,
}

pub async fn copy_text(text: &str, order: CopyOrder) -> Result<(), ExtensionError> {
    match order {
        CopyOrder::ApiFirst => match chrome::clipboard_write(text).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Clipboard API failed, falling back to textarea: {}", e);
                copy_via_textarea(text)
            }
        },
        CopyOrder::TextareaFirst => match copy_via_textarea(text) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Textarea copy failed, falling back to clipboard API: {}", e);
                chrome::clipboard_write(text).await
            }
        },
    }
}

/// Copy through an off-screen textarea, the way pages did before the
/// async clipboard API existed
pub fn copy_via_textarea(text: &str) -> Result<(), ExtensionError> {
    let denied = |e: wasm_bindgen::JsValue| ExtensionError::ClipboardDenied(js_error_message(&e));
    let missing = || ExtensionError::ClipboardDenied("no document".to_string());

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(missing)?;
    let body = document.body().ok_or_else(missing)?;

    let textarea: HtmlTextAreaElement = document
        .create_element("textarea")
        .map_err(denied)?
        .dyn_into()
        .map_err(|_| ExtensionError::ClipboardDenied("not a textarea".to_string()))?;
    textarea.set_value(text);
    let style = textarea.style();
    style.set_property("position", "fixed").map_err(denied)?;
    style.set_property("opacity", "0").map_err(denied)?;

    body.append_child(&textarea).map_err(denied)?;
    textarea.select();
    let copied = document
        .dyn_into::<HtmlDocument>()
        .map_err(|_| ExtensionError::ClipboardDenied("not an HTML document".to_string()))
        .and_then(|html| html.exec_command("copy").map_err(denied));
    textarea.remove();

    match copied? {
        true => Ok(()),
        false => Err(ExtensionError::ClipboardDenied(
            "copy command was refused".to_string(),
        )),
    }
}
