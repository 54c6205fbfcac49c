/// Transient on-page notifications

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

use crate::config::NOTIFICATION_MS;
use crate::error::ExtensionError;
use crate::history::RecordOutcome;
use crate::timer;

const NOTIFICATION_CSS: &str = "position: fixed; top: 20px; left: 50%; transform: translateX(-50%); \
    background: rgba(0, 0, 0, 0.8); color: white; padding: 8px 16px; border-radius: 4px; \
    z-index: 10000; font-size: 14px; pointer-events: none;";

pub const RELOAD_NOTICE: &str = "The extension was updated, please refresh the page to keep using it";

/// Shows one notification at a time; a newer one replaces the older.
#[derive(Clone)]
pub struct Notifier {
    document: Document,
    current: Rc<RefCell<Option<HtmlElement>>>,
    reload_notice_shown: Rc<Cell<bool>>,
}

impl Notifier {
    pub fn new(document: Document) -> Self {
        Notifier {
            document,
            current: Rc::new(RefCell::new(None)),
            reload_notice_shown: Rc::new(Cell::new(false)),
        }
    }

    pub fn show(&self, message: &str) {
        if let Err(e) = self.try_show(message) {
            warn!("Failed to show notification {:?}: {:?}", message, e);
        }
    }

    /// The context-invalidated notice is shown at most once per page
    pub fn show_reload_notice(&self) {
        if !self.reload_notice_shown.replace(true) {
            self.show(RELOAD_NOTICE);
        }
    }

    fn try_show(&self, message: &str) -> Result<(), JsValue> {
        if let Some(previous) = self.current.borrow_mut().take() {
            previous.remove();
        }

        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        let notification: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        notification.style().set_css_text(NOTIFICATION_CSS);
        notification.set_text_content(Some(message));
        body.append_child(&notification)?;
        *self.current.borrow_mut() = Some(notification.clone());

        let current = Rc::clone(&self.current);
        timer::run_after(NOTIFICATION_MS, move || {
            let mut current = current.borrow_mut();
            if current.as_ref() == Some(&notification) {
                notification.remove();
                *current = None;
            }
        });
        Ok(())
    }
}

/// Text shown after a click on a video link
pub fn copy_feedback(
    bv: &str,
    saved: &Result<RecordOutcome, ExtensionError>,
    copied: &Result<(), ExtensionError>,
) -> String {
    match (copied, saved) {
        (Err(e), _) => format!("Failed to copy {}: {}", bv, e.user_message()),
        (Ok(()), Ok(_)) => format!("Copied BV: {}", bv),
        (Ok(()), Err(_)) => format!("Copied BV: {} (not saved to history)", bv),
    }
}

/// Text shown after the popup asks to strip marks
pub fn clear_feedback(result: &Result<(), JsValue>) -> &'static str {
    match result {
        Ok(()) => "All marks cleared",
        Err(_) => "Failed to clear marks, please refresh the page",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_feedback_success() {
        let msg = copy_feedback("BV1xx411c7mD", &Ok(RecordOutcome::Added), &Ok(()));
        assert_eq!(msg, "Copied BV: BV1xx411c7mD");

        let msg = copy_feedback("BV1xx411c7mD", &Ok(RecordOutcome::AlreadyPresent), &Ok(()));
        assert_eq!(msg, "Copied BV: BV1xx411c7mD");
    }

    #[test]
    fn test_copy_feedback_not_saved() {
        let msg = copy_feedback(
            "BV1",
            &Err(ExtensionError::ContextInvalidated),
            &Ok(()),
        );
        assert_eq!(msg, "Copied BV: BV1 (not saved to history)");
    }

    #[test]
    fn test_copy_feedback_clipboard_failure() {
        let msg = copy_feedback(
            "BV1",
            &Ok(RecordOutcome::Added),
            &Err(ExtensionError::ClipboardDenied("NotAllowedError".into())),
        );
        assert!(msg.starts_with("Failed to copy BV1"));
        assert!(msg.contains("copy manually"));
    }

    #[test]
    fn test_clear_feedback() {
        assert_eq!(clear_feedback(&Ok(())), "All marks cleared");
    }
}
