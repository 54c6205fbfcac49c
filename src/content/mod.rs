/// Content agent injected into video listing pages
///
/// Owns the extraction mode and the page decorations. Storage holds the
/// mode flag and history; everything drawn here can be rebuilt from it.

pub mod marks;
pub mod mode;
pub mod notify;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, ErrorEvent, Event, HtmlAnchorElement, MouseEvent, MutationObserver,
    MutationObserverInit,
};

use crate::bv::extract_bv;
use crate::chrome;
use crate::clipboard::{self, CopyOrder};
use crate::config::{MUTATION_DEBOUNCE_MS, VIDEO_LINK_SELECTOR};
use crate::error::{ExtensionError, is_context_invalidated, js_error_message};
use crate::history::{HistoryUpdate, RecordOutcome};
use crate::protocol::{Request, Response};
use crate::timer::Debounced;
use mode::{ExtractionMode, ModeAction};
use notify::{Notifier, clear_feedback, copy_feedback};

pub struct Agent {
    document: Document,
    mode: RefCell<ExtractionMode>,
    notifier: Notifier,
    on_click: Closure<dyn FnMut(MouseEvent)>,
}

impl Agent {
    /// Build an agent for `document`. The click listener is attached only
    /// while extraction mode is on.
    pub fn new(document: Document) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Agent>| {
            let weak = weak.clone();
            let on_click = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
                if let Some(agent) = weak.upgrade() {
                    agent.handle_click(event);
                }
            });
            Agent {
                notifier: Notifier::new(document.clone()),
                document,
                mode: RefCell::new(ExtractionMode::new()),
                on_click,
            }
        })
    }

    pub fn set_mode(self: &Rc<Self>, enabled: bool) {
        let actions = self.mode.borrow_mut().set(enabled);
        let _ = self.run(actions);
        info!(
            "Extraction mode {} (intercepting clicks: {})",
            if enabled { "on" } else { "off" },
            self.mode.borrow().is_listening()
        );
    }

    pub fn clear_marks(self: &Rc<Self>) -> Result<(), JsValue> {
        let actions = self.mode.borrow().clear_marks();
        self.run(actions)
    }

    fn rescan(self: &Rc<Self>) {
        let actions = self.mode.borrow().rescan();
        let _ = self.run(actions);
    }

    fn mode_enabled(&self) -> bool {
        self.mode.borrow().is_enabled()
    }

    /// Execute a plan. Every action is attempted; the last failure is
    /// returned after being logged.
    fn run(self: &Rc<Self>, actions: Vec<ModeAction>) -> Result<(), JsValue> {
        let mut outcome = Ok(());
        for action in actions {
            let result = match action {
                ModeAction::AttachClickListener => self
                    .document
                    .add_event_listener_with_callback_and_bool(
                        "click",
                        self.on_click.as_ref().unchecked_ref(),
                        true,
                    ),
                ModeAction::DetachClickListener => self
                    .document
                    .remove_event_listener_with_callback_and_bool(
                        "click",
                        self.on_click.as_ref().unchecked_ref(),
                        true,
                    ),
                ModeAction::ShowAffordance => marks::apply_affordance(&self.document, true),
                ModeAction::HideAffordance => marks::apply_affordance(&self.document, false),
                ModeAction::RemarkCopied => {
                    spawn_local(Rc::clone(self).remark_copied());
                    Ok(())
                }
                ModeAction::ClearCopyMarks => {
                    let result = marks::clear_copy_marks(&self.document);
                    self.notifier.show(clear_feedback(&result));
                    result
                }
            };
            if let Err(e) = result {
                warn!("{:?} failed: {:?}", action, e);
                outcome = Err(e);
            }
        }
        outcome
    }

    async fn remark_copied(self: Rc<Self>) {
        match chrome::read_state().await {
            Ok(state) => {
                let result = marks::mark_all_copied(
                    &self.document,
                    state.history.iter(),
                    self.mode_enabled(),
                );
                if let Err(e) = result {
                    warn!("Failed to mark copied videos: {:?}", e);
                }
            }
            Err(e) => warn!("Could not read history: {}", e),
        }
    }

    fn handle_click(self: Rc<Self>, event: MouseEvent) {
        if !self.mode_enabled() {
            return;
        }
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(link)) = target.closest(VIDEO_LINK_SELECTOR) else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();

        // The resolved href is absolute; fall back to the raw attribute
        let url = link
            .dyn_ref::<HtmlAnchorElement>()
            .map(HtmlAnchorElement::href)
            .or_else(|| link.get_attribute("href"));
        if let Some(url) = url {
            spawn_local(self.copy_from_url(url));
        }
    }

    async fn copy_from_url(self: Rc<Self>, url: String) {
        let Some(bv) = extract_bv(&url) else {
            debug!("No BV number in {}", url);
            return;
        };

        let saved = record_copy(&bv).await;
        if let Err(e) = &saved {
            warn!("Failed to save {} to history: {}", bv, e);
        }

        if let Err(e) = marks::mark_copied(&self.document, &bv, self.mode_enabled()) {
            warn!("Failed to mark {}: {:?}", bv, e);
        }

        let copied = clipboard::copy_text(&bv, CopyOrder::ApiFirst).await;
        self.notifier.show(&copy_feedback(&bv, &saved, &copied));
    }

    fn handle_message(self: &Rc<Self>, request: Request) -> Option<Response> {
        match request {
            Request::ToggleBvMode { enabled } => {
                self.set_mode(enabled);
                Some(Response::success())
            }
            Request::ClearCopiedMarks => match self.clear_marks() {
                Ok(()) => Some(Response::success()),
                Err(e) => Some(Response::error(js_error_message(&e))),
            },
            Request::CheckContentScript => Some(Response::alive()),
            _ => None,
        }
    }
}

/// Read-modify-write of the history. Not transactional: a concurrent
/// writer can interleave between the read and the write.
async fn record_copy(bv: &str) -> Result<RecordOutcome, ExtensionError> {
    let mut state = chrome::read_state().await?;
    let outcome = state.history.record(bv);
    if outcome == RecordOutcome::Added {
        chrome::write(&HistoryUpdate {
            history: &state.history,
        })
        .await?;
        let notice = Request::BvCopied {
            bv: Some(bv.to_string()),
        };
        if let Err(e) = chrome::send_runtime(&notice).await {
            debug!("Nobody heard about {}: {}", bv, e);
        }
    }
    Ok(outcome)
}

fn observe_mutations(document: &Document, agent: &Rc<Agent>) -> Result<(), JsValue> {
    let weak = Rc::downgrade(agent);
    let rescan = Debounced::new(MUTATION_DEBOUNCE_MS, move || {
        if let Some(agent) = weak.upgrade() {
            agent.rescan();
        }
    });

    let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
        move |_records: js_sys::Array, _observer: MutationObserver| rescan.trigger(),
    );
    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
    callback.forget();

    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    observer.observe_with_options(&body, &options)
}

fn watch_context_errors(notifier: Notifier) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let callback = Closure::<dyn FnMut(ErrorEvent)>::new(move |event: ErrorEvent| {
        if is_context_invalidated(&event.message()) {
            warn!("Extension context invalidated, page needs a reload");
            notifier.show_reload_notice();
        }
    });
    window.add_event_listener_with_callback("error", callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

async fn initialise(document: Document) {
    if let Err(e) = marks::inject_styles(&document) {
        warn!("Failed to inject styles: {:?}", e);
    }

    let agent = Agent::new(document.clone());

    {
        let agent = Rc::clone(&agent);
        chrome::listen_runtime_messages(move |request, _tab_id| agent.handle_message(request));
    }

    match chrome::read_state().await {
        // Applying the flag also re-marks copied links when it is on
        Ok(state) if state.mode_enabled => agent.set_mode(true),
        Ok(_) => agent.rescan(),
        Err(e) => warn!("Could not read stored mode: {}", e),
    }

    if let Err(e) = observe_mutations(&document, &agent) {
        warn!("Failed to observe page changes: {:?}", e);
    }
    if let Err(e) = watch_context_errors(agent.notifier.clone()) {
        warn!("Failed to watch for context errors: {:?}", e);
    }

    match chrome::send_runtime(&Request::ContentScriptLoaded).await {
        Ok(reply) => debug!("Background acknowledged load: {:?}", reply),
        Err(e) => warn!("Could not announce content agent: {}", e),
    }
    info!("Content agent ready");
}

/// Start the agent once the DOM is parsed
pub fn start() -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if document.ready_state() == "loading" {
        let target = document.clone();
        let callback = Closure::once_into_js(move |_event: Event| {
            spawn_local(initialise(target));
        });
        document.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())?;
    } else {
        spawn_local(initialise(document));
    }
    Ok(())
}
