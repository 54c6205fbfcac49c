/// Background service worker: content agent liveness and toolbar badges

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::chrome;
use crate::config::LIVENESS_SWEEP_MS;
use crate::liveness::{Badge, LivenessTable, TabId, is_web_url};
use crate::protocol::{Request, Response};
use crate::timer;

/// Shared handle to the worker's liveness table. Lives as long as the
/// service worker; closures registered with the browser each hold a clone.
#[derive(Clone, Default)]
pub struct Coordinator {
    table: Rc<RefCell<LivenessTable>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Coordinator {
            table: Rc::new(RefCell::new(LivenessTable::new())),
        }
    }

    fn handle_message(&self, request: Request, tab_id: Option<TabId>) -> Option<Response> {
        // Only content scripts carry a tab; popup traffic is not ours
        let tab_id = tab_id?;
        match request {
            Request::ContentScriptLoaded => {
                info!("Content agent loaded in tab {}", tab_id);
                let badge = self.table.borrow_mut().content_loaded(tab_id, js_sys::Date::now());
                chrome::set_badge(tab_id, badge);
                Some(Response::background_received())
            }
            Request::BvCopied { bv } => {
                debug!("Tab {} copied {:?}", tab_id, bv);
                Some(Response::success())
            }
            _ => None,
        }
    }

    fn handle_installed(&self, reason: String) {
        info!("Extension {}", reason);
        if reason != "update" {
            return;
        }
        spawn_local(async {
            match chrome::all_tabs().await {
                Ok(tabs) => {
                    for tab in tabs {
                        if let (Some(id), Some(url)) = (tab.id, tab.url.as_deref()) {
                            if is_web_url(url) {
                                chrome::set_badge(id, Badge::New);
                            }
                        }
                    }
                }
                Err(e) => warn!("Could not list tabs after update: {}", e),
            }
        });
    }

    fn handle_tab_updated(&self, tab_id: TabId, status: Option<String>, url: Option<String>) {
        let complete = status.as_deref() == Some("complete");
        if !complete || !url.as_deref().is_some_and(is_web_url) {
            return;
        }
        if let Some(badge) = self.table.borrow().navigation_completed(tab_id) {
            chrome::set_badge(tab_id, badge);
        }
    }

    fn handle_tab_removed(&self, tab_id: TabId) {
        let mut table = self.table.borrow_mut();
        if table.remove(tab_id) {
            debug!("Forgot tab {}, {} still tracked", tab_id, table.len());
        }
    }

    /// Probe the active tab of every window once. Failures wait for the
    /// next sweep.
    pub async fn sweep(&self) {
        let tabs = match chrome::active_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!("Liveness sweep could not list tabs: {}", e);
                return;
            }
        };

        for tab in tabs {
            let (Some(tab_id), Some(url)) = (tab.id, tab.url) else {
                continue;
            };
            if is_web_url(&url) {
                spawn_local(self.clone().probe(tab_id));
            }
        }
    }

    async fn probe(self, tab_id: TabId) {
        let reply = chrome::send_to_tab(tab_id, &Request::CheckContentScript).await;
        let badge = match reply {
            Ok(response) if response.is_alive() => self
                .table
                .borrow_mut()
                .probe_succeeded(tab_id, js_sys::Date::now()),
            Ok(response) => {
                debug!("Tab {} answered probe with {:?}", tab_id, response.status);
                None
            }
            Err(e) => {
                let mut table = self.table.borrow_mut();
                if let Some(record) = table.get(tab_id) {
                    let idle_secs = (js_sys::Date::now() - record.last_active) / 1000.0;
                    debug!(
                        "Tab {} missed probe ({:.0}s since last seen): {}",
                        tab_id, idle_secs, e
                    );
                }
                table.probe_failed(tab_id)
            }
        };
        if let Some(badge) = badge {
            chrome::set_badge(tab_id, badge);
        }
    }
}

/// The coordinator as seen by the worker script. The script registers the
/// browser listeners synchronously when it is first evaluated, queues what
/// arrives before the module is ready and forwards every event here.
#[wasm_bindgen]
pub struct BackgroundWorker {
    coordinator: Coordinator,
}

#[wasm_bindgen]
impl BackgroundWorker {
    pub fn installed(&self, reason: String) {
        self.coordinator.handle_installed(reason);
    }

    /// Reply to a runtime message; `undefined` means no reply
    pub fn message(&self, raw: JsValue, tab_id: Option<TabId>) -> JsValue {
        chrome::reply_to(raw, |request| self.coordinator.handle_message(request, tab_id))
    }

    pub fn tab_updated(&self, tab_id: TabId, status: Option<String>, url: Option<String>) {
        self.coordinator.handle_tab_updated(tab_id, status, url);
    }

    pub fn tab_removed(&self, tab_id: TabId) {
        self.coordinator.handle_tab_removed(tab_id);
    }

    /// Icon click clears the badge without implying a reconnection
    pub fn action_clicked(&self, tab_id: Option<TabId>) {
        if let Some(tab_id) = tab_id {
            chrome::set_badge(tab_id, Badge::Clear);
        }
    }
}

pub fn start() -> BackgroundWorker {
    let coordinator = Coordinator::new();

    let sweeper = coordinator.clone();
    timer::run_every(LIVENESS_SWEEP_MS, move || {
        let sweeper = sweeper.clone();
        spawn_local(async move { sweeper.sweep().await });
    });

    info!("Background coordinator started");
    BackgroundWorker { coordinator }
}
