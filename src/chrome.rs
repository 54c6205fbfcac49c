/// Rust side of the chrome.* bridge
///
/// Every call checks that the extension context is still alive and reports
/// failures as [`ExtensionError`] values; nothing here throws into JS.

use js_sys::{Array, Function, Promise};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::error::ExtensionError;
use crate::history::StoredState;
use crate::liveness::{Badge, TabId};
use crate::protocol::{Request, Response};
use crate::timer;

#[wasm_bindgen(module = "/bridge.js")]
extern "C" {
    fn isContextValid() -> bool;

    #[wasm_bindgen(catch)]
    async fn storageGet(keys: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn storageSet(items: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn runtimeSendMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn tabsSendMessage(tab_id: i32, message: JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryTabs(query_info: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn reloadTab(tab_id: i32) -> Result<(), JsValue>;

    fn setBadge(tab_id: i32, text: &str, color: Option<String>);

    #[wasm_bindgen(catch)]
    async fn clipboardWriteText(text: &str) -> Result<(), JsValue>;

    fn onRuntimeMessage(handler: &Function);
}

/// The subset of `chrome.tabs.Tab` this extension reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tab {
    pub id: Option<TabId>,
    pub url: Option<String>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_window: Option<bool>,
}

fn ensure_context() -> Result<(), ExtensionError> {
    if isContextValid() {
        Ok(())
    } else {
        warn!("Extension context invalidated, skipping browser call");
        Err(ExtensionError::ContextInvalidated)
    }
}

// Storage

pub async fn read_state() -> Result<StoredState, ExtensionError> {
    ensure_context()?;
    let keys = serde_wasm_bindgen::to_value(&StoredState::keys())?;
    let raw = storageGet(keys).await.map_err(ExtensionError::storage)?;
    if raw.is_null() || raw.is_undefined() {
        return Ok(StoredState::default());
    }
    Ok(serde_wasm_bindgen::from_value(raw)?)
}

pub async fn write<T: Serialize>(items: &T) -> Result<(), ExtensionError> {
    ensure_context()?;
    let items = serde_wasm_bindgen::to_value(items)?;
    storageSet(items).await.map_err(ExtensionError::storage)
}

// Messaging

fn parse_reply(reply: JsValue) -> Result<Option<Response>, ExtensionError> {
    if reply.is_null() || reply.is_undefined() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(reply)?))
}

/// Broadcast to the extension's own pages (background, popup). A missing
/// listener is not an error; there may simply be no popup open.
pub async fn send_runtime(request: &Request) -> Result<Option<Response>, ExtensionError> {
    ensure_context()?;
    let message = serde_wasm_bindgen::to_value(request)?;
    debug!("runtime <- {:?}", request);
    let reply = runtimeSendMessage(message)
        .await
        .map_err(ExtensionError::delivery)?;
    parse_reply(reply)
}

fn deliver(tab_id: TabId, request: &Request) -> Result<Promise, ExtensionError> {
    ensure_context()?;
    let message = serde_wasm_bindgen::to_value(request)?;
    debug!("tab {} <- {:?}", tab_id, request);
    tabsSendMessage(tab_id, message).map_err(ExtensionError::delivery)
}

fn require_reply(reply: Option<Response>) -> Result<Response, ExtensionError> {
    reply.ok_or_else(|| ExtensionError::MessageDelivery("no response".to_string()))
}

/// Send to the content agent of one tab and wait for its reply
pub async fn send_to_tab(tab_id: TabId, request: &Request) -> Result<Response, ExtensionError> {
    let delivery = deliver(tab_id, request)?;
    let reply = JsFuture::from(delivery)
        .await
        .map_err(ExtensionError::delivery)?;
    require_reply(parse_reply(reply)?)
}

/// Like [`send_to_tab`], but gives up after `timeout_ms`
pub async fn send_to_tab_with_timeout(
    tab_id: TabId,
    request: &Request,
    timeout_ms: i32,
) -> Result<Response, ExtensionError> {
    let delivery = deliver(tab_id, request)?;
    let sentinel: JsValue = js_sys::Object::new().into();
    let timeout = timer::resolve_after(timeout_ms, sentinel.clone());
    let race = Promise::race(&Array::of2(&delivery, &timeout));

    let reply = JsFuture::from(race)
        .await
        .map_err(ExtensionError::delivery)?;
    if reply == sentinel {
        return Err(ExtensionError::MessageTimeout);
    }
    require_reply(parse_reply(reply)?)
}

// Tabs

async fn query(query: &TabQuery) -> Result<Vec<Tab>, ExtensionError> {
    ensure_context()?;
    let query_info = serde_wasm_bindgen::to_value(query)?;
    let tabs = queryTabs(query_info)
        .await
        .map_err(ExtensionError::delivery)?;
    Ok(serde_wasm_bindgen::from_value(tabs)?)
}

/// The focused tab of the current window
pub async fn active_tab() -> Result<TabId, ExtensionError> {
    let tabs = query(&TabQuery {
        active: Some(true),
        current_window: Some(true),
    })
    .await?;
    tabs.into_iter()
        .find_map(|tab| tab.id)
        .ok_or(ExtensionError::NoActiveTab)
}

/// The active tab of every window
pub async fn active_tabs() -> Result<Vec<Tab>, ExtensionError> {
    query(&TabQuery {
        active: Some(true),
        current_window: None,
    })
    .await
}

pub async fn all_tabs() -> Result<Vec<Tab>, ExtensionError> {
    query(&TabQuery::default()).await
}

pub async fn reload_tab(tab_id: TabId) -> Result<(), ExtensionError> {
    ensure_context()?;
    reloadTab(tab_id).await.map_err(ExtensionError::delivery)
}

pub fn set_badge(tab_id: TabId, badge: Badge) {
    if !isContextValid() {
        return;
    }
    setBadge(tab_id, badge.text(), badge.color().map(str::to_string));
}

// Clipboard

pub async fn clipboard_write(text: &str) -> Result<(), ExtensionError> {
    clipboardWriteText(text)
        .await
        .map_err(ExtensionError::clipboard)
}

// Runtime messages

/// Decode one runtime message, run `handler` on it and encode the reply.
/// Messages with an unknown action are ignored and get no reply.
pub fn reply_to(raw: JsValue, handler: impl FnOnce(Request) -> Option<Response>) -> JsValue {
    let request: Request = match serde_wasm_bindgen::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            debug!("Ignoring unrecognised message: {}", e);
            return JsValue::UNDEFINED;
        }
    };
    match handler(request) {
        Some(reply) => serde_wasm_bindgen::to_value(&reply).unwrap_or_else(|e| {
            warn!("Failed to encode reply: {}", e);
            JsValue::UNDEFINED
        }),
        None => JsValue::UNDEFINED,
    }
}

/// Handle runtime messages in a page context. The handler receives the
/// decoded request and the sender's tab id, and returns the reply (or
/// `None` to stay silent). The closure lives as long as the page.
pub fn listen_runtime_messages(
    mut handler: impl FnMut(Request, Option<TabId>) -> Option<Response> + 'static,
) {
    let callback = Closure::<dyn FnMut(JsValue, JsValue) -> JsValue>::new(
        move |raw: JsValue, tab_id: JsValue| -> JsValue {
            let tab_id = tab_id.as_f64().map(|id| id as TabId);
            reply_to(raw, |request| handler(request, tab_id))
        },
    );
    onRuntimeMessage(callback.as_ref().unchecked_ref());
    callback.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_ignores_extra_fields() {
        let tab: Tab = serde_json::from_value(serde_json::json!({
            "id": 12,
            "url": "https://www.bilibili.com/",
            "active": true,
            "pinned": false,
            "windowId": 3
        }))
        .unwrap();

        assert_eq!(tab.id, Some(12));
        assert_eq!(tab.url.as_deref(), Some("https://www.bilibili.com/"));
    }

    #[test]
    fn test_tab_without_url() {
        let tab: Tab = serde_json::from_value(serde_json::json!({ "id": 4 })).unwrap();
        assert_eq!(tab.id, Some(4));
        assert_eq!(tab.url, None);
    }

    #[test]
    fn test_tab_query_shape() {
        let json = serde_json::to_value(TabQuery {
            active: Some(true),
            current_window: Some(true),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "active": true, "currentWindow": true }));

        let json = serde_json::to_value(TabQuery::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
