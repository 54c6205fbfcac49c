//! DOM behaviour of the content agent, and the worker handle.
//! Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use bv_picker::content::Agent;
use bv_picker::content::marks::{
    self, CHECK_MARK_CLASS, COPIED_CLASS, COPIED_OVERLAY_CLASS, OVERLAY_CLASS,
};
use js_sys::{JSON, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Replace the previous fixture with a fresh one and return its container
fn fixture(html: &str) -> Element {
    let document = document();
    if let Some(previous) = document.get_element_by_id("fixture") {
        previous.remove();
    }
    let body = document.body().unwrap();
    let container = document.create_element("div").unwrap();
    container.set_id("fixture");
    container.set_inner_html(html);
    body.append_child(&container).unwrap();
    container
}

fn count(root: &Element, selector: &str) -> u32 {
    root.query_selector_all(selector).unwrap().length()
}

fn has_class(root: &Element, selector: &str, class: &str) -> bool {
    root.query_selector(selector)
        .unwrap()
        .unwrap()
        .class_list()
        .contains(class)
}

/// Let spawned futures and timers run
async fn settle(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

const LINKS: &str = r#"
    <a id="one" href="https://x.test/video/BV1xx411c7mD">first</a>
    <a id="two" href="https://x.test/video/BV1xx411c7mD?p=2">first again</a>
    <a id="other" href="https://x.test/video/BV1GJ411x7h7">second</a>
    <a id="plain" href="https://x.test/space/42">not a video</a>
"#;

#[wasm_bindgen_test]
fn marking_twice_equals_marking_once() {
    let root = fixture(LINKS);
    let document = document();

    marks::mark_copied(&document, "BV1xx411c7mD", false).unwrap();
    let once = root.inner_html();
    marks::mark_copied(&document, "BV1xx411c7mD", false).unwrap();

    assert_eq!(root.inner_html(), once);
    assert_eq!(count(&root, &format!(".{}", CHECK_MARK_CLASS)), 2);
    assert_eq!(count(&root, &format!("a.{}", COPIED_CLASS)), 2);
    assert!(!root.query_selector("#other").unwrap().unwrap().class_list().contains(COPIED_CLASS));
}

#[wasm_bindgen_test]
fn marking_with_mode_on_adds_tinted_overlay() {
    let root = fixture(LINKS);
    let document = document();

    marks::apply_affordance(&document, true).unwrap();
    marks::mark_copied(&document, "BV1xx411c7mD", true).unwrap();
    marks::mark_copied(&document, "BV1xx411c7mD", true).unwrap();

    // One overlay per video link, never duplicated
    assert_eq!(count(&root, &format!(".{}", OVERLAY_CLASS)), 3);
    assert_eq!(count(&root, &format!(".{}", COPIED_OVERLAY_CLASS)), 2);
}

#[wasm_bindgen_test]
fn toggling_on_then_off_keeps_copy_marks() {
    let root = fixture(LINKS);
    let document = document();
    marks::mark_copied(&document, "BV1GJ411x7h7", false).unwrap();

    marks::apply_affordance(&document, true).unwrap();
    assert_eq!(count(&root, &format!(".{}", OVERLAY_CLASS)), 3);

    marks::apply_affordance(&document, false).unwrap();
    assert_eq!(count(&root, &format!(".{}", OVERLAY_CLASS)), 0);
    assert_eq!(count(&root, &format!(".{}", CHECK_MARK_CLASS)), 1);
    assert!(root.query_selector("#other").unwrap().unwrap().class_list().contains(COPIED_CLASS));
}

#[wasm_bindgen_test]
fn clearing_marks_removes_all_decoration() {
    let root = fixture(LINKS);
    let document = document();
    marks::apply_affordance(&document, true).unwrap();
    marks::mark_all_copied(&document, ["BV1xx411c7mD", "BV1GJ411x7h7"], true).unwrap();

    marks::clear_copy_marks(&document).unwrap();

    assert_eq!(count(&root, &format!(".{}", CHECK_MARK_CLASS)), 0);
    assert_eq!(count(&root, &format!(".{}", COPIED_CLASS)), 0);
    assert_eq!(count(&root, &format!(".{}", COPIED_OVERLAY_CLASS)), 0);
    // Mode overlays are not copy-marks
    assert_eq!(count(&root, &format!(".{}", OVERLAY_CLASS)), 3);
}

#[wasm_bindgen_test]
fn styles_are_injected_once() {
    let document = document();
    marks::inject_styles(&document).unwrap();
    marks::inject_styles(&document).unwrap();
    assert_eq!(document.query_selector_all("#bv-picker-style").unwrap().length(), 1);
}

#[wasm_bindgen_test]
async fn clicking_a_video_link_marks_every_link_to_it() {
    // Fragment links so a missed preventDefault cannot leave the page
    let root = fixture(
        r##"
        <a id="card" href="#/video/BV1Ck4y1x7Gn"><span id="thumb">cover</span></a>
        <a id="title" href="#/video/BV1Ck4y1x7Gn?p=1">title</a>
        <a id="other" href="#/video/BV1GJ411x7h7">other</a>
    "##,
    );
    let document = document();
    let agent = Agent::new(document.clone());
    agent.set_mode(true);
    let url_before = document.url().unwrap();

    let thumb: HtmlElement = root
        .query_selector("#thumb")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    thumb.click();
    settle(100).await;

    // The page did not follow the link
    assert_eq!(document.url().unwrap(), url_before);
    assert!(has_class(&root, "#card", COPIED_CLASS));
    assert!(has_class(&root, "#title", COPIED_CLASS));
    assert!(!has_class(&root, "#other", COPIED_CLASS));
    assert_eq!(count(&root, &format!(".{}", CHECK_MARK_CLASS)), 2);
    assert_eq!(count(&root, &format!(".{}", COPIED_OVERLAY_CLASS)), 2);

    agent.set_mode(false);
    assert_eq!(count(&root, &format!(".{}", OVERLAY_CLASS)), 0);
    assert_eq!(count(&root, &format!(".{}", CHECK_MARK_CLASS)), 2);
}

fn status_of(reply: &JsValue) -> Option<String> {
    Reflect::get(reply, &JsValue::from_str("status"))
        .ok()
        .and_then(|status| status.as_string())
}

#[wasm_bindgen_test]
fn worker_replies_to_forwarded_messages() {
    let worker = bv_picker::start_background();
    let loaded = JSON::parse(r#"{"action":"CONTENT_SCRIPT_LOADED"}"#).unwrap();

    let reply = worker.message(loaded.clone(), Some(5));
    assert_eq!(status_of(&reply).as_deref(), Some("background_received"));

    // Only content scripts carry a tab; other senders get no reply
    assert!(worker.message(loaded, None).is_undefined());

    let unknown = JSON::parse(r#"{"action":"SOMETHING_ELSE"}"#).unwrap();
    assert!(worker.message(unknown, Some(5)).is_undefined());

    let copied = JSON::parse(r#"{"action":"BV_COPIED","bv":"BV1Ck4y1x7Gn"}"#).unwrap();
    assert_eq!(status_of(&worker.message(copied, Some(5))).as_deref(), Some("success"));

    worker.tab_updated(
        5,
        Some("complete".to_string()),
        Some("https://www.bilibili.com/".to_string()),
    );
    worker.tab_removed(5);
    worker.action_clicked(Some(5));
}
