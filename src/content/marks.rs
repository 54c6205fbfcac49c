/// DOM decoration for video links: mode affordance and copy-marks
///
/// All functions are idempotent so that repeated rescans leave the page
/// unchanged and do not feed the mutation observer.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::bv::links_for_bv_selector;
use crate::config::VIDEO_LINK_SELECTOR;

pub const OVERLAY_CLASS: &str = "bv-mode-overlay";
pub const COPIED_OVERLAY_CLASS: &str = "bv-copied-overlay";
pub const COPIED_CLASS: &str = "bv-copied";
pub const CHECK_MARK_CLASS: &str = "bv-check-mark";

const STYLE_ID: &str = "bv-picker-style";

const OVERLAY_CSS: &str = "position: absolute; top: 0; left: 0; right: 0; bottom: 0; \
    background: rgba(0, 0, 0, 0.1); z-index: 1000; pointer-events: none;";

const CHECK_MARK_CSS: &str = "position: absolute; top: 8px; right: 8px; width: 20px; height: 20px; \
    background: #4CAF50; color: white; border-radius: 50%; display: flex; align-items: center; \
    justify-content: center; font-size: 14px; z-index: 1001; pointer-events: none;";

const PAGE_CSS: &str = r#"
.bv-mode-overlay:hover { background: rgba(0, 0, 0, 0.2) !important; }
.bv-copied-overlay { background: rgba(76, 175, 80, 0.1) !important; }
.bv-copied-overlay:hover { background: rgba(76, 175, 80, 0.2) !important; }
a.bv-copied { position: relative; }
.bv-check-mark { opacity: 0.85; transition: opacity 0.2s; }
a:hover .bv-check-mark { opacity: 1; }
"#;

fn elements(root: &Document, selector: &str) -> Result<Vec<HtmlElement>, JsValue> {
    let list = root.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect())
}

fn create_div(document: &Document, class: &str, css: &str) -> Result<HtmlElement, JsValue> {
    let div: HtmlElement = document.create_element("div")?.dyn_into()?;
    div.set_class_name(class);
    div.style().set_css_text(css);
    Ok(div)
}

/// Add the page stylesheet once
pub fn inject_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return Ok(());
    }
    let style = document.create_element("style")?;
    style.set_id(STYLE_ID);
    style.set_text_content(Some(PAGE_CSS));
    let parent: Element = match document.head() {
        Some(head) => head.into(),
        None => document
            .document_element()
            .ok_or_else(|| JsValue::from_str("document has no root element"))?,
    };
    parent.append_child(&style)?;
    Ok(())
}

/// Show or hide the extraction-mode affordance on every video link
pub fn apply_affordance(document: &Document, enabled: bool) -> Result<(), JsValue> {
    for link in elements(document, VIDEO_LINK_SELECTOR)? {
        link.style()
            .set_property("cursor", if enabled { "copy" } else { "" })?;

        let overlay = link.query_selector(&format!(".{}", OVERLAY_CLASS))?;
        match (enabled, overlay) {
            (true, None) => {
                let overlay = create_div(document, OVERLAY_CLASS, OVERLAY_CSS)?;
                link.append_child(&overlay)?;
            }
            (false, Some(overlay)) => overlay.remove(),
            _ => {}
        }
    }
    Ok(())
}

/// Mark every link to `bv` as copied. Overlays are only added while the
/// mode is on; the check mark is added regardless. The green tint comes from
/// the `bv-copied-overlay` rule in the page stylesheet.
pub fn mark_copied(document: &Document, bv: &str, mode_enabled: bool) -> Result<(), JsValue> {
    for link in elements(document, &links_for_bv_selector(bv))? {
        link.class_list().add_1(COPIED_CLASS)?;

        match link.query_selector(&format!(".{}", OVERLAY_CLASS))? {
            Some(overlay) => overlay.class_list().add_1(COPIED_OVERLAY_CLASS)?,
            None if mode_enabled => {
                let class = format!("{} {}", OVERLAY_CLASS, COPIED_OVERLAY_CLASS);
                let overlay = create_div(document, &class, OVERLAY_CSS)?;
                link.append_child(&overlay)?;
            }
            None => {}
        }

        if link.query_selector(&format!(".{}", CHECK_MARK_CLASS))?.is_none() {
            let check = create_div(document, CHECK_MARK_CLASS, CHECK_MARK_CSS)?;
            check.set_text_content(Some("✓"));
            link.append_child(&check)?;
        }
    }
    Ok(())
}

pub fn mark_all_copied<'a>(
    document: &Document,
    history: impl IntoIterator<Item = &'a str>,
    mode_enabled: bool,
) -> Result<(), JsValue> {
    for bv in history {
        mark_copied(document, bv, mode_enabled)?;
    }
    Ok(())
}

/// Remove every copy-mark. Mode overlays stay but lose their copied tint.
pub fn clear_copy_marks(document: &Document) -> Result<(), JsValue> {
    for check in elements(document, &format!(".{}", CHECK_MARK_CLASS))? {
        check.remove();
    }
    for link in elements(document, &format!(".{}", COPIED_CLASS))? {
        link.class_list().remove_1(COPIED_CLASS)?;
        if let Some(overlay) = link.query_selector(&format!(".{}", COPIED_OVERLAY_CLASS))? {
            overlay.class_list().remove_1(COPIED_OVERLAY_CLASS)?;
        }
    }
    Ok(())
}
