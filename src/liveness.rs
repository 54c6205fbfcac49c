/// Per-tab liveness tracking for the background service worker
///
/// The table is owned by the background context and never persisted. Every
/// transition reports the badge change (if any) the caller should apply, so
/// this module stays free of browser calls.
use std::collections::HashMap;

use crate::config::{BADGE_NEW_COLOR, BADGE_NEW_TEXT, BADGE_REFRESH_COLOR, BADGE_REFRESH_TEXT};

pub type TabId = i32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TabLiveness {
    pub connected: bool,
    /// Milliseconds since the epoch of the last sign of life
    pub last_active: f64,
}

/// Badge change for one tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Clear,
    /// Extension was updated; existing pages run the old content script
    New,
    /// Content agent is missing or stopped answering
    NeedsRefresh,
}

impl Badge {
    pub fn text(&self) -> &'static str {
        match self {
            Badge::Clear => "",
            Badge::New => BADGE_NEW_TEXT,
            Badge::NeedsRefresh => BADGE_REFRESH_TEXT,
        }
    }

    pub fn color(&self) -> Option<&'static str> {
        match self {
            Badge::Clear => None,
            Badge::New => Some(BADGE_NEW_COLOR),
            Badge::NeedsRefresh => Some(BADGE_REFRESH_COLOR),
        }
    }
}

#[derive(Debug, Default)]
pub struct LivenessTable {
    tabs: HashMap<TabId, TabLiveness>,
}

impl LivenessTable {
    pub fn new() -> Self {
        LivenessTable {
            tabs: HashMap::new(),
        }
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabLiveness> {
        self.tabs.get(&tab_id)
    }

    pub fn is_connected(&self, tab_id: TabId) -> bool {
        self.tabs.get(&tab_id).is_some_and(|tab| tab.connected)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Content agent announced itself
    pub fn content_loaded(&mut self, tab_id: TabId, now: f64) -> Badge {
        self.mark_connected(tab_id, now);
        Badge::Clear
    }

    /// A liveness probe came back alive. The badge is cleared only when the
    /// tab was not already connected.
    pub fn probe_succeeded(&mut self, tab_id: TabId, now: f64) -> Option<Badge> {
        let was_connected = self.is_connected(tab_id);
        self.mark_connected(tab_id, now);
        if was_connected { None } else { Some(Badge::Clear) }
    }

    /// A liveness probe got no answer. Only a connected tab changes state.
    pub fn probe_failed(&mut self, tab_id: TabId) -> Option<Badge> {
        match self.tabs.get_mut(&tab_id) {
            Some(tab) if tab.connected => {
                tab.connected = false;
                Some(Badge::NeedsRefresh)
            }
            _ => None,
        }
    }

    /// A tab finished loading a web page
    pub fn navigation_completed(&self, tab_id: TabId) -> Option<Badge> {
        if self.is_connected(tab_id) {
            None
        } else {
            Some(Badge::NeedsRefresh)
        }
    }

    /// Tab closed; forget it
    pub fn remove(&mut self, tab_id: TabId) -> bool {
        self.tabs.remove(&tab_id).is_some()
    }

    fn mark_connected(&mut self, tab_id: TabId, now: f64) {
        self.tabs.insert(
            tab_id,
            TabLiveness {
                connected: true,
                last_active: now,
            },
        );
    }
}

/// Whether the extension may talk to a page at this URL
pub fn is_web_url(url: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tab() {
        let table = LivenessTable::new();
        assert_eq!(table.len(), 0);
        assert!(!table.is_connected(7));
        assert!(table.get(7).is_none());
    }

    #[test]
    fn test_content_loaded_connects_and_clears_badge() {
        let mut table = LivenessTable::new();

        assert_eq!(table.content_loaded(1, 1000.0), Badge::Clear);

        assert_eq!(
            table.get(1),
            Some(&TabLiveness {
                connected: true,
                last_active: 1000.0
            })
        );
    }

    #[test]
    fn test_probe_refreshes_timestamp() {
        let mut table = LivenessTable::new();
        table.content_loaded(1, 1000.0);

        assert_eq!(table.probe_succeeded(1, 31000.0), None);
        assert_eq!(table.get(1).map(|t| t.last_active), Some(31000.0));
    }

    #[test]
    fn test_probe_failure_on_unknown_tab_is_ignored() {
        let mut table = LivenessTable::new();
        assert_eq!(table.probe_failed(3), None);
        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_consecutive_failures_then_recovery() {
        let mut table = LivenessTable::new();
        table.content_loaded(1, 0.0);

        // First missed probe disconnects and raises the badge
        assert_eq!(table.probe_failed(1), Some(Badge::NeedsRefresh));
        // Second missed probe keeps the state without re-raising
        assert_eq!(table.probe_failed(1), None);
        assert!(!table.is_connected(1));
        assert_eq!(table.get(1).map(|t| t.last_active), Some(0.0));

        // Next successful probe reconnects and hides the badge
        assert_eq!(table.probe_succeeded(1, 60000.0), Some(Badge::Clear));
        assert!(table.is_connected(1));
    }

    #[test]
    fn test_navigation_badge_only_for_unconnected_tabs() {
        let mut table = LivenessTable::new();
        assert_eq!(table.navigation_completed(1), Some(Badge::NeedsRefresh));

        table.content_loaded(1, 0.0);
        assert_eq!(table.navigation_completed(1), None);

        table.probe_failed(1);
        assert_eq!(table.navigation_completed(1), Some(Badge::NeedsRefresh));
    }

    #[test]
    fn test_remove() {
        let mut table = LivenessTable::new();
        table.content_loaded(1, 0.0);
        table.content_loaded(2, 0.0);

        assert!(table.remove(1));
        assert!(!table.remove(1));
        assert_eq!(table.len(), 1);
        assert!(table.is_connected(2));
    }

    #[test]
    fn test_badge_text_and_color() {
        assert_eq!(Badge::Clear.text(), "");
        assert_eq!(Badge::Clear.color(), None);
        assert_eq!(Badge::New.text(), "NEW");
        assert_eq!(Badge::NeedsRefresh.text(), "!");
        assert_ne!(Badge::New.color(), Badge::NeedsRefresh.color());
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://www.bilibili.com/"));
        assert!(is_web_url("http://localhost:8080/video/BV1"));
        assert!(!is_web_url("chrome://extensions"));
        assert!(!is_web_url("chrome-extension://abc/popup.html"));
        assert!(!is_web_url("file:///tmp/x.html"));
        assert!(!is_web_url("not a url"));
    }
}
