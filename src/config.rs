/// Compile-time settings shared by the background, content and popup contexts

/// Storage key for the extraction mode flag
pub const MODE_KEY: &str = "isBVModeEnabled";

/// Storage key for the identifier history
pub const HISTORY_KEY: &str = "bvHistory";

/// Maximum number of identifiers kept in the history
pub const HISTORY_CAPACITY: usize = 50;

/// Version tag returned by the content agent in liveness replies
pub const PROTOCOL_VERSION: &str = "1.0";

/// Interval between background liveness sweeps
pub const LIVENESS_SWEEP_MS: i32 = 30_000;

/// How long the popup waits for the content agent before giving up
pub const MESSAGE_TIMEOUT_MS: i32 = 2_000;

/// Quiet window before a burst of DOM mutations triggers a rescan
pub const MUTATION_DEBOUNCE_MS: i32 = 200;

/// Lifetime of an on-screen notification
pub const NOTIFICATION_MS: i32 = 2_000;

/// Selector for links that carry an identifier
pub const VIDEO_LINK_SELECTOR: &str = r#"a[href*="/video/BV"]"#;

pub const BADGE_NEW_TEXT: &str = "NEW";
pub const BADGE_NEW_COLOR: &str = "#4CAF50";
pub const BADGE_REFRESH_TEXT: &str = "!";
pub const BADGE_REFRESH_COLOR: &str = "#F44336";

pub const INDICATOR_ALIVE_COLOR: &str = "#4CAF50";
pub const INDICATOR_DEAD_COLOR: &str = "#F44336";
