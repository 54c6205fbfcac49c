/// BV number extraction from video URLs
use regex::Regex;
use std::sync::LazyLock;

static BV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/video/(BV[0-9A-Za-z_]+)").expect("BV pattern is valid"));

/// Extract the BV number embedded in a video URL
///
/// The identifier is the `BV`-prefixed run of ASCII word characters that follows
/// the first `/video/` path segment. Anything after it (a trailing slash,
/// query string or fragment) is ignored.
///
/// Examples:
/// - https://www.bilibili.com/video/BV1xx411c7mD → BV1xx411c7mD
/// - https://www.bilibili.com/video/BV1GJ411x7h7/?p=2 → BV1GJ411x7h7
/// - https://www.bilibili.com/video/av170001 → None
pub fn extract_bv(url: &str) -> Option<String> {
    BV_PATTERN
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// CSS selector matching every link that points at the given identifier
pub fn links_for_bv_selector(bv: &str) -> String {
    format!(r#"a[href*="/video/{}"]"#, bv)
}
