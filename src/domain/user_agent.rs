//! User-Agent parsing for transition analytics.
//!
//! Extracts low-cardinality browser and OS family labels from raw User-Agent
//! headers. Parsing is best-effort: anything unrecognized yields `None`, and
//! no input can fail the caller.

/// Browser and OS families derived from a User-Agent header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientInfo {
    pub browser: Option<&'static str>,
    pub os: Option<&'static str>,
}

/// Parses a User-Agent string into browser and OS families.
///
/// Match order matters: Edge and Opera ship a `Chrome/` token, Chrome ships a
/// `Safari/` token, and Android user agents contain `Linux`, so the more
/// specific family is checked first in each group.
pub fn parse(ua: &str) -> ClientInfo {
    ClientInfo {
        browser: browser_family(ua),
        os: os_family(ua),
    }
}

fn browser_family(ua: &str) -> Option<&'static str> {
    if ua.is_empty() {
        return None;
    }
    if ua.contains("Edg/") || ua.contains("Edge/") {
        return Some("Edge");
    }
    if ua.contains("OPR/") || ua.contains("Opera") {
        return Some("Opera");
    }
    if ua.contains("Chrome/") || ua.contains("CriOS/") {
        return Some("Chrome");
    }
    if ua.contains("Firefox/") || ua.contains("FxiOS/") {
        return Some("Firefox");
    }
    if ua.contains("Safari/") {
        return Some("Safari");
    }
    if ua.contains("MSIE") || ua.contains("Trident/") {
        return Some("Internet Explorer");
    }
    if ua.contains("curl/") {
        return Some("curl");
    }
    None
}

fn os_family(ua: &str) -> Option<&'static str> {
    if ua.is_empty() {
        return None;
    }
    if ua.contains("Windows") {
        return Some("Windows");
    }
    if ua.contains("Android") {
        return Some("Android");
    }
    if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
        return Some("iOS");
    }
    if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        return Some("Mac OS X");
    }
    if ua.contains("CrOS") {
        return Some("Chrome OS");
    }
    if ua.contains("Linux") {
        return Some("Linux");
    }
    None
}
