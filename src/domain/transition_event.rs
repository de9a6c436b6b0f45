//! Transition event model for asynchronous visit tracking.

/// An in-memory representation of a visit for async processing.
///
/// Created at redirect time with request metadata and sent over a bounded
/// channel to the background recorder. This decouples the redirect response
/// from user-agent parsing, geo lookup, and the database write.
///
/// Empty strings are normalized to `None` at construction, so downstream code
/// only deals with genuinely absent data.
#[derive(Debug, Clone)]
pub struct TransitionEvent {
    pub link_id: i64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl TransitionEvent {
    /// Creates a new transition event.
    ///
    /// # Arguments
    ///
    /// - `link_id` - The resolved link the visit belongs to
    /// - `referer` - Raw Referer header value, may be empty
    /// - `user_agent` - Raw User-Agent header value, may be empty
    /// - `ip` - Client IP in textual form, may be empty
    pub fn new(link_id: i64, referer: &str, user_agent: &str, ip: &str) -> Self {
        Self {
            link_id,
            referer: non_empty(referer),
            user_agent: non_empty(user_agent),
            ip: non_empty(ip),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
