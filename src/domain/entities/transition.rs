//! Transition entity representing a single recorded visit.

use chrono::{DateTime, Utc};

/// One recorded visit of a shortened link.
///
/// Captures anonymized client metadata for analytics: referrer, the raw user
/// agent alongside its derived browser/OS families, and coarse geolocation.
/// All metadata fields are optional; a redirect with no resolvable context
/// still produces a row.
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: i64,
    pub link_id: i64,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input data for recording a new transition.
///
/// The `link_id` must reference an existing link; the timestamp is assigned by
/// the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransition {
    pub link_id: i64,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
}
