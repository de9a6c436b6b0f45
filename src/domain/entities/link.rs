//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

use crate::domain::entities::QrStyle;

/// A shortened link owned by a single user.
///
/// The `hash` is the short public identifier (7 URL-safe characters), distinct
/// from the database primary key, and immutable once assigned.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub user_id: i64,
    pub original_url: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        user_id: i64,
        original_url: String,
        hash: String,
        name: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            original_url,
            hash,
            name,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating a new link.
///
/// The hash is allocated before the insert, inside the same transaction that
/// checks it for uniqueness.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: i64,
    pub original_url: String,
    pub hash: String,
    pub name: String,
}

/// One row of a link listing, carrying the visit count.
#[derive(Debug, Clone)]
pub struct LinkSummary {
    pub id: i64,
    pub original_url: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub transitions: i64,
}

/// A link joined with its QR style, as consumed by the QR download path.
#[derive(Debug, Clone)]
pub struct LinkWithStyle {
    pub id: i64,
    pub original_url: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub style: QrStyle,
}
