//! Repository traits for link, style, and transition data access.

use crate::domain::entities::{
    Link, LinkSummary, LinkWithStyle, NewLink, NewTransition, QrStyle, Transition,
};
use crate::error::AppError;
use async_trait::async_trait;

/// Store interface for links, QR styles, and transitions.
///
/// Multi-step writes go through an explicit transaction handle obtained via
/// [`LinkStore::begin`]; single reads and the append-only transition insert
/// run directly on the pool.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Opens a transaction for a multi-step write.
    ///
    /// Dropping the returned handle without calling
    /// [`LinkStoreTx::commit`] rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the transaction cannot be started.
    async fn begin(&self) -> Result<Box<dyn LinkStoreTx>, AppError>;

    /// Finds a link by its public hash.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_link_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link joined with its QR style, scoped to its owner.
    ///
    /// Returns `Ok(None)` when no row matches the `(id, owner)` pair, which
    /// covers both "absent" and "owned by someone else".
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_link_with_style(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<Option<LinkWithStyle>, AppError>;

    /// Lists a user's links with their transition counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_links_by_user(&self, user_id: i64) -> Result<Vec<LinkSummary>, AppError>;

    /// Lists a user's links whose name contains `query`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn search_links_by_name(
        &self,
        user_id: i64,
        query: &str,
    ) -> Result<Vec<LinkSummary>, AppError>;

    /// Appends one transition row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create_transition(&self, transition: NewTransition) -> Result<(), AppError>;

    /// Lists a link's transitions, newest first, scoped to the link's owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn get_transitions_by_link(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<Vec<Transition>, AppError>;
}

/// One open store transaction.
///
/// Reads issued through the handle observe the transaction's own writes, which
/// is what makes the hash check-then-insert race-free. Dropping the handle
/// without committing rolls everything back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStoreTx: Send {
    /// Reports whether a hash is already taken, as seen from inside the
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors. Errors must abort
    /// the caller's allocation; they are never "slot free".
    async fn hash_exists(&mut self, hash: &str) -> Result<bool, AppError>;

    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the hash collides at insert time,
    /// [`AppError::Internal`] on other database errors.
    async fn insert_link(&mut self, link: NewLink) -> Result<Link, AppError>;

    /// Inserts the QR style row accompanying a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert_qr_style(&mut self, style: QrStyle) -> Result<(), AppError>;

    /// Updates a link's target URL, scoped to its owner.
    ///
    /// # Returns
    ///
    /// The number of rows affected; `0` means the `(id, owner)` pair matched
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_link_url(
        &mut self,
        link_id: i64,
        user_id: i64,
        original_url: &str,
    ) -> Result<u64, AppError>;

    /// Replaces a link's QR style parameters.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn update_qr_style(&mut self, style: QrStyle) -> Result<(), AppError>;

    /// Reports whether the `(id, owner)` pair matches an existing link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn link_owned_by(&mut self, link_id: i64, user_id: i64) -> Result<bool, AppError>;

    /// Deletes all transitions of a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_transitions(&mut self, link_id: i64) -> Result<(), AppError>;

    /// Deletes a link's QR style row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_qr_style(&mut self, link_id: i64) -> Result<(), AppError>;

    /// Deletes a link, scoped to its owner.
    ///
    /// # Returns
    ///
    /// The number of rows affected; `0` means the `(id, owner)` pair matched
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete_link(&mut self, link_id: i64, user_id: i64) -> Result<u64, AppError>;

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the commit fails or the handle was
    /// already consumed.
    async fn commit(&mut self) -> Result<(), AppError>;
}
