//! Link creation, editing, redirect, and listing service.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::entities::{Link, LinkSummary, LinkWithStyle, NewLink, QrStyle, Transition};
use crate::domain::repositories::{LinkStore, LinkStoreTx};
use crate::domain::transition_event::TransitionEvent;
use crate::error::AppError;
use crate::qr::{self, QrFormat, normalize_hex};
use crate::utils::hash_generator::generate_hash;
use crate::utils::url_normalizer::normalize_url;

/// Bounded number of hash allocation attempts per link creation.
const MAX_HASH_ATTEMPTS: usize = 5;

/// Requested changes for an existing link.
#[derive(Debug, Clone)]
pub struct EditLink {
    pub original_url: String,
    pub color: String,
    pub background: String,
    pub smoothing: f64,
}

/// Sort key for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSortBy {
    #[default]
    CreatedAt,
    Transitions,
}

/// Sort direction for link listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A rendered QR code ready to be served as a download.
#[derive(Debug, Clone)]
pub struct QrDownload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Service orchestrating links, their QR styles, and the redirect pipeline.
///
/// Multi-step writes (create, edit, delete) run inside one store transaction
/// and roll back entirely on any step's failure. Redirects enqueue a
/// [`TransitionEvent`] for the background recorder and never wait for it.
pub struct LinkService<S: LinkStore> {
    store: Arc<S>,
    transition_tx: mpsc::Sender<TransitionEvent>,
}

impl<S: LinkStore> LinkService<S> {
    /// Creates a new link service.
    ///
    /// `transition_tx` is the sending side of the channel drained by
    /// [`crate::domain::transition_worker::run_transition_worker`].
    pub fn new(store: Arc<S>, transition_tx: mpsc::Sender<TransitionEvent>) -> Self {
        Self {
            store,
            transition_tx,
        }
    }

    /// Creates a link with a freshly allocated hash and the default QR style.
    ///
    /// Hash allocation, the link insert, and the style insert share one
    /// transaction, so two concurrent creations cannot claim the same free
    /// hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or empty name,
    /// [`AppError::AllocationExhausted`] when no free hash is found within
    /// the attempt bound, and [`AppError::Internal`] on store errors.
    pub async fn create_link(
        &self,
        original_url: &str,
        name: &str,
        user_id: i64,
    ) -> Result<Link, AppError> {
        let normalized_url = normalize_url(original_url)
            .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e })))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("Name must not be empty", json!({})));
        }

        let mut tx = self.store.begin().await?;

        let hash = allocate_hash(tx.as_mut()).await?;

        let link = tx
            .insert_link(NewLink {
                user_id,
                original_url: normalized_url,
                hash,
                name: name.to_string(),
            })
            .await?;
        tx.insert_qr_style(QrStyle::defaults(link.id)).await?;

        tx.commit().await?;

        Ok(link)
    }

    /// Loads a link together with its QR style, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the `(id, owner)` pair matches
    /// nothing, which also covers links owned by someone else.
    pub async fn get_link_with_style(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<LinkWithStyle, AppError> {
        self.store
            .get_link_with_style(link_id, user_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Link not found or access denied", json!({ "id": link_id }))
            })
    }

    /// Lists all links of a user with their transition counts.
    pub async fn get_all_links(&self, user_id: i64) -> Result<Vec<LinkSummary>, AppError> {
        self.store.get_links_by_user(user_id).await
    }

    /// Lists a user's links whose name matches `query`.
    pub async fn search_links_by_name(
        &self,
        user_id: i64,
        query: &str,
    ) -> Result<Vec<LinkSummary>, AppError> {
        self.store.search_links_by_name(user_id, query).await
    }

    /// Lists links with optional name filtering and ordering.
    ///
    /// Search and sort compose: the name filter narrows the set first, then
    /// the sort orders it.
    pub async fn list_links(
        &self,
        user_id: i64,
        search: Option<&str>,
        by: LinkSortBy,
        order: SortOrder,
    ) -> Result<Vec<LinkSummary>, AppError> {
        let links = match search.map(str::trim).filter(|q| !q.is_empty()) {
            Some(query) => self.store.search_links_by_name(user_id, query).await?,
            None => self.store.get_links_by_user(user_id).await?,
        };
        Ok(sort_links(links, by, order))
    }

    /// Updates a link's target URL and QR style in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL, non-6-hex color,
    /// or smoothing outside `[0, 0.5]`; [`AppError::NotFound`] when the
    /// `(id, owner)` pair matches nothing, leaving the link untouched.
    pub async fn edit_link(
        &self,
        link_id: i64,
        user_id: i64,
        edit: EditLink,
    ) -> Result<(), AppError> {
        let normalized_url = normalize_url(&edit.original_url)
            .map_err(|e| AppError::bad_request("Invalid URL format", json!({ "reason": e })))?;
        let color = normalize_hex(&edit.color).ok_or_else(|| {
            AppError::bad_request("Color must be 6 hex digits", json!({ "color": edit.color }))
        })?;
        let background = normalize_hex(&edit.background).ok_or_else(|| {
            AppError::bad_request(
                "Background must be 6 hex digits",
                json!({ "background": edit.background }),
            )
        })?;
        if !(0.0..=0.5).contains(&edit.smoothing) {
            return Err(AppError::bad_request(
                "Smoothing must be within [0, 0.5]",
                json!({ "smoothing": edit.smoothing }),
            ));
        }

        let mut tx = self.store.begin().await?;

        let updated = tx.update_link_url(link_id, user_id, &normalized_url).await?;
        if updated == 0 {
            return Err(AppError::not_found(
                "Link not found or access denied",
                json!({ "id": link_id }),
            ));
        }

        tx.update_qr_style(QrStyle::new(link_id, color, background, edit.smoothing))
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Resolves a hash to its target URL and enqueues the visit for
    /// background recording.
    ///
    /// The recording is never awaited; a full queue drops the event rather
    /// than delaying the redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown hash; no transition is
    /// recorded in that case.
    pub async fn redirect(
        &self,
        hash: &str,
        referer: &str,
        user_agent: &str,
        ip: &str,
    ) -> Result<String, AppError> {
        let link = self
            .store
            .get_link_by_hash(hash)
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "hash": hash })))?;

        let event = TransitionEvent::new(link.id, referer, user_agent, ip);
        if self.transition_tx.try_send(event).is_err() {
            warn!(link_id = link.id, "transition queue full; dropping event");
            metrics::counter!("transitions_dropped_total").increment(1);
        }

        Ok(link.original_url)
    }

    /// Lists a link's recorded transitions, scoped to the link's owner.
    pub async fn get_transitions(
        &self,
        link_id: i64,
        user_id: i64,
    ) -> Result<Vec<Transition>, AppError> {
        self.store.get_transitions_by_link(link_id, user_id).await
    }

    /// Deletes a link and everything attached to it in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the `(id, owner)` pair matches
    /// nothing; nothing is deleted in that case.
    pub async fn delete_link(&self, link_id: i64, user_id: i64) -> Result<(), AppError> {
        let mut tx = self.store.begin().await?;

        if !tx.link_owned_by(link_id, user_id).await? {
            return Err(AppError::not_found(
                "Link not found or access denied",
                json!({ "id": link_id }),
            ));
        }

        tx.delete_transitions(link_id).await?;
        tx.delete_qr_style(link_id).await?;

        let deleted = tx.delete_link(link_id, user_id).await?;
        if deleted == 0 {
            return Err(AppError::not_found(
                "Link not found or access denied",
                json!({ "id": link_id }),
            ));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Renders a link's QR code with its stored style, ready for download.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the `(id, owner)` pair matches
    /// nothing, [`AppError::Internal`] if rendering fails.
    pub async fn download_qr(
        &self,
        link_id: i64,
        user_id: i64,
        format: QrFormat,
    ) -> Result<QrDownload, AppError> {
        let link = self.get_link_with_style(link_id, user_id).await?;

        let bytes = qr::render(
            &link.original_url,
            &link.style.color,
            &link.style.background,
            link.style.smoothing,
            format,
        )?;

        Ok(QrDownload {
            bytes,
            content_type: format.content_type(),
            file_name: format.file_name(link_id),
        })
    }
}

/// Allocates a hash inside the open transaction, probing the store for each
/// candidate.
///
/// A taken hash triggers another attempt; any probe error aborts allocation
/// immediately. Exhausting the bound is a correctness signal and surfaces as
/// [`AppError::AllocationExhausted`].
async fn allocate_hash(tx: &mut dyn LinkStoreTx) -> Result<String, AppError> {
    for _ in 0..MAX_HASH_ATTEMPTS {
        let hash = generate_hash()?;
        if !tx.hash_exists(&hash).await? {
            return Ok(hash);
        }
    }

    Err(AppError::allocation_exhausted(
        "Could not allocate a unique hash",
        json!({ "attempts": MAX_HASH_ATTEMPTS }),
    ))
}

/// Stable sort of link summaries; equal keys keep their incoming order.
pub fn sort_links(
    mut items: Vec<LinkSummary>,
    by: LinkSortBy,
    order: SortOrder,
) -> Vec<LinkSummary> {
    match (by, order) {
        (LinkSortBy::CreatedAt, SortOrder::Asc) => {
            items.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        (LinkSortBy::CreatedAt, SortOrder::Desc) => {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        (LinkSortBy::Transitions, SortOrder::Asc) => {
            items.sort_by(|a, b| a.transitions.cmp(&b.transitions));
        }
        (LinkSortBy::Transitions, SortOrder::Desc) => {
            items.sort_by(|a, b| b.transitions.cmp(&a.transitions));
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geo::{GeoLocation, MockGeoResolver};
    use crate::domain::repositories::{MockLinkStore, MockLinkStoreTx};
    use crate::domain::transition_worker::{
        DEFAULT_RECORD_TIMEOUT, TransitionRecorder, run_transition_worker,
    };
    use chrono::{Duration as ChronoDuration, Utc};
    use std::time::Duration;

    const CHROME_ON_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.75 Safari/537.36";

    fn link_from_new(id: i64, new: &NewLink) -> Link {
        Link::new(
            id,
            new.user_id,
            new.original_url.clone(),
            new.hash.clone(),
            new.name.clone(),
            Utc::now(),
            Utc::now(),
        )
    }

    fn test_link(id: i64, hash: &str, url: &str) -> Link {
        Link::new(
            id,
            1,
            url.to_string(),
            hash.to_string(),
            "test".to_string(),
            Utc::now(),
            Utc::now(),
        )
    }

    fn summary(id: i64, created_offset_secs: i64, transitions: i64) -> LinkSummary {
        LinkSummary {
            id,
            original_url: "https://example.com".to_string(),
            name: format!("link-{id}"),
            created_at: Utc::now() + ChronoDuration::seconds(created_offset_secs),
            transitions,
        }
    }

    fn service_with(
        store: MockLinkStore,
        capacity: usize,
    ) -> (
        LinkService<MockLinkStore>,
        mpsc::Receiver<TransitionEvent>,
    ) {
        let (tx, rx) = mpsc::channel(capacity);
        (LinkService::new(Arc::new(store), tx), rx)
    }

    #[tokio::test]
    async fn test_create_link_allocates_hash_and_default_style() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_hash_exists().times(1).returning(|_| Ok(false));
            tx.expect_insert_link()
                .withf(|link| {
                    link.hash.len() == 7
                        && link.user_id == 9
                        && link.original_url == "https://example.com/"
                        && link.name == "My link"
                })
                .times(1)
                .returning(|link| Ok(link_from_new(10, &link)));
            tx.expect_insert_qr_style()
                .withf(|style| {
                    style.link_id == 10
                        && style.color == "000000"
                        && style.background == "FFFFFF"
                        && style.smoothing == 0.0
                })
                .times(1)
                .returning(|_| Ok(()));
            tx.expect_commit().times(1).returning(|| Ok(()));
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        let link = service
            .create_link("https://EXAMPLE.com", "  My link  ", 9)
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert_eq!(link.hash.len(), 7);
    }

    #[tokio::test]
    async fn test_create_link_retries_taken_hashes() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            let mut probes = 0;
            tx.expect_hash_exists().times(3).returning(move |_| {
                probes += 1;
                Ok(probes < 3)
            });
            tx.expect_insert_link()
                .times(1)
                .returning(|link| Ok(link_from_new(1, &link)));
            tx.expect_insert_qr_style().times(1).returning(|_| Ok(()));
            tx.expect_commit().times(1).returning(|| Ok(()));
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        assert!(
            service
                .create_link("https://example.com", "x", 1)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_create_link_exhausts_after_five_taken_probes() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_hash_exists().times(5).returning(|_| Ok(true));
            tx.expect_insert_link().times(0);
            tx.expect_insert_qr_style().times(0);
            tx.expect_commit().times(0);
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        let err = service
            .create_link("https://example.com", "x", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AllocationExhausted { .. }));
    }

    #[tokio::test]
    async fn test_create_link_aborts_on_probe_error() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_hash_exists()
                .times(1)
                .returning(|_| Err(AppError::internal("probe failed", json!({}))));
            tx.expect_insert_link().times(0);
            tx.expect_commit().times(0);
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        let err = service
            .create_link("https://example.com", "x", 1)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_link_rejects_invalid_url_before_store() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(0);

        let (service, _rx) = service_with(store, 8);
        let err = service.create_link("not-a-url", "x", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let (service, _rx) = service_with(MockLinkStore::new(), 8);
        let err = service
            .create_link("https://example.com", "   ", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_redirect_unknown_hash_is_not_found_and_records_nothing() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_by_hash()
            .withf(|hash| hash == "unknown")
            .times(1)
            .returning(|_| Ok(None));

        let (service, mut rx) = service_with(store, 8);
        let err = service
            .redirect("unknown", "http://x", CHROME_ON_WINDOWS, "8.8.8.8")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(rx.try_recv().is_err(), "no event may be enqueued on a miss");
    }

    #[tokio::test]
    async fn test_redirect_returns_url_and_enqueues_event() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_by_hash()
            .withf(|hash| hash == "abc1234")
            .times(1)
            .returning(|_| Ok(Some(test_link(42, "abc1234", "https://example.com/target"))));

        let (service, mut rx) = service_with(store, 8);
        let url = service
            .redirect("abc1234", "http://x", CHROME_ON_WINDOWS, "8.8.8.8")
            .await
            .unwrap();

        assert_eq!(url, "https://example.com/target");

        let event = rx.try_recv().expect("event must be enqueued synchronously");
        assert_eq!(event.link_id, 42);
        assert_eq!(event.referer.as_deref(), Some("http://x"));
        assert_eq!(event.user_agent.as_deref(), Some(CHROME_ON_WINDOWS));
        assert_eq!(event.ip.as_deref(), Some("8.8.8.8"));
    }

    #[tokio::test]
    async fn test_redirect_survives_full_queue() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_by_hash()
            .times(2)
            .returning(|_| Ok(Some(test_link(1, "abc1234", "https://example.com"))));

        // Capacity 1 and nobody draining: the second event is dropped.
        let (service, _rx) = service_with(store, 1);
        assert!(service.redirect("abc1234", "", "", "").await.is_ok());
        assert!(service.redirect("abc1234", "", "", "").await.is_ok());
    }

    #[tokio::test]
    async fn test_redirect_pipeline_records_exactly_one_transition() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_by_hash()
            .times(1)
            .returning(|_| Ok(Some(test_link(42, "abc1234", "https://example.com/target"))));

        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        store
            .expect_create_transition()
            .withf(|t| {
                t.link_id == 42
                    && t.browser.as_deref() == Some("Chrome")
                    && t.os.as_deref() == Some("Windows")
                    && t.referer.as_deref() == Some("http://x")
                    && t.country.as_deref() == Some("US")
            })
            .times(1)
            .returning(move |_| {
                let _ = done_tx.try_send(());
                Ok(())
            });
        let store = Arc::new(store);

        let mut geo = MockGeoResolver::new();
        geo.expect_resolve().withf(|ip| ip == "8.8.8.8").returning(|_| {
            Some(GeoLocation {
                country: Some("US".to_string()),
                city: None,
            })
        });

        let (tx, rx) = mpsc::channel(8);
        let service = LinkService::new(store.clone(), tx);
        let recorder = TransitionRecorder::new(store, Arc::new(geo));
        let worker = tokio::spawn(run_transition_worker(rx, recorder, DEFAULT_RECORD_TIMEOUT));

        let url = service
            .redirect("abc1234", "http://x", CHROME_ON_WINDOWS, "8.8.8.8")
            .await
            .unwrap();
        assert_eq!(url, "https://example.com/target");

        tokio::time::timeout(Duration::from_secs(2), done_rx.recv())
            .await
            .expect("transition not recorded");

        drop(service);
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_edit_link_for_non_owner_is_not_found_and_changes_nothing() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_update_link_url().times(1).returning(|_, _, _| Ok(0));
            tx.expect_update_qr_style().times(0);
            tx.expect_commit().times(0);
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        let err = service
            .edit_link(
                5,
                999,
                EditLink {
                    original_url: "https://example.com/new".to_string(),
                    color: "112233".to_string(),
                    background: "FFFFFF".to_string(),
                    smoothing: 0.2,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_edit_link_updates_url_and_style_transactionally() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_update_link_url()
                .withf(|id, user_id, url| {
                    *id == 5 && *user_id == 1 && url == "https://example.com/new"
                })
                .times(1)
                .returning(|_, _, _| Ok(1));
            tx.expect_update_qr_style()
                .withf(|style| {
                    style.link_id == 5
                        && style.color == "AABBCC"
                        && style.background == "FFFFFF"
                        && style.smoothing == 0.2
                })
                .times(1)
                .returning(|_| Ok(()));
            tx.expect_commit().times(1).returning(|| Ok(()));
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        service
            .edit_link(
                5,
                1,
                EditLink {
                    original_url: "https://example.com/new".to_string(),
                    color: "#aabbcc".to_string(),
                    background: "FFFFFF".to_string(),
                    smoothing: 0.2,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_edit_link_validates_before_touching_store() {
        let bad_color = EditLink {
            original_url: "https://example.com".to_string(),
            color: "zzz".to_string(),
            background: "FFFFFF".to_string(),
            smoothing: 0.0,
        };
        let bad_smoothing = EditLink {
            original_url: "https://example.com".to_string(),
            color: "000000".to_string(),
            background: "FFFFFF".to_string(),
            smoothing: 0.7,
        };

        for edit in [bad_color, bad_smoothing] {
            let mut store = MockLinkStore::new();
            store.expect_begin().times(0);
            let (service, _rx) = service_with(store, 8);

            let err = service.edit_link(1, 1, edit).await.unwrap_err();
            assert!(matches!(err, AppError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn test_get_link_with_style_miss_is_not_found() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_with_style()
            .times(1)
            .returning(|_, _| Ok(None));

        let (service, _rx) = service_with(store, 8);
        let err = service.get_link_with_style(1, 2).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_link_for_non_owner_deletes_nothing() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            tx.expect_link_owned_by().times(1).returning(|_, _| Ok(false));
            tx.expect_delete_transitions().times(0);
            tx.expect_delete_qr_style().times(0);
            tx.expect_delete_link().times(0);
            tx.expect_commit().times(0);
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        let err = service.delete_link(5, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_link_cascades_in_order() {
        let mut store = MockLinkStore::new();
        store.expect_begin().times(1).returning(|| {
            let mut tx = MockLinkStoreTx::new();
            let mut seq = mockall::Sequence::new();
            tx.expect_link_owned_by()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(true));
            tx.expect_delete_transitions()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
            tx.expect_delete_qr_style()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
            tx.expect_delete_link()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(1));
            tx.expect_commit()
                .times(1)
                .in_sequence(&mut seq)
                .returning(|| Ok(()));
            Ok(Box::new(tx) as Box<dyn LinkStoreTx>)
        });

        let (service, _rx) = service_with(store, 8);
        service.delete_link(5, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_download_qr_uses_stored_style() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_link_with_style()
            .times(1)
            .returning(|link_id, _| {
                Ok(Some(LinkWithStyle {
                    id: link_id,
                    original_url: "https://example.com/target".to_string(),
                    hash: "abc1234".to_string(),
                    name: "test".to_string(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    style: QrStyle::defaults(link_id),
                }))
            });

        let (service, _rx) = service_with(store, 8);
        let download = service.download_qr(5, 1, QrFormat::Png).await.unwrap();

        assert_eq!(download.content_type, "image/png");
        assert_eq!(download.file_name, "qr-5.png");
        assert_eq!(&download.bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_sort_links_defaults_to_newest_first() {
        let items = vec![summary(1, 0, 5), summary(2, 10, 1), summary(3, -10, 9)];
        let sorted = sort_links(items, LinkSortBy::default(), SortOrder::default());
        let ids: Vec<i64> = sorted.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_links_by_transitions() {
        let items = vec![summary(1, 0, 5), summary(2, 1, 1), summary(3, 2, 9)];

        let asc = sort_links(items.clone(), LinkSortBy::Transitions, SortOrder::Asc);
        let ids: Vec<i64> = asc.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        let desc = sort_links(items, LinkSortBy::Transitions, SortOrder::Desc);
        let ids: Vec<i64> = desc.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_links_is_stable_on_equal_keys() {
        let t = Utc::now();
        let mut a = summary(1, 0, 3);
        let mut b = summary(2, 0, 3);
        a.created_at = t;
        b.created_at = t;

        let sorted = sort_links(vec![a, b], LinkSortBy::CreatedAt, SortOrder::Desc);
        let ids: Vec<i64> = sorted.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2], "equal keys keep their incoming order");
    }

    #[tokio::test]
    async fn test_list_links_composes_search_and_sort() {
        let mut store = MockLinkStore::new();
        store
            .expect_search_links_by_name()
            .withf(|user_id, query| *user_id == 1 && query == "promo")
            .times(1)
            .returning(|_, _| Ok(vec![summary(1, 0, 2), summary(2, 5, 8)]));
        store.expect_get_links_by_user().times(0);

        let (service, _rx) = service_with(store, 8);
        let links = service
            .list_links(1, Some("  promo "), LinkSortBy::Transitions, SortOrder::Desc)
            .await
            .unwrap();

        let ids: Vec<i64> = links.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn test_list_links_blank_search_lists_all() {
        let mut store = MockLinkStore::new();
        store
            .expect_get_links_by_user()
            .times(1)
            .returning(|_| Ok(vec![summary(1, 0, 0)]));
        store.expect_search_links_by_name().times(0);

        let (service, _rx) = service_with(store, 8);
        let links = service
            .list_links(1, Some("   "), LinkSortBy::default(), SortOrder::default())
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
    }
}
