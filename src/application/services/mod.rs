//! Application services.

pub mod link_service;
pub mod qr_service;

pub use link_service::{EditLink, LinkService, LinkSortBy, QrDownload, SortOrder, sort_links};
pub use qr_service::QrService;
