//! # qrlink
//!
//! URL shortener core: hashed short links, styled QR-code rendering, and
//! asynchronous visit analytics.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, store contracts, the geo
//!   contract, and the transition pipeline
//! - **Application Layer** ([`application`]) - Service orchestration for
//!   links, redirects, and QR downloads
//! - **Infrastructure Layer** ([`infrastructure`]) - PostgreSQL store and the
//!   IPinfo geo resolver
//! - **QR Renderer** ([`qr`]) - Deterministic PNG/SVG/PDF rendering with
//!   configurable colors and corner smoothing
//!
//! The crate is HTTP-agnostic: every operation is a plain async function
//! returning `Result`, ready to sit behind whatever transport the consumer
//! chooses.
//!
//! ## Wiring
//!
//! ```ignore
//! let config = Config::from_env()?;
//! telemetry::init(&config);
//!
//! let pool = PgPoolOptions::new()
//!     .max_connections(config.db_max_connections)
//!     .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
//!     .connect(&config.database_url)
//!     .await?;
//! let store = Arc::new(PgLinkStore::new(pool));
//! let geo = infrastructure::geo::from_config(&config)?;
//!
//! let (tx, rx) = mpsc::channel(config.transition_queue_capacity);
//! tokio::spawn(run_transition_worker(
//!     rx,
//!     TransitionRecorder::new(store.clone(), geo),
//!     Duration::from_secs(config.transition_timeout_secs),
//! ));
//!
//! let links = LinkService::new(store, tx);
//! ```
//!
//! ## Configuration
//!
//! Loaded from environment variables via [`config::Config`]. See [`config`]
//! for available options.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod qr;
pub mod utils;

pub mod config;
pub mod telemetry;

pub use error::AppError;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        EditLink, LinkService, LinkSortBy, QrDownload, QrService, SortOrder,
    };
    pub use crate::config::Config;
    pub use crate::domain::entities::{Link, LinkSummary, LinkWithStyle, QrStyle, Transition};
    pub use crate::domain::geo::{GeoLocation, GeoResolver};
    pub use crate::domain::transition_event::TransitionEvent;
    pub use crate::domain::transition_worker::{TransitionRecorder, run_transition_worker};
    pub use crate::error::AppError;
    pub use crate::infrastructure::persistence::PgLinkStore;
    pub use crate::qr::QrFormat;
}
