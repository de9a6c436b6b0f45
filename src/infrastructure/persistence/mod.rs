//! Concrete data-access implementations.

pub mod pg_link_store;

pub use pg_link_store::PgLinkStore;
