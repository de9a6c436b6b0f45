//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; the concrete
//! implementation lives in `crate::infrastructure::persistence`. Mock
//! implementations are auto-generated via `mockall` for testing.

pub mod link_store;

pub use link_store::{LinkStore, LinkStoreTx};

#[cfg(test)]
pub use link_store::{MockLinkStore, MockLinkStoreTx};
