//! Geo resolution contract.
//!
//! The resolver is an external collaborator; the core only defines its shape.
//! Resolution is best-effort by contract: implementations must degrade to
//! `None` on any failure and must bound their own latency, because the
//! transition recorder never treats a missing location as an error.

use async_trait::async_trait;

/// Coarse location derived from a client IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub country: Option<String>,
    pub city: Option<String>,
}

/// Best-effort IP to location lookup.
///
/// # Implementations
///
/// - [`crate::infrastructure::geo::IpinfoLiteResolver`] - IPinfo Lite with a TTL cache
/// - [`crate::infrastructure::geo::NoopGeoResolver`] - always unknown
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// Resolves an IP address to a coarse location.
    ///
    /// Returns `None` for malformed input, lookup failure, or an unknown
    /// address; errors are never propagated.
    async fn resolve(&self, ip: &str) -> Option<GeoLocation>;
}
