//! Geo resolver implementations.
//!
//! The contract lives in [`crate::domain::geo`]; this module provides the
//! IPinfo-backed resolver, the disabled fallback, and the env-driven factory.

pub mod ipinfo;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::domain::geo::{GeoLocation, GeoResolver};

pub use ipinfo::IpinfoLiteResolver;

/// Resolver used when geo lookups are disabled; every address is unknown.
pub struct NoopGeoResolver;

#[async_trait]
impl GeoResolver for NoopGeoResolver {
    async fn resolve(&self, _ip: &str) -> Option<GeoLocation> {
        None
    }
}

/// Picks a resolver from configuration: IPinfo Lite when a token is present,
/// otherwise the no-op resolver.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn GeoResolver>> {
    match &config.ipinfo_token {
        Some(token) => {
            tracing::info!("Using IPinfo Lite for geo resolving");
            let resolver = IpinfoLiteResolver::new(
                token.clone(),
                Duration::from_millis(config.geo_http_timeout_ms),
            )?;
            Ok(Arc::new(resolver))
        }
        None => {
            tracing::warn!("No IPINFO_TOKEN; geo resolving disabled");
            Ok(Arc::new(NoopGeoResolver))
        }
    }
}
