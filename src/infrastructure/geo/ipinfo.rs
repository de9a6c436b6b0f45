//! IPinfo Lite geo resolver with a TTL cache.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde::Deserialize;

use crate::domain::geo::{GeoLocation, GeoResolver};

/// Successful lookups stay cached for this long.
const POSITIVE_TTL: Duration = Duration::from_secs(10 * 60);
/// Failed and not-found lookups expire quickly so a transient upstream
/// failure recovers fast.
const NEGATIVE_TTL: Duration = Duration::from_secs(60);
/// Upper bound on cached prefixes.
const CACHE_CAPACITY: u64 = 10_000;

/// Best-effort IP to country lookup against the IPinfo Lite endpoint.
///
/// Lookups are cached per coarsened network prefix (`/24` for IPv4, `/48` for
/// IPv6) rather than per exact address, and every HTTP call is bounded by the
/// client timeout. Any failure resolves to `None`; this type never errors.
pub struct IpinfoLiteResolver {
    http: reqwest::Client,
    token: String,
    cache: Cache<String, CachedLookup>,
}

#[derive(Debug, Clone)]
struct CachedLookup {
    country: Option<String>,
}

/// Per-entry TTL: positive results live longer than negative ones.
struct LookupExpiry;

impl Expiry<String, CachedLookup> for LookupExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedLookup,
        _created_at: Instant,
    ) -> Option<Duration> {
        if value.country.is_some() {
            Some(POSITIVE_TTL)
        } else {
            Some(NEGATIVE_TTL)
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpinfoLiteResponse {
    #[serde(default)]
    country: String,
}

impl IpinfoLiteResolver {
    /// Creates a resolver with the given API token and per-request timeout.
    pub fn new(token: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build geo HTTP client")?;

        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .expire_after(LookupExpiry)
            .build();

        Ok(Self { http, token, cache })
    }
}

#[async_trait]
impl GeoResolver for IpinfoLiteResolver {
    async fn resolve(&self, ip: &str) -> Option<GeoLocation> {
        let parsed: IpAddr = ip.trim().parse().ok()?;
        let key = subnet_key(&parsed);

        if let Some(cached) = self.cache.get(&key).await {
            return cached.country.map(|country| GeoLocation {
                country: Some(country),
                city: None,
            });
        }

        let response = self
            .http
            .get(format!("https://ipinfo.io/{parsed}/json"))
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            self.cache.insert(key, CachedLookup { country: None }).await;
            return None;
        }

        let data: IpinfoLiteResponse = response.json().await.ok()?;
        let country = if data.country.is_empty() {
            None
        } else {
            Some(data.country)
        };
        self.cache
            .insert(key, CachedLookup { country: country.clone() })
            .await;

        country.map(|country| GeoLocation {
            country: Some(country),
            city: None,
        })
    }
}

/// Coarsens an address to its cache key: `a.b.c.0/24` for IPv4, the /48
/// prefix for IPv6.
fn subnet_key(ip: &IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let o = v4.octets();
            format!("{}.{}.{}.0/24", o[0], o[1], o[2])
        }
        IpAddr::V6(v6) => {
            let s = v6.segments();
            format!("{:x}:{:x}:{:x}::/48", s[0], s[1], s[2])
        }
    }
}
