use crate::cache::IsochroneCache;
use crate::error::Result;
use crate::isochrone::{Isochrone, IsochroneKey};
use crate::limiter::{RateLimitPolicy, RateLimiter};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Something that can turn a point and a duration into an isochrone.
#[async_trait]
pub trait IsochroneSource: Send + Sync {
    async fn fetch(&self, key: IsochroneKey) -> Result<Isochrone>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrievalStats {
    /// Requests answered from the cache.
    pub hits: usize,
    /// Requests that went to the provider, successful or not.
    pub calls: usize,
    pub failures: usize,
}

/// Cached, rate-limited front for an [`IsochroneSource`].
pub struct IsochroneRetriever<S> {
    source: S,
    cache: IsochroneCache,
    limiter: RateLimiter,
    stats: RetrievalStats,
}

impl<S: IsochroneSource> IsochroneRetriever<S> {
    pub fn new(source: S) -> Self {
        Self::with_policy(source, RateLimitPolicy::default())
    }

    pub fn with_policy(source: S, policy: RateLimitPolicy) -> Self {
        Self {
            source,
            cache: IsochroneCache::new(),
            limiter: RateLimiter::new(policy),
            stats: RetrievalStats::default(),
        }
    }

    /// Returns the isochrone for the exact `(longitude, latitude, seconds)`
    /// triple, calling the provider only on a cache miss.
    pub async fn retrieve(
        &mut self,
        longitude: f64,
        latitude: f64,
        seconds: u32,
    ) -> Result<Arc<Isochrone>> {
        let key = IsochroneKey::new(longitude, latitude, seconds);

        if let Some(hit) = self.cache.get(&key) {
            self.stats.hits += 1;
            debug!("Cache hit for ({}, {}) at {}s", longitude, latitude, seconds);
            return Ok(hit);
        }

        self.limiter.acquire().await;
        self.stats.calls += 1;

        match self.source.fetch(key).await {
            Ok(isochrone) => Ok(self.cache.put(isochrone)),
            Err(e) => {
                self.stats.failures += 1;
                warn!("Isochrone retrieval failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn cache(&self) -> &IsochroneCache {
        &self.cache
    }

    pub fn stats(&self) -> RetrievalStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Swaps the provider while keeping cached results.
    pub fn replace_source(&mut self, source: S) {
        self.source = source;
    }
}
