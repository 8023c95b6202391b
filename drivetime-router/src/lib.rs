pub mod cache;
pub mod client;
pub mod error;
pub mod isochrone;
pub mod limiter;
pub mod retriever;

pub use cache::IsochroneCache;
pub use client::{ApiKey, OpenRouteServiceClient};
pub use error::RetrievalError;
pub use isochrone::{Geometry, Isochrone, IsochroneKey};
pub use limiter::{RateLimitPolicy, RateLimiter};
pub use retriever::{IsochroneRetriever, IsochroneSource, RetrievalStats};
