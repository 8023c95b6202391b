use crate::error::{Result, RetrievalError};
use crate::isochrone::{Geometry, Isochrone, IsochroneKey};
use crate::retriever::IsochroneSource;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";
pub const DRIVING_PROFILE: &str = "driving-car";

/// Provider credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({})", self)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        if self.0.chars().count() > 8 {
            write!(f, "****{}", tail)
        } else {
            write!(f, "********")
        }
    }
}

#[derive(Debug, Serialize)]
struct IsochroneRequest<'a> {
    locations: [[f64; 2]; 1],
    range: [u32; 1],
    range_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProviderError {
    Detailed {
        #[serde(default)]
        code: Option<i64>,
        message: String,
    },
    Plain(String),
}

/// Extracts the provider's human-readable message from an error body.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ProviderError::Detailed { code: Some(code), message },
        }) => format!("{} (code {})", message, code),
        Ok(ErrorBody {
            error: ProviderError::Detailed { code: None, message },
        }) => message,
        Ok(ErrorBody {
            error: ProviderError::Plain(message),
        }) => message,
        Err(_) if !body.trim().is_empty() => body.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown provider error")
            .to_string(),
    }
}

/// HTTP client for the OpenRouteService isochrone endpoint.
pub struct OpenRouteServiceClient {
    client: Client,
    base_url: Url,
    api_key: ApiKey,
}

impl OpenRouteServiceClient {
    pub fn new(api_key: ApiKey) -> Result<Self> {
        Self::with_timeout(api_key, 30)
    }

    pub fn with_timeout(api_key: ApiKey, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("drivetime/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            api_key,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join(&format!("v2/isochrones/{}", DRIVING_PROFILE))
            .map_err(|e| RetrievalError::InvalidUrl(e.to_string()))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| RetrievalError::InvalidUrl(format!("{}: {}", raw, e)))
}

#[async_trait]
impl IsochroneSource for OpenRouteServiceClient {
    async fn fetch(&self, key: IsochroneKey) -> Result<Isochrone> {
        let url = self.endpoint()?;
        let request = IsochroneRequest {
            locations: [[key.longitude, key.latitude]],
            range: [key.seconds],
            range_type: "time",
        };

        info!(
            "Requesting {}s isochrone at ({}, {})",
            key.seconds, key.longitude, key.latitude
        );

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, self.api_key.expose())
            .header(ACCEPT, "application/json, application/geo+json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = provider_message(status, &body);
            warn!("Provider returned {}: {}", status, message);
            return Err(RetrievalError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let collection: FeatureCollection = serde_json::from_str(&body)
            .map_err(|e| RetrievalError::ParseError(format!("Invalid isochrone response: {}", e)))?;

        let feature = collection
            .features
            .into_iter()
            .next()
            .ok_or(RetrievalError::EmptyResponse {
                longitude: key.longitude,
                latitude: key.latitude,
                seconds: key.seconds,
            })?;

        debug!(
            "Received {} with {} vertices",
            feature.geometry.kind(),
            feature.geometry.vertex_count()
        );

        Ok(Isochrone::new(key, feature.geometry))
    }
}
