use thiserror::Error;

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Provider rejected request (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Provider returned no isochrone for ({longitude}, {latitude}) at {seconds}s")]
    EmptyResponse {
        longitude: f64,
        latitude: f64,
        seconds: u32,
    },
}

impl RetrievalError {
    /// The message to surface to the user, without transport noise.
    pub fn provider_message(&self) -> String {
        match self {
            RetrievalError::Provider { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RetrievalError>;
