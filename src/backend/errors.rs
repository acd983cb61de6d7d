use std::error::Error as _;

use thiserror::Error;

/// Errors from upstream model providers.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Non-2xx reply; `message` carries the provider's own error text.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Rendered with its whole source chain; reqwest's own message stops at
    /// "error sending request" and hides the cause.
    #[error("{}", with_sources(.0))]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

impl BackendError {
    /// Whether the provider rejected the call for quota or rate-limit reasons.
    pub fn is_quota_exhausted(&self) -> bool {
        if let BackendError::Api { status: 429, .. } = self {
            return true;
        }
        let text = self.to_string();
        text.contains("429") || text.contains("RESOURCE_EXHAUSTED")
    }
}

/// "outer: cause: root cause", skipping links that repeat the previous one.
fn with_sources(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut last = text.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !last.contains(&message) {
            text.push_str(": ");
            text.push_str(&message);
        }
        last = message;
        source = cause.source();
    }
    text
}
