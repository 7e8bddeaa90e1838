use thiserror::Error;

/// Errors returned by [`PatreonClient`](crate::PatreonClient) operations.
#[derive(Debug, Error)]
pub enum PatreonError {
    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Patreon answered with a non-success status.
    #[error("Patreon API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON:API document.
    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PatreonError>;
