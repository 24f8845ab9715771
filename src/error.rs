//! Error taxonomy
//!
//! Per-item transport, decode and API failures are recovered inside the
//! bulk executor; `InvalidArgument` and `Input` surface to the caller.

/// Errors produced by the OpenAI client, the executor and the filters.
#[derive(Debug, thiserror::Error)]
pub enum OaitError {
    /// Network-level failure (connect, send, read body)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body did not match the expected shape
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        error_type: Option<String>,
    },

    /// A filter threshold outside its domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Missing or malformed input at the command boundary
    #[error("invalid input: {0}")]
    Input(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl OaitError {
    /// True for failures that the bulk executor recovers per item.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            OaitError::Transport { .. } | OaitError::Decode { .. } | OaitError::Api { .. }
        )
    }

    /// Short user-facing message without raw response details
    pub fn display_message(&self) -> String {
        match self {
            OaitError::Api { status: 401, .. } => {
                "Authentication failed. Check your API key.".to_string()
            }
            OaitError::Api { status: 403, .. } => {
                "Permission denied. Check your organization access.".to_string()
            }
            OaitError::Api { status: 404, .. } => "Resource not found.".to_string(),
            OaitError::Api { status: 429, .. } => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            OaitError::Api { status, .. } if *status >= 500 => {
                "OpenAI service temporarily unavailable. Please try again.".to_string()
            }
            OaitError::Transport { .. } => {
                "Request failed. Check your network connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OaitError>;
