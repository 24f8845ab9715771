//! HTTP utilities for OpenAI REST API calls

use crate::error::{OaitError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut cut = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    error_type: Option<String>,
}

/// HTTP client wrapper for OpenAI API calls
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("oait/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| OaitError::Transport {
                url: String::new(),
                source,
            })?;

        Ok(Self { client })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Send a prepared request and decode a JSON body
    pub async fn send<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|source| OaitError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| OaitError::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(classify_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|source| {
            tracing::warn!("Undecodable response from {}: {}", url, sanitize_for_log(&body));
            OaitError::Decode {
                url: url.to_string(),
                source,
            }
        })
    }
}

/// Build an `Api` error from a non-success response body
fn classify_error(status: u16, body: &str) -> OaitError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => OaitError::Api {
            status,
            message: envelope.error.message,
            error_type: envelope.error.error_type,
        },
        Err(_) => OaitError::Api {
            status,
            message: sanitize_for_log(body),
            error_type: None,
        },
    }
}
