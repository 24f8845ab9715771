//! OpenAI Client
//!
//! Main client for the OpenAI REST API, combining the explicit
//! [`ClientConfig`] with the HTTP transport.

use super::http::ApiHttpClient;
use crate::config::ClientConfig;
use crate::error::{OaitError, Result};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Page size of list endpoints; only a single page is ever requested
pub const LIST_LIMIT: usize = 100;

const BETA_HEADER: &str = "OpenAI-Beta";
const BETA_VALUE: &str = "assistants=v2";
const ORG_HEADER: &str = "OpenAI-Organization";

/// List envelope returned by collection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default)]
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Main OpenAI client
#[derive(Clone)]
pub struct OpenAiClient {
    config: ClientConfig,
    http: ApiHttpClient,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OpenAiClient({})", self.config.base_url)
    }
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            config,
            http: ApiHttpClient::new()?,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build an absolute URL from a route relative to the base URL
    pub fn url(&self, route: &str) -> Result<String> {
        self.config
            .base_url
            .join(route)
            .map(String::from)
            .map_err(|e| OaitError::Input(format!("invalid route '{}': {}", route, e)))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request_as(method, url, &self.config.api_key)
    }

    fn request_as(&self, method: Method, url: &str, bearer: &str) -> RequestBuilder {
        let mut request = self
            .http
            .inner()
            .request(method, url)
            .bearer_auth(bearer)
            .header(BETA_HEADER, BETA_VALUE);

        if let Some(org) = &self.config.org_id {
            request = request.header(ORG_HEADER, org);
        }

        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        let url = self.url(route)?;
        tracing::debug!("GET {}", url);
        self.http.send(&url, self.request(Method::GET, &url)).await
    }

    /// Make a POST request with a JSON body
    pub async fn post<B, T>(&self, route: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(route)?;
        tracing::debug!("POST {}", url);
        self.http
            .send(&url, self.request(Method::POST, &url).json(body))
            .await
    }

    /// Make a multipart POST request
    pub async fn post_multipart<T: DeserializeOwned>(&self, route: &str, form: Form) -> Result<T> {
        let url = self.url(route)?;
        tracing::debug!("POST (multipart) {}", url);
        self.http
            .send(&url, self.request(Method::POST, &url).multipart(form))
            .await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, route: &str) -> Result<T> {
        let url = self.url(route)?;
        tracing::debug!("DELETE {}", url);
        self.http.send(&url, self.request(Method::DELETE, &url)).await
    }

    /// Fetch the first (and only) page of a collection
    pub async fn list_page<T: DeserializeOwned>(&self, route: &str) -> Result<Vec<T>> {
        let list: List<T> = self
            .get(&format!("{}?limit={}", route, LIST_LIMIT))
            .await?;
        Ok(Self::first_page(route, list))
    }

    /// [`list_page`](Self::list_page) authenticated with `bearer` instead of
    /// the API key; per-item calls keep using the key.
    pub async fn list_page_as<T: DeserializeOwned>(
        &self,
        route: &str,
        bearer: &str,
    ) -> Result<Vec<T>> {
        let url = self.url(&format!("{}?limit={}", route, LIST_LIMIT))?;
        tracing::debug!("GET {} (session)", url);
        let list: List<T> = self
            .http
            .send(&url, self.request_as(Method::GET, &url, bearer))
            .await?;
        Ok(Self::first_page(route, list))
    }

    fn first_page<T>(route: &str, list: List<T>) -> Vec<T> {
        if list.has_more {
            tracing::warn!(
                "{} has more than {} entries; only the first page is used",
                route,
                LIST_LIMIT
            );
        }

        list.data
    }
}

/// Build `<collection>/<id>` with the ID percent-encoded as a single segment
pub fn item_route(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}
