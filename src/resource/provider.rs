//! Resource Provider
//!
//! One network round-trip per call. Implementations live next to the wire
//! types in [`crate::openai`].

use crate::error::{OaitError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque, non-empty resource identifier
pub type ResourceId = String;

/// The resource families the tool manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Assistant,
    File,
    Thread,
}

impl ResourceKind {
    /// Plural label used in progress and report messages
    pub fn plural(self) -> &'static str {
        match self {
            ResourceKind::Assistant => "assistants",
            ResourceKind::File => "files",
            ResourceKind::Thread => "threads",
        }
    }

    /// Collection route relative to the API root
    pub fn route(self) -> &'static str {
        self.plural()
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::Assistant => "assistant",
            ResourceKind::File => "file",
            ResourceKind::Thread => "thread",
        };
        f.write_str(name)
    }
}

/// Delete confirmation returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Items that carry their own identity.
///
/// Placeholders substituted for failed fetches report an empty ID.
pub trait Identified {
    fn id(&self) -> &str;

    fn is_placeholder(&self) -> bool {
        self.id().is_empty()
    }
}

#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Fetched item; `Default` is the zero-valued placeholder
    type Item: Identified + Default + Send + 'static;
    /// Creation request body
    type Spec: Send + Sync;

    fn kind(&self) -> ResourceKind;

    async fn fetch(&self, id: &str) -> Result<Self::Item>;

    async fn delete(&self, id: &str) -> Result<DeleteAck>;

    async fn create(&self, spec: &Self::Spec) -> Result<Self::Item>;

    /// Single bounded page of every item visible to the key
    async fn list_all(&self) -> Result<Vec<Self::Item>>;

    /// IDs of the listed items. Providers whose items need extra requests
    /// to load override this to skip them.
    async fn list_ids(&self) -> Result<Vec<ResourceId>> {
        Ok(self
            .list_all()
            .await?
            .iter()
            .map(|item| item.id().to_string())
            .collect())
    }

    /// IDs listed with a session token in place of the API key
    async fn list_session_ids(&self, _session: &str) -> Result<Vec<ResourceId>> {
        Err(OaitError::Input(format!(
            "session listing is not supported for {}",
            self.kind().plural()
        )))
    }
}
