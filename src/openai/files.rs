//! Files

use super::client::{item_route, OpenAiClient};
use crate::error::{OaitError, Result};
use crate::filter::{HasCreatedAt, HasName};
use crate::resource::{DeleteAck, Identified, ResourceKind, ResourceProvider};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileObject {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Upload request: a local file and its intended purpose
#[derive(Debug, Clone)]
pub struct FileSpec {
    pub path: PathBuf,
    pub purpose: String,
}

impl Identified for FileObject {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasCreatedAt for FileObject {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl HasName for FileObject {
    fn name(&self) -> &str {
        &self.filename
    }
}

/// Files endpoint
#[derive(Debug, Clone)]
pub struct FilesApi {
    client: OpenAiClient,
}

impl FilesApi {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceProvider for FilesApi {
    type Item = FileObject;
    type Spec = FileSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::File
    }

    async fn fetch(&self, id: &str) -> Result<FileObject> {
        self.client.get(&item_route(self.kind().route(), id)).await
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck> {
        self.client.delete(&item_route(self.kind().route(), id)).await
    }

    async fn create(&self, spec: &FileSpec) -> Result<FileObject> {
        let file_name = spec
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                OaitError::Input(format!("'{}' is not a file path", spec.path.display()))
            })?;

        let data = tokio::fs::read(&spec.path).await?;
        tracing::debug!("Uploading {} ({} bytes)", file_name, data.len());

        let form = Form::new()
            .text("purpose", spec.purpose.clone())
            .part("file", Part::bytes(data).file_name(file_name));

        self.client.post_multipart(self.kind().route(), form).await
    }

    async fn list_all(&self) -> Result<Vec<FileObject>> {
        self.client.list_page(self.kind().route()).await
    }
}
