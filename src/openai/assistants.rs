//! Assistants

use super::client::{item_route, OpenAiClient};
use crate::error::Result;
use crate::filter::{HasContent, HasCreatedAt, HasMetadata, HasName};
use crate::resource::{DeleteAck, Identified, ResourceKind, ResourceProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

/// Request body for creating an assistant, usually read from a JSON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantSpec {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl Identified for Assistant {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasCreatedAt for Assistant {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

impl HasName for Assistant {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl HasContent for Assistant {
    fn content(&self) -> Vec<&str> {
        [self.instructions.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl HasMetadata for Assistant {
    fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// Assistants endpoint
#[derive(Debug, Clone)]
pub struct AssistantsApi {
    client: OpenAiClient,
}

impl AssistantsApi {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceProvider for AssistantsApi {
    type Item = Assistant;
    type Spec = AssistantSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Assistant
    }

    async fn fetch(&self, id: &str) -> Result<Assistant> {
        self.client.get(&item_route(self.kind().route(), id)).await
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck> {
        self.client.delete(&item_route(self.kind().route(), id)).await
    }

    async fn create(&self, spec: &AssistantSpec) -> Result<Assistant> {
        self.client.post(self.kind().route(), spec).await
    }

    async fn list_all(&self) -> Result<Vec<Assistant>> {
        self.client.list_page(self.kind().route()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_api_payload() {
        let raw = r#"{
            "id": "asst_abc123",
            "object": "assistant",
            "created_at": 1698984975,
            "name": "Math Tutor",
            "description": null,
            "model": "gpt-4o",
            "instructions": "You are a personal math tutor.",
            "tools": [{"type": "code_interpreter"}],
            "metadata": {"team": "edu"},
            "top_p": 1.0,
            "temperature": 1.0,
            "response_format": "auto"
        }"#;

        let assistant: Assistant = serde_json::from_str(raw).unwrap();
        assert_eq!(assistant.id(), "asst_abc123");
        assert_eq!(HasName::name(&assistant), "Math Tutor");
        assert_eq!(assistant.content(), vec!["You are a personal math tutor."]);
        assert_eq!(
            assistant.metadata().and_then(|m| m.get("team")).map(String::as_str),
            Some("edu")
        );
    }

    #[test]
    fn placeholder_has_no_identity() {
        let placeholder = Assistant::default();
        assert!(placeholder.is_placeholder());
        assert_eq!(HasName::name(&placeholder), "");
    }

    #[test]
    fn spec_omits_unset_fields() {
        let spec: AssistantSpec =
            serde_json::from_str(r#"{"model":"gpt-4o","name":"Helper"}"#).unwrap();
        let body = serde_json::to_value(&spec).unwrap();
        assert_eq!(body, serde_json::json!({"model": "gpt-4o", "name": "Helper"}));
    }
}
