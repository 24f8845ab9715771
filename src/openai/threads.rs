//! Threads and their messages
//!
//! A thread is fetched together with its first page of messages and handled
//! as one [`Conversation`]. The conversation keeps the thread ID it was
//! requested with, so its identity does not depend on having messages.

use super::client::{item_route, OpenAiClient};
use crate::error::Result;
use crate::filter::{HasContent, HasCreatedAt, HasLength, HasMetadata};
use crate::resource::{
    run_all, DeleteAck, Identified, ResourceId, ResourceKind, ResourceProvider,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

impl Message {
    /// Text parts joined with newlines; empty for image-only messages
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.kind == "text")
            .filter_map(|c| c.text.as_ref())
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A thread with its messages, newest first as returned by the API
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    pub id: String,
    pub created_at: i64,
    pub metadata: Option<HashMap<String, String>>,
    pub messages: Vec<Message>,
    /// Text of each message, aligned with `messages`
    #[serde(skip)]
    texts: Vec<String>,
}

impl Conversation {
    pub fn new(thread: Thread, messages: Vec<Message>) -> Self {
        let texts = messages.iter().map(Message::text).collect();
        Self {
            id: thread.id,
            created_at: thread.created_at,
            metadata: thread.metadata,
            messages,
            texts,
        }
    }

    /// Role/text lines in chronological order
    pub fn transcript(&self) -> Transcript {
        let mut ordered: Vec<(&Message, &String)> = self.messages.iter().zip(&self.texts).collect();
        ordered.sort_by_key(|(m, _)| m.created_at);

        Transcript {
            thread_id: self.id.clone(),
            messages: ordered
                .into_iter()
                .filter(|(_, text)| !text.is_empty())
                .map(|(m, text)| TranscriptLine {
                    role: m.role.clone(),
                    text: text.clone(),
                })
                .collect(),
        }
    }
}

/// Compact rendering used by `--pretty`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transcript {
    pub thread_id: String,
    pub messages: Vec<TranscriptLine>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TranscriptLine {
    pub role: String,
    pub text: String,
}

impl Identified for Conversation {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasCreatedAt for Conversation {
    /// Time of the latest message, or of the thread itself when empty
    fn created_at(&self) -> i64 {
        self.messages
            .iter()
            .map(|m| m.created_at)
            .max()
            .unwrap_or(self.created_at)
    }
}

impl HasLength for Conversation {
    fn length(&self) -> usize {
        self.messages.len()
    }
}

impl HasContent for Conversation {
    fn content(&self) -> Vec<&str> {
        self.texts.iter().map(String::as_str).collect()
    }
}

impl HasMetadata for Conversation {
    fn metadata(&self) -> Option<&HashMap<String, String>> {
        self.metadata.as_ref()
    }
}

/// Message body for creating threads and posting messages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<NewMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Threads endpoint
#[derive(Debug, Clone)]
pub struct ThreadsApi {
    client: OpenAiClient,
    /// Cap on message lists loaded at once by `list_all`
    concurrency: Option<usize>,
}

impl ThreadsApi {
    pub fn new(client: OpenAiClient) -> Self {
        Self {
            client,
            concurrency: None,
        }
    }

    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit;
        self
    }

    fn messages_route(thread_id: &str) -> String {
        format!("{}/messages", item_route("threads", thread_id))
    }

    pub async fn get_thread(&self, id: &str) -> Result<Thread> {
        self.client.get(&item_route("threads", id)).await
    }

    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.client.list_page(&Self::messages_route(thread_id)).await
    }

    /// Post a message to an existing thread
    pub async fn add_message(&self, thread_id: &str, message: &NewMessage) -> Result<Message> {
        self.client
            .post(&Self::messages_route(thread_id), message)
            .await
    }
}

#[async_trait]
impl ResourceProvider for ThreadsApi {
    type Item = Conversation;
    type Spec = ThreadSpec;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Thread
    }

    async fn fetch(&self, id: &str) -> Result<Conversation> {
        let (mut thread, messages) =
            futures::try_join!(self.get_thread(id), self.list_messages(id))?;

        if thread.id.is_empty() {
            thread.id = id.to_string();
        }

        Ok(Conversation::new(thread, messages))
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck> {
        self.client.delete(&item_route("threads", id)).await
    }

    async fn create(&self, spec: &ThreadSpec) -> Result<Conversation> {
        let thread: Thread = self.client.post("threads", spec).await?;
        let messages = self.list_messages(&thread.id).await?;
        Ok(Conversation::new(thread, messages))
    }

    /// Every listed thread with its messages, loaded under the concurrency cap
    async fn list_all(&self) -> Result<Vec<Conversation>> {
        let threads: Vec<Thread> = self.client.list_page(self.kind().route()).await?;

        let loads = threads.into_iter().map(|thread| async move {
            let messages = match self.list_messages(&thread.id).await {
                Ok(messages) => messages,
                Err(e) => {
                    tracing::warn!("Failed to load messages of thread {}: {}", thread.id, e);
                    Vec::new()
                }
            };
            Conversation::new(thread, messages)
        });

        Ok(run_all(loads, self.concurrency).await)
    }

    /// Thread IDs only; messages are loaded later by `fetch`
    async fn list_ids(&self) -> Result<Vec<ResourceId>> {
        let threads: Vec<Thread> = self.client.list_page(self.kind().route()).await?;
        Ok(threads.into_iter().map(|t| t.id).collect())
    }

    /// Listing threads needs the session token of a logged-in user
    async fn list_session_ids(&self, session: &str) -> Result<Vec<ResourceId>> {
        let threads: Vec<Thread> = self
            .client
            .list_page_as(self.kind().route(), session)
            .await?;
        Ok(threads.into_iter().map(|t| t.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(created_at: i64, role: &str, parts: &[&str]) -> Message {
        Message {
            id: format!("msg_{}", created_at),
            created_at,
            thread_id: "thread_1".to_string(),
            role: role.to_string(),
            content: parts
                .iter()
                .map(|p| MessageContent {
                    kind: "text".to_string(),
                    text: Some(MessageText {
                        value: p.to_string(),
                        annotations: vec![],
                    }),
                    image_file: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn thread(id: &str, created_at: i64) -> Thread {
        Thread {
            id: id.to_string(),
            object: "thread".to_string(),
            created_at,
            metadata: None,
        }
    }

    #[test]
    fn capabilities_reflect_messages() {
        let conv = Conversation::new(
            thread("thread_1", 100),
            vec![
                message(300, "assistant", &["Sure,", "here it is"]),
                message(200, "user", &["Hello"]),
            ],
        );

        assert_eq!(conv.length(), 2);
        assert_eq!(HasCreatedAt::created_at(&conv), 300);
        assert_eq!(conv.content(), vec!["Sure,\nhere it is", "Hello"]);
    }

    #[test]
    fn empty_thread_keeps_identity_and_creation_time() {
        let conv = Conversation::new(thread("thread_empty", 42), vec![]);
        assert_eq!(conv.id(), "thread_empty");
        assert!(!conv.is_placeholder());
        assert_eq!(HasCreatedAt::created_at(&conv), 42);
        assert_eq!(conv.length(), 0);
    }

    #[test]
    fn transcript_is_chronological() {
        let conv = Conversation::new(
            thread("thread_1", 100),
            vec![message(300, "assistant", &["Hi!"]), message(200, "user", &["Hello"])],
        );

        let transcript = conv.transcript();
        assert_eq!(transcript.thread_id, "thread_1");
        assert_eq!(
            transcript.messages,
            vec![
                TranscriptLine { role: "user".into(), text: "Hello".into() },
                TranscriptLine { role: "assistant".into(), text: "Hi!".into() },
            ]
        );
    }

    #[test]
    fn image_only_messages_have_no_text() {
        let mut msg = message(1, "user", &[]);
        msg.content.push(MessageContent {
            kind: "image_file".to_string(),
            text: None,
            image_file: Some(serde_json::json!({"file_id": "file-1"})),
        });
        assert_eq!(msg.text(), "");
    }

    #[test]
    fn decodes_message_list() {
        let raw = r#"{
            "object": "list",
            "data": [{
                "id": "msg_abc123",
                "object": "thread.message",
                "created_at": 1699016383,
                "thread_id": "thread_abc123",
                "role": "user",
                "content": [
                    {"type": "text", "text": {"value": "How does AI work?", "annotations": []}}
                ],
                "assistant_id": null,
                "run_id": null,
                "attachments": [],
                "metadata": {}
            }],
            "first_id": "msg_abc123",
            "last_id": "msg_abc123",
            "has_more": false
        }"#;

        let list: super::super::client::List<Message> = serde_json::from_str(raw).unwrap();
        assert_eq!(list.data[0].text(), "How does AI work?");
    }
}
