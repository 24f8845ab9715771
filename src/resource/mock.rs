//! In-memory provider for unit tests

use super::provider::{DeleteAck, Identified, ResourceKind, ResourceProvider};
use crate::error::{OaitError, Result};
use crate::filter::{HasCreatedAt, HasName};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MockItem {
    pub id: String,
    pub name: String,
    pub created_at: i64,
    #[serde(skip)]
    pub delay: Option<Duration>,
    #[serde(skip)]
    pub undeletable: bool,
}

impl MockItem {
    pub fn named(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            created_at: crate::filter::now_unix(),
            ..Default::default()
        }
    }

    pub fn created(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn undeletable(mut self) -> Self {
        self.undeletable = true;
        self
    }
}

impl Identified for MockItem {
    fn id(&self) -> &str {
        &self.id
    }
}

impl HasName for MockItem {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasCreatedAt for MockItem {
    fn created_at(&self) -> i64 {
        self.created_at
    }
}

#[derive(Default)]
pub struct MockProvider {
    items: HashMap<String, MockItem>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetch_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, item: MockItem) -> Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn not_found(id: &str) -> OaitError {
        OaitError::Api {
            status: 404,
            message: format!("No item found with id '{}'.", id),
            error_type: Some("invalid_request_error".to_string()),
        }
    }
}

#[async_trait]
impl ResourceProvider for MockProvider {
    type Item = MockItem;
    type Spec = String;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Assistant
    }

    async fn fetch(&self, id: &str) -> Result<MockItem> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let item = self.items.get(id).cloned();
        if let Some(delay) = item.as_ref().and_then(|i| i.delay) {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        item.ok_or_else(|| Self::not_found(id))
    }

    async fn delete(&self, id: &str) -> Result<DeleteAck> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let item = self.items.get(id).ok_or_else(|| Self::not_found(id))?;
        Ok(DeleteAck {
            id: id.to_string(),
            object: "assistant.deleted".to_string(),
            deleted: !item.undeletable,
        })
    }

    async fn create(&self, spec: &String) -> Result<MockItem> {
        Ok(MockItem::named("new-1", spec))
    }

    async fn list_all(&self) -> Result<Vec<MockItem>> {
        let mut items: Vec<MockItem> = self.items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
