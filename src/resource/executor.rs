//! Fan-out/fan-in executor
//!
//! Launches one request per ID and waits for all of them. Per-item failures
//! are logged and recovered: a failed fetch becomes the item's `Default`
//! placeholder and a failed delete counts as not deleted. Nothing here
//! aborts a batch early, and there is no timeout beyond the transport's.

use super::provider::{Identified, ResourceProvider};
use crate::error::Result;
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::future::Future;

/// Outcome of one fetch, keyed by the ID that was requested
#[derive(Debug)]
pub struct Fetched<T> {
    pub id: String,
    pub outcome: Result<T>,
}

impl<T: Default> Fetched<T> {
    /// The item, or the zero-valued placeholder if the fetch failed
    pub fn into_item(self) -> T {
        self.outcome.unwrap_or_default()
    }
}

/// Drive every future to completion. Results come back in input order
/// whether or not a limit is set.
pub(crate) async fn run_all<I, F>(tasks: I, limit: Option<usize>) -> Vec<F::Output>
where
    I: IntoIterator<Item = F>,
    F: Future,
{
    match limit {
        Some(n) if n > 0 => stream::iter(tasks).buffered(n).collect().await,
        _ => join_all(tasks).await,
    }
}

/// Fetch every ID, pairing each outcome with its ID.
pub async fn fetch_outcomes<P>(
    provider: &P,
    ids: &[String],
    limit: Option<usize>,
) -> Vec<Fetched<P::Item>>
where
    P: ResourceProvider + ?Sized,
{
    let tasks = ids.iter().map(|id| async move {
        let outcome = provider.fetch(id).await;
        Fetched {
            id: id.clone(),
            outcome,
        }
    });

    run_all(tasks, limit).await
}

/// Fetch every ID. The result always has `ids.len()` entries; failed
/// fetches are replaced by placeholders.
pub async fn fetch_all<P>(provider: &P, ids: &[String], limit: Option<usize>) -> Vec<P::Item>
where
    P: ResourceProvider + ?Sized,
{
    let kind = provider.kind();
    let mut failures = 0usize;

    let items: Vec<P::Item> = fetch_outcomes(provider, ids, limit)
        .await
        .into_iter()
        .map(|fetched| {
            if let Err(e) = &fetched.outcome {
                failures += 1;
                if e.is_per_item() {
                    tracing::warn!("Failed to fetch {} {}: {}", kind, fetched.id, e);
                } else {
                    tracing::error!("Cannot fetch {} {}: {}", kind, fetched.id, e);
                }
            }
            fetched.into_item()
        })
        .collect();

    tracing::info!(
        "Fetched {} of {} {}",
        ids.len() - failures,
        ids.len(),
        kind.plural()
    );

    items
}

/// Delete every ID and return how many the API acknowledged as deleted.
pub async fn delete_all<P>(provider: &P, ids: &[String], limit: Option<usize>) -> usize
where
    P: ResourceProvider + ?Sized,
{
    let kind = provider.kind();

    let tasks = ids.iter().map(|id| async move {
        match provider.delete(id).await {
            Ok(ack) if ack.deleted => true,
            Ok(_) => {
                tracing::warn!("{} {} was not deleted", kind, id);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to delete {} {}: {}", kind, id, e);
                false
            }
        }
    });

    let deleted = run_all(tasks, limit)
        .await
        .into_iter()
        .filter(|ok| *ok)
        .count();

    tracing::info!("Deleted {} of {} {}", deleted, ids.len(), kind.plural());
    deleted
}

/// Create a single item. Not batched; errors propagate.
pub async fn create_one<P>(provider: &P, spec: &P::Spec) -> Result<P::Item>
where
    P: ResourceProvider + ?Sized,
{
    let item = provider.create(spec).await?;
    tracing::info!("Created {} {}", provider.kind(), item.id());
    Ok(item)
}
