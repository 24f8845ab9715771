//! Bulk workflows
//!
//! Sequences ID resolution, the fan-out fetch, the filter pipeline and the
//! fan-out delete. Confirmation and output are supplied by the caller.

use crate::error::OaitError;
use crate::filter::Pipeline;
use crate::io;
use crate::prompt::Confirmer;
use crate::resource::{delete_all, fetch_all, Identified, ResourceProvider};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Where the IDs of a bulk command come from
#[derive(Clone)]
pub enum IdSource {
    /// IDs given on the command line
    List(Vec<String>),
    /// A `.txt` or `.json` file of IDs
    File(PathBuf),
    /// Every item the provider lists
    All,
    /// Every item listed under a user session token
    Session(String),
}

impl std::fmt::Debug for IdSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdSource::List(ids) => f.debug_tuple("List").field(ids).finish(),
            IdSource::File(path) => f.debug_tuple("File").field(path).finish(),
            IdSource::All => f.write_str("All"),
            IdSource::Session(_) => f.write_str("Session(<redacted>)"),
        }
    }
}

/// Knobs shared by bulk commands
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkOptions {
    /// Maximum in-flight requests; `None` launches one per ID at once
    pub concurrency: Option<usize>,
    /// Skip every prompt and delete straight away
    pub assume_yes: bool,
    /// Always show the matched items before asking for confirmation
    pub verify: bool,
}

/// Items that survived the filters
#[derive(Debug)]
pub struct Selection<T> {
    pub items: Vec<T>,
    /// Number of IDs fetched
    pub requested: usize,
    /// Fetches that failed and were dropped as placeholders
    pub unavailable: usize,
}

/// Outcome of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub requested: usize,
    pub unavailable: usize,
    pub matched: usize,
    pub deleted: usize,
    pub cancelled: bool,
}

impl std::fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cancelled {
            return write!(f, "Cancelled. {} matched, nothing deleted.", self.matched);
        }
        write!(
            f,
            "Deleted {} of {} matched ({} requested, {} unavailable).",
            self.deleted, self.matched, self.requested, self.unavailable
        )
    }
}

/// Turn an ID source into a de-duplicated, non-empty ID list.
pub async fn resolve_ids<P>(provider: &P, source: &IdSource) -> Result<Vec<String>>
where
    P: ResourceProvider + ?Sized,
{
    let kind = provider.kind();
    let raw = match source {
        IdSource::List(args) => io::split_ids(args),
        IdSource::File(path) => io::read_id_file(path)
            .with_context(|| format!("Failed to read {} IDs from {}", kind, path.display()))?,
        IdSource::All => provider
            .list_ids()
            .await
            .with_context(|| format!("Failed to list {}", kind.plural()))?,
        IdSource::Session(token) => provider
            .list_session_ids(token)
            .await
            .with_context(|| format!("Failed to list {} for the session", kind.plural()))?,
    };

    let mut seen = HashSet::new();
    let ids: Vec<String> = raw
        .into_iter()
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect();

    if ids.is_empty() {
        return Err(OaitError::Input(format!("no {} IDs to process", kind)).into());
    }

    tracing::info!("Resolved {} {} IDs", ids.len(), kind);
    Ok(ids)
}

/// Fetch `ids` and narrow them with `pipeline`.
///
/// Filter arguments are validated before any request is made. Failed
/// fetches come back from the executor as placeholders; they have no
/// identity to act on and are dropped here.
pub async fn select<P>(
    provider: &P,
    ids: &[String],
    pipeline: &Pipeline<P::Item>,
    concurrency: Option<usize>,
) -> Result<Selection<P::Item>>
where
    P: ResourceProvider + ?Sized,
{
    let kind = provider.kind();
    pipeline.validate()?;

    if ids.is_empty() {
        return Err(OaitError::Input(format!("no {} IDs to process", kind)).into());
    }

    let fetched = fetch_all(provider, ids, concurrency).await;
    let requested = fetched.len();

    let (items, placeholders): (Vec<_>, Vec<_>) =
        fetched.into_iter().partition(|item| !item.is_placeholder());
    let unavailable = placeholders.len();
    if unavailable > 0 {
        tracing::warn!("{} of {} {} could not be fetched", unavailable, requested, kind.plural());
    }

    let items = pipeline
        .apply(items)
        .with_context(|| format!("Failed to filter {}", kind.plural()))?;
    tracing::info!("{} {} matched {} filter(s)", items.len(), kind.plural(), pipeline.len());

    Ok(Selection {
        items,
        requested,
        unavailable,
    })
}

/// IDs of items that carry one
pub fn survivor_ids<T: Identified>(items: &[T]) -> Vec<String> {
    items
        .iter()
        .filter(|item| !item.is_placeholder())
        .map(|item| item.id().to_string())
        .collect()
}

/// Fetch, filter, confirm and delete.
///
/// `show` renders the matched items when the user asks to verify them.
pub async fn bulk_delete<P, C, S>(
    provider: &P,
    ids: &[String],
    pipeline: &Pipeline<P::Item>,
    options: &BulkOptions,
    confirmer: &mut C,
    mut show: S,
) -> Result<DeleteReport>
where
    P: ResourceProvider + ?Sized,
    C: Confirmer + ?Sized,
    S: FnMut(&[P::Item]) -> Result<()>,
{
    let kind = provider.kind();
    let selection = select(provider, ids, pipeline, options.concurrency).await?;

    let mut report = DeleteReport {
        requested: selection.requested,
        unavailable: selection.unavailable,
        matched: selection.items.len(),
        ..Default::default()
    };

    if selection.items.is_empty() {
        tracing::info!("No {} matched; nothing to delete", kind.plural());
        return Ok(report);
    }

    let verify = options.verify
        || (!options.assume_yes
            && confirmer.confirm(&format!("Verify {} before deletion?", kind.plural())));
    if verify {
        show(&selection.items)?;
    }

    let question = format!("Confirm deletion of {} {}", report.matched, kind.plural());
    if !options.assume_yes && !confirmer.confirm(&question) {
        report.cancelled = true;
        return Ok(report);
    }

    let targets = survivor_ids(&selection.items);
    report.deleted = delete_all(provider, &targets, options.concurrency).await;
    Ok(report)
}
