//! Resource abstraction layer
//!
//! This module defines the provider boundary and the bulk executor that
//! fans single-item operations out over a list of IDs.
//!
//! # Architecture
//!
//! - [`provider`] - The `ResourceProvider` trait, delete acknowledgements and identity
//! - [`executor`] - Concurrent `fetch_all` / `delete_all` with per-item failure recovery
//!
//! # Example
//!
//! ```ignore
//! use oait::openai::AssistantsApi;
//! use oait::resource::{delete_all, fetch_all};
//!
//! async fn purge(api: &AssistantsApi, ids: &[String]) -> usize {
//!     let items = fetch_all(api, ids, None).await;
//!     delete_all(api, ids, None).await
//! }
//! ```

mod executor;
mod provider;

#[cfg(test)]
pub(crate) mod mock;

pub use executor::{create_one, delete_all, fetch_all, fetch_outcomes, Fetched};
pub(crate) use executor::run_all;
pub use provider::{DeleteAck, Identified, ResourceId, ResourceKind, ResourceProvider};
