//! OpenAI API interaction module
//!
//! This module provides the transport, the client and the resource
//! providers for the OpenAI assistants, files and threads endpoints.
//!
//! # Module Structure
//!
//! - [`http`] - HTTP utilities and error classification
//! - [`client`] - Main client: URL building, auth and beta headers
//! - [`assistants`] - Assistant types and provider
//! - [`files`] - File types, upload and provider
//! - [`threads`] - Thread/message types and provider
//!
//! # Example
//!
//! ```ignore
//! use oait::config::{ClientConfig, DEFAULT_BASE_URL};
//! use oait::openai::{client::OpenAiClient, FilesApi};
//! use oait::resource::ResourceProvider;
//!
//! async fn example() -> oait::Result<()> {
//!     let config = ClientConfig::new("sk-...", None, DEFAULT_BASE_URL)?;
//!     let files = FilesApi::new(OpenAiClient::new(config)?);
//!     let all = files.list_all().await?;
//!     Ok(())
//! }
//! ```

pub mod assistants;
pub mod client;
pub mod files;
pub mod http;
pub mod threads;

pub use assistants::{Assistant, AssistantSpec, AssistantsApi};
pub use client::OpenAiClient;
pub use files::{FileObject, FileSpec, FilesApi};
pub use threads::{Conversation, Message, NewMessage, ThreadSpec, ThreadsApi, Transcript};
