//! Remote document store module.
//!
//! The remote store is the source of truth whenever it is configured. It is
//! addressed as `collection path / document id` and holds one JSON document
//! per logical key:
//!
//! ```json
//! { "payload": <value>, "updatedAt": "2026-01-01T00:00:00Z" }
//! ```
//!
//! Older documents kept the value under `items`; both are readable.

pub mod client;
pub mod document;
pub mod error;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

pub use client::HttpDocumentStore;
pub use document::StoredDocument;
pub use error::RemoteError;
pub use memory::MemoryDocumentStore;

/// Asynchronous document key/value service.
///
/// `get_document` returns `Ok(None)` for an absent document, which is
/// distinct from a document holding an empty collection.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, RemoteError>;

    async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        document: Value,
    ) -> Result<(), RemoteError>;
}
