//! In-process remote store.
//!
//! Useful for local demos and tests: it behaves like the hosted document
//! store, including stamping `updatedAt` on every write.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{RemoteError, RemoteStore};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<(String, String), Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document exactly as given, without stamping it.
    pub fn insert_raw(&self, collection: &str, doc_id: &str, document: Value) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert((collection.to_string(), doc_id.to_string()), document);
        }
    }

    /// Current raw document, if any.
    pub fn document(&self, collection: &str, doc_id: &str) -> Option<Value> {
        self.documents
            .read()
            .ok()
            .and_then(|documents| {
                documents
                    .get(&(collection.to_string(), doc_id.to_string()))
                    .cloned()
            })
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RemoteStore for MemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, RemoteError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        Ok(documents
            .get(&(collection.to_string(), doc_id.to_string()))
            .cloned())
    }

    async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        mut document: Value,
    ) -> Result<(), RemoteError> {
        if let Value::Object(ref mut fields) = document {
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        let mut documents = self
            .documents
            .write()
            .map_err(|e| RemoteError::Unavailable(e.to_string()))?;
        documents.insert((collection.to_string(), doc_id.to_string()), document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_absent_document_is_none() {
        let store = MemoryDocumentStore::new();
        assert!(store.get_document("site_data", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_stamps_updated_at() {
        let store = MemoryDocumentStore::new();
        store
            .set_document("site_data", "k", json!({ "payload": [1] }))
            .await
            .unwrap();

        let doc = store.get_document("site_data", "k").await.unwrap().unwrap();
        assert_eq!(doc["payload"], json!([1]));
        assert!(doc["updatedAt"].is_string());
        assert_eq!(store.len(), 1);
    }
}
