//! HTTP client for a hosted document store.
//!
//! Documents are addressed as `{base_url}/{collection}/{doc_id}`:
//! `GET` returns the JSON document or 404 when absent, `PUT` replaces it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use super::{RemoteError, RemoteStore};

/// Document store client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpDocumentStore {
    /// Create a client with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Send the key as a bearer token on every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn document_url(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, doc_id)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap, RemoteError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref key) = self.api_key {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| RemoteError::InvalidResponse(format!("Invalid API key: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl RemoteStore for HttpDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<Value>, RemoteError> {
        let url = self.document_url(collection, doc_id);
        debug!(url = %url, "Fetching document");

        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check_response(response).await?;
        let document = response
            .json::<Value>()
            .await
            .map_err(|e| RemoteError::InvalidResponse(format!("{}: {}", url, e)))?;
        Ok(Some(document))
    }

    async fn set_document(
        &self,
        collection: &str,
        doc_id: &str,
        document: Value,
    ) -> Result<(), RemoteError> {
        let url = self.document_url(collection, doc_id);
        debug!(url = %url, "Writing document");

        let response = self
            .client
            .put(&url)
            .headers(self.auth_headers()?)
            .json(&document)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }
}
