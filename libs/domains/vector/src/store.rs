use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{KeyPage, Metadata, QueryMatch, SearchRequest, UpsertSummary, VectorRecord};

/// Backend contract for a managed vector store
///
/// Every call is one request/response against the backend with no session
/// state beyond the client handle. Implementations report failures as errors;
/// [`VectorService`](crate::VectorService) turns them into sentinel values.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    /// Insert or overwrite records by key
    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<UpsertSummary>;

    /// Top-k nearest neighbours, closest first, without embeddings
    async fn search(&self, request: SearchRequest) -> VectorResult<Vec<QueryMatch>>;

    /// Point lookup; `Ok(None)` when the key does not exist
    async fn get(&self, key: &str, return_metadata: bool) -> VectorResult<Option<VectorRecord>>;

    /// Replace a record's metadata; `Ok(false)` when the key does not exist
    async fn update_metadata(&self, key: &str, metadata: Metadata) -> VectorResult<bool>;

    /// One page of keys; pass the previous page's `next_token` to continue
    async fn list_keys(&self, page_token: Option<String>) -> VectorResult<KeyPage>;

    /// Delete the given keys, returning how many were removed
    async fn delete(&self, keys: Vec<String>) -> VectorResult<u64>;

    /// Total number of stored vectors
    async fn count(&self) -> VectorResult<u64>;
}
