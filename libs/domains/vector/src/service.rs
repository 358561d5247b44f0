use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::batch::{self, BatchReport, RetryPolicy};
use crate::embedding::EmbeddingProvider;
use crate::error::VectorError;
use crate::filter::MetadataFilter;
use crate::models::{
    Metadata, QueryResponse, SearchRequest, UpsertSummary, VectorDocument, VectorRecord,
};
use crate::pagination::paginate;
use crate::store::VectorStore;

/// Vector service providing high-level operations
///
/// Combines one vector store with one embedding provider. Failures are logged
/// and reported as sentinel values (`None`, `0`, an empty vector or an error
/// payload) instead of errors.
pub struct VectorService<S: VectorStore> {
    repository: S,
    embedder: Arc<dyn EmbeddingProvider>,
    retry_base_delay: Duration,
}

impl<S: VectorStore> VectorService<S> {
    pub fn new(repository: S, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository,
            embedder,
            retry_base_delay: RetryPolicy::default().base_delay,
        }
    }

    /// Override the backoff unit used by [`batch_store`](Self::batch_store)
    pub fn with_retry_base_delay(mut self, base_delay: Duration) -> Self {
        self.retry_base_delay = base_delay;
        self
    }

    pub fn repository(&self) -> &S {
        &self.repository
    }

    // ===== Embeddings =====

    /// Embed `text`, returning an empty vector on failure
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        match self.embedder.embed(text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                error!("Error generating embedding: {}", e);
                Vec::new()
            }
        }
    }

    async fn embed_documents(&self, documents: &[VectorDocument]) -> Vec<VectorRecord> {
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let embedding = self.embed(&document.text).await;
            if embedding.is_empty() {
                warn!("Skipping {} - failed to generate embedding", document.key);
                continue;
            }
            records.push(
                VectorRecord::new(&document.key, embedding).with_metadata(document.metadata.clone()),
            );
        }
        records
    }

    // ===== Writes =====

    /// Embed and upsert `documents` in one backend call
    ///
    /// Documents whose embedding fails are left out. Returns `None` when no
    /// document could be embedded or the backend rejected the write.
    pub async fn store(&self, documents: &[VectorDocument]) -> Option<UpsertSummary> {
        let records = self.embed_documents(documents).await;
        if records.is_empty() {
            warn!("No valid vectors to store");
            return None;
        }

        match self.repository.upsert(records).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(backend = self.repository.backend(), "Error storing vectors: {}", e);
                None
            }
        }
    }

    /// [`store`](Self::store) in chunks of `batch_size`, retrying each chunk
    /// up to `max_retries` times with exponential backoff
    pub async fn batch_store(
        &self,
        documents: &[VectorDocument],
        batch_size: usize,
        max_retries: u32,
    ) -> BatchReport {
        let policy = RetryPolicy::new(max_retries).with_base_delay(self.retry_base_delay);
        let report = batch::batch_store(documents, batch_size, &policy, |chunk| self.store(chunk)).await;

        info!(
            backend = self.repository.backend(),
            chunks = report.chunks,
            failed = report.failed_starts.len(),
            "Batch store finished"
        );
        report
    }

    /// Re-embed `text` and overwrite the record stored under `key`
    pub async fn update(
        &self,
        key: &str,
        text: &str,
        metadata: Metadata,
    ) -> Option<UpsertSummary> {
        self.store(&[VectorDocument::new(key, text).with_metadata(metadata)])
            .await
    }

    /// Replace the metadata of an existing record; `None` if it is missing
    pub async fn update_metadata(&self, key: &str, metadata: Metadata) -> Option<()> {
        match self.repository.update_metadata(key, metadata).await {
            Ok(true) => Some(()),
            Ok(false) => {
                warn!("No vector found with key {}", key);
                None
            }
            Err(e) => {
                error!(backend = self.repository.backend(), "Error updating metadata: {}", e);
                None
            }
        }
    }

    // ===== Reads =====

    /// Top-k similarity search for `text`
    pub async fn query(
        &self,
        text: &str,
        top_k: u32,
        filter: Option<MetadataFilter>,
    ) -> QueryResponse {
        let embedding = self.embed(text).await;
        if embedding.is_empty() {
            return QueryResponse::error(QueryResponse::EMBEDDING_FAILED);
        }

        let mut request = SearchRequest::new(embedding, top_k);
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            request = request.with_filter(filter);
        }

        match self.repository.search(request).await {
            Ok(matches) => QueryResponse::Matches(matches),
            Err(e) => {
                error!(backend = self.repository.backend(), "Error querying vectors: {}", e);
                QueryResponse::error(e.to_string())
            }
        }
    }

    /// Fetch one record with its embedding and metadata
    pub async fn get(&self, key: &str) -> Option<VectorRecord> {
        match self.repository.get(key, true).await {
            Ok(record) => record,
            Err(e) => {
                error!(backend = self.repository.backend(), "Error getting vector: {}", e);
                None
            }
        }
    }

    pub async fn count(&self) -> u64 {
        match self.repository.count().await {
            Ok(count) => count,
            Err(e) => {
                error!(backend = self.repository.backend(), "Error counting vectors: {}", e);
                0
            }
        }
    }

    // ===== Deletes =====

    /// Delete every stored vector page by page, returning how many went
    ///
    /// On a backend failure the count deleted so far is returned.
    pub async fn delete_all(&self, verbose: bool) -> u64 {
        let deleted = AtomicU64::new(0);

        let result = paginate(
            |token| self.repository.list_keys(token),
            |page| {
                let deleted = &deleted;
                async move {
                    if page.keys.is_empty() {
                        return Ok::<u64, VectorError>(0);
                    }
                    if verbose {
                        for key in &page.keys {
                            info!("Deleting vector {}", key);
                        }
                    }
                    let n = self.repository.delete(page.keys).await?;
                    deleted.fetch_add(n, Ordering::Relaxed);
                    Ok::<u64, VectorError>(n)
                }
            },
        )
        .await;

        match result {
            Ok(total) => {
                info!(backend = self.repository.backend(), "Deleted {} vectors", total);
                total
            }
            Err(e) => {
                let total = deleted.load(Ordering::Relaxed);
                error!(
                    backend = self.repository.backend(),
                    "Error deleting vectors after {} deletions: {}", total, e
                );
                total
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{KeyPage, QueryMatch, metadata};
    use crate::store::MockVectorStore;

    /// Embeds every text except those containing "unembeddable"
    fn embedder() -> Arc<dyn EmbeddingProvider> {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed().returning(|text| {
            if text.contains("unembeddable") {
                Err(VectorError::Embedding("quota exceeded".into()))
            } else {
                Ok(vec![text.len() as f32, 1.0])
            }
        });
        Arc::new(mock)
    }

    fn failing_embedder() -> Arc<dyn EmbeddingProvider> {
        let mut mock = MockEmbeddingProvider::new();
        mock.expect_embed()
            .returning(|_| Err(VectorError::Embedding("service unavailable".into())));
        Arc::new(mock)
    }

    fn store_mock() -> MockVectorStore {
        let mut mock = MockVectorStore::new();
        mock.expect_backend().return_const("mock");
        mock
    }

    fn movies(n: usize) -> Vec<VectorDocument> {
        (0..n)
            .map(|i| VectorDocument::new(format!("movie-{}", i), format!("plot {}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_embed_failure_yields_empty_vector() {
        let service = VectorService::new(store_mock(), failing_embedder());
        assert!(service.embed("anything").await.is_empty());
    }

    #[tokio::test]
    async fn test_store_excludes_documents_that_fail_to_embed() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_upsert()
            .withf(|records| {
                records.iter().map(|r| r.key.as_str()).collect::<Vec<_>>() == ["Star Wars", "Finding Nemo"]
            })
            .times(1)
            .returning(|records| {
                Ok(UpsertSummary {
                    upserted: records.len() as u64,
                    modified: 0,
                })
            });

        let documents = vec![
            VectorDocument::new("Star Wars", "A space opera")
                .with_metadata(metadata([("genre", "scifi")])),
            VectorDocument::new("Broken", "unembeddable text"),
            VectorDocument::new("Finding Nemo", "A clownfish searches for his son"),
        ];

        let service = VectorService::new(mock_repo, embedder());
        let summary = service.store(&documents).await.unwrap();

        assert_eq!(summary.upserted, 2);
    }

    #[tokio::test]
    async fn test_store_without_valid_embeddings_skips_backend() {
        let mut mock_repo = store_mock();
        mock_repo.expect_upsert().times(0);

        let service = VectorService::new(mock_repo, failing_embedder());
        assert!(service.store(&movies(3)).await.is_none());
    }

    #[tokio::test]
    async fn test_store_backend_failure_is_none() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_upsert()
            .returning(|_| Err(VectorError::Backend("bulk write failed".into())));

        let service = VectorService::new(mock_repo, embedder());
        assert!(service.store(&movies(1)).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_store_five_documents_in_chunks_of_two() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_upsert()
            .times(3)
            .returning(|records| {
                Ok(UpsertSummary {
                    upserted: records.len() as u64,
                    modified: 0,
                })
            });

        let service = VectorService::new(mock_repo, embedder());
        let report = service.batch_store(&movies(5), 2, 3).await;

        assert_eq!(report.chunks, 3);
        assert_eq!(report.attempts, 3);
        assert!(report.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_store_skips_exhausted_chunk() {
        let mut mock_repo = store_mock();
        // First chunk always fails, the rest succeed
        mock_repo
            .expect_upsert()
            .times(5)
            .returning(|records| {
                if records[0].key == "movie-0" {
                    Err(VectorError::Backend("throttled".into()))
                } else {
                    Ok(UpsertSummary::default())
                }
            });

        let service = VectorService::new(mock_repo, embedder())
            .with_retry_base_delay(Duration::from_millis(10));
        let report = service.batch_store(&movies(5), 2, 3).await;

        assert_eq!(report.failed_starts, vec![0]);
        assert_eq!(report.stored, 2);
    }

    #[tokio::test]
    async fn test_query_embedding_failure_issues_no_search() {
        let mut mock_repo = store_mock();
        mock_repo.expect_search().times(0);

        let service = VectorService::new(mock_repo, failing_embedder());
        let response = service.query("space adventure", 3, None).await;

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"error": "Failed to generate embedding"})
        );
    }

    #[tokio::test]
    async fn test_query_passes_filter_and_returns_matches() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_search()
            .withf(|request| {
                request.top_k == 2 && request.filter == Some(MetadataFilter::eq("genre", "family"))
            })
            .times(1)
            .returning(|_| {
                Ok(vec![QueryMatch {
                    key: "Finding Nemo".into(),
                    distance: 0.12,
                    metadata: metadata([("genre", "family")]),
                }])
            });

        let service = VectorService::new(mock_repo, embedder());
        let response = service
            .query("fish", 2, Some(MetadataFilter::eq("genre", "family")))
            .await;

        assert_eq!(response.matches().len(), 1);
        assert_eq!(response.matches()[0].key, "Finding Nemo");
    }

    #[tokio::test]
    async fn test_query_drops_empty_filter() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_search()
            .withf(|request| request.filter.is_none())
            .returning(|_| Ok(vec![]));

        let service = VectorService::new(mock_repo, embedder());
        let response = service.query("fish", 2, Some(MetadataFilter::new())).await;
        assert_eq!(response, QueryResponse::Matches(vec![]));
    }

    #[tokio::test]
    async fn test_query_backend_failure_is_error_payload() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_search()
            .returning(|_| Err(VectorError::Backend("index not found".into())));

        let service = VectorService::new(mock_repo, embedder());
        let response = service.query("fish", 2, None).await;

        assert!(response.is_error());
    }

    #[tokio::test]
    async fn test_get_missing_and_failing_are_none() {
        let mut mock_repo = store_mock();
        mock_repo.expect_get().times(2).returning(|key, return_metadata| {
            assert!(return_metadata);
            match key {
                "broken" => Err(VectorError::Backend("timeout".into())),
                _ => Ok(None),
            }
        });

        let service = VectorService::new(mock_repo, embedder());
        assert!(service.get("missing").await.is_none());
        assert!(service.get("broken").await.is_none());
    }

    #[tokio::test]
    async fn test_update_metadata_missing_key_is_none() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_update_metadata()
            .returning(|key, _| Ok(key == "Star Wars"));

        let service = VectorService::new(mock_repo, embedder());
        let meta = metadata([("genre", "classic")]);
        assert_eq!(service.update_metadata("Star Wars", meta.clone()).await, Some(()));
        assert_eq!(service.update_metadata("Unknown", meta).await, None);
    }

    #[tokio::test]
    async fn test_update_re_embeds_and_upserts() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_upsert()
            .withf(|records| {
                records.len() == 1
                    && records[0].key == "Jurassic Park"
                    && records[0].metadata.contains_key("year")
            })
            .returning(|_| {
                Ok(UpsertSummary {
                    upserted: 0,
                    modified: 1,
                })
            });

        let service = VectorService::new(mock_repo, embedder());
        let summary = service
            .update("Jurassic Park", "Dinosaurs escape", metadata([("year", 1993)]))
            .await
            .unwrap();
        assert_eq!(summary.modified, 1);
    }

    #[tokio::test]
    async fn test_count_failure_is_zero() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_count()
            .returning(|| Err(VectorError::Backend("unreachable".into())));

        let service = VectorService::new(mock_repo, embedder());
        assert_eq!(service.count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_all_follows_three_pages() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_list_keys()
            .times(3)
            .returning(|token| match token.as_deref() {
                None => Ok(KeyPage::new(vec!["a".into(), "b".into()], Some("t1".into()))),
                Some("t1") => Ok(KeyPage::new(vec!["c".into(), "d".into()], Some("t2".into()))),
                Some("t2") => Ok(KeyPage::last(vec!["e".into()])),
                Some(other) => panic!("unexpected token {}", other),
            });
        mock_repo
            .expect_delete()
            .times(3)
            .returning(|keys| Ok(keys.len() as u64));

        let service = VectorService::new(mock_repo, embedder());
        assert_eq!(service.delete_all(true).await, 5);
    }

    #[tokio::test]
    async fn test_delete_all_reports_partial_progress_on_failure() {
        let mut mock_repo = store_mock();
        mock_repo
            .expect_list_keys()
            .returning(|token| match token {
                None => Ok(KeyPage::new(vec!["a".into(), "b".into()], Some("t1".into()))),
                Some(_) => Err(VectorError::Backend("listing failed".into())),
            });
        mock_repo
            .expect_delete()
            .times(1)
            .returning(|keys| Ok(keys.len() as u64));

        let service = VectorService::new(mock_repo, embedder());
        assert_eq!(service.delete_all(false).await, 2);
    }
}
