use async_trait::async_trait;
use aws_sdk_s3vectors::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3vectors::types::{PutInputVector, VectorData};
use aws_sdk_s3vectors::{Client, Config};
use core_config::S3VectorsConfig;
use tracing::{debug, info, instrument};

use super::conversions::{document_to_metadata, filter_to_document, metadata_to_document};
use crate::error::{VectorError, VectorResult};
use crate::models::{KeyPage, Metadata, QueryMatch, SearchRequest, UpsertSummary, VectorRecord};
use crate::pagination::paginate;
use crate::store::VectorStore;

/// `list_vectors` accepts at most 1000 results per call
const DEFAULT_PAGE_SIZE: i32 = 500;

/// `delete_vectors` accepts at most 500 keys per call
const MAX_DELETE_KEYS: usize = 500;

/// Split `keys` into request-sized groups for `delete_vectors`
fn delete_batches(keys: Vec<String>) -> Vec<Vec<String>> {
    keys.chunks(MAX_DELETE_KEYS).map(<[String]>::to_vec).collect()
}

/// Amazon S3 Vectors implementation of [`VectorStore`]
pub struct S3VectorStore {
    client: Client,
    bucket: String,
    index_name: String,
    page_size: i32,
}

impl S3VectorStore {
    /// Create with an existing S3 Vectors client
    pub fn new(client: Client, bucket: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            index_name: index_name.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Build a client from explicit static credentials
    pub fn from_config(config: &S3VectorsConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "vector-bridge",
        );

        let sdk_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .build();

        info!(
            bucket = %config.bucket,
            index = %config.index_name,
            region = %config.region,
            "Created S3 Vectors client"
        );

        Self::new(Client::from_conf(sdk_config), &config.bucket, &config.index_name)
    }

    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }

    fn to_input_vector(record: &VectorRecord) -> VectorResult<PutInputVector> {
        Ok(PutInputVector::builder()
            .key(&record.key)
            .data(VectorData::Float32(record.embedding.clone()))
            .metadata(metadata_to_document(&record.metadata))
            .build()?)
    }
}

#[async_trait]
impl VectorStore for S3VectorStore {
    fn backend(&self) -> &'static str {
        "s3vectors"
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<UpsertSummary> {
        if records.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let vectors = records
            .iter()
            .map(Self::to_input_vector)
            .collect::<VectorResult<Vec<_>>>()?;

        self.client
            .put_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index_name)
            .set_vectors(Some(vectors))
            .send()
            .await?;

        // put_vectors does not distinguish inserts from overwrites
        let summary = UpsertSummary {
            upserted: records.len() as u64,
            modified: 0,
        };
        info!("Stored {} vectors", summary.total());
        Ok(summary)
    }

    #[instrument(skip(self, request), fields(top_k = request.top_k))]
    async fn search(&self, request: SearchRequest) -> VectorResult<Vec<QueryMatch>> {
        let top_k = i32::try_from(request.top_k)
            .map_err(|_| VectorError::Validation(format!("top_k too large: {}", request.top_k)))?;

        let output = self
            .client
            .query_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index_name)
            .top_k(top_k)
            .query_vector(VectorData::Float32(request.vector))
            .set_filter(request.filter.as_ref().and_then(filter_to_document))
            .return_distance(true)
            .return_metadata(true)
            .send()
            .await?;

        Ok(output
            .vectors()
            .iter()
            .map(|v| QueryMatch {
                key: v.key().to_string(),
                distance: v.distance().unwrap_or_default(),
                metadata: v.metadata().map(document_to_metadata).unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str, return_metadata: bool) -> VectorResult<Option<VectorRecord>> {
        let output = self
            .client
            .get_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index_name)
            .keys(key)
            .return_data(true)
            .return_metadata(return_metadata)
            .send()
            .await?;

        let Some(vector) = output.vectors().iter().find(|v| v.key() == key) else {
            info!("No vector found with key {}", key);
            return Ok(None);
        };

        let embedding = match vector.data() {
            Some(VectorData::Float32(values)) => values.clone(),
            Some(other) => {
                return Err(VectorError::Internal(format!(
                    "Unsupported vector data for key {}: {:?}",
                    key, other
                )));
            }
            None => Vec::new(),
        };

        let metadata = vector.metadata().map(document_to_metadata).unwrap_or_default();
        Ok(Some(VectorRecord::new(key, embedding).with_metadata(metadata)))
    }

    #[instrument(skip(self, metadata))]
    async fn update_metadata(&self, key: &str, metadata: Metadata) -> VectorResult<bool> {
        // No partial update API: rewrite the vector with its current data
        let Some(current) = self.get(key, false).await? else {
            return Ok(false);
        };

        self.upsert(vec![current.with_metadata(metadata)]).await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn list_keys(&self, page_token: Option<String>) -> VectorResult<KeyPage> {
        let output = self
            .client
            .list_vectors()
            .vector_bucket_name(&self.bucket)
            .index_name(&self.index_name)
            .max_results(self.page_size)
            .set_next_token(page_token)
            .send()
            .await?;

        let keys: Vec<String> = output.vectors().iter().map(|v| v.key().to_string()).collect();
        debug!(keys = keys.len(), "listed vector keys");

        Ok(KeyPage::new(keys, output.next_token().map(str::to_string)))
    }

    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    async fn delete(&self, keys: Vec<String>) -> VectorResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut deleted = 0u64;
        for batch in delete_batches(keys) {
            let len = batch.len() as u64;
            self.client
                .delete_vectors()
                .vector_bucket_name(&self.bucket)
                .index_name(&self.index_name)
                .set_keys(Some(batch))
                .send()
                .await?;
            deleted += len;
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> VectorResult<u64> {
        paginate(
            |token| self.list_keys(token),
            |page| async move { Ok::<u64, VectorError>(page.keys.len() as u64) },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata;

    fn test_config() -> S3VectorsConfig {
        S3VectorsConfig::new("AKIATEST", "secret", "us-east-1", "movies-bucket", "movies")
    }

    #[test]
    fn test_from_config() {
        let store = S3VectorStore::from_config(&test_config());
        assert_eq!(store.backend(), "s3vectors");
        assert_eq!(store.bucket, "movies-bucket");
        assert_eq!(store.index_name, "movies");
        assert_eq!(store.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let store = S3VectorStore::from_config(&test_config()).with_page_size(5000);
        assert_eq!(store.page_size, 1000);
        let store = S3VectorStore::from_config(&test_config()).with_page_size(0);
        assert_eq!(store.page_size, 1);
    }

    #[test]
    fn test_input_vector_carries_data_and_metadata() {
        let record = VectorRecord::new("Star Wars", vec![0.1, 0.2])
            .with_metadata(metadata([("genre", "scifi")]));
        let input = S3VectorStore::to_input_vector(&record).unwrap();

        let rendered = format!("{:?}", input);
        assert!(rendered.contains("Star Wars"));
        assert!(rendered.contains("Float32([0.1, 0.2])"));
        assert_eq!(input.metadata(), Some(&metadata_to_document(&record.metadata)));
    }

    #[test]
    fn test_full_listing_page_is_split_for_delete() {
        let keys: Vec<String> = (0..1000).map(|i| format!("movie-{}", i)).collect();
        let batches = delete_batches(keys);

        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == MAX_DELETE_KEYS));
        assert_eq!(batches[1][0], "movie-500");
    }

    #[test]
    fn test_uneven_delete_batches_keep_every_key() {
        let keys: Vec<String> = (0..1203).map(|i| i.to_string()).collect();
        let batches = delete_batches(keys);

        assert_eq!(
            batches.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![500, 500, 203]
        );
        assert!(delete_batches(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_empty_writes_skip_the_network() {
        let store = S3VectorStore::from_config(&test_config());
        assert_eq!(store.upsert(vec![]).await.unwrap(), UpsertSummary::default());
        assert_eq!(store.delete(vec![]).await.unwrap(), 0);
    }
}
