use std::time::Duration;

use async_trait::async_trait;
use core_config::MongoVectorConfig;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions, UpdateModifications, UpdateOneModel};
use mongodb::{Client, Collection, IndexModel};
use tracing::{info, instrument};

use super::conversions::{
    document_to_match, document_to_record, metadata_to_bson, next_page_token, search_pipeline,
    upsert_parts, EMBEDDING_FIELD, KEY_FIELD, METADATA_FIELD,
};
use crate::error::{VectorError, VectorResult};
use crate::models::{KeyPage, Metadata, QueryMatch, SearchRequest, UpsertSummary, VectorRecord};
use crate::store::VectorStore;

/// MongoDB-backed implementation of [`VectorStore`]
///
/// One document per vector: `{key, embedding, metadata}`. Similarity search
/// requires an Atlas vector search index on `embedding`.
pub struct MongoVectorStore {
    client: Client,
    collection: Collection<Document>,
    index_name: String,
    num_candidates_factor: u32,
    page_size: i64,
}

impl MongoVectorStore {
    /// Connect and verify the deployment answers a ping
    pub async fn connect(config: &MongoVectorConfig) -> VectorResult<Self> {
        info!(
            database = %config.database,
            collection = %config.collection,
            "Connecting to MongoDB"
        );

        let mut options = ClientOptions::parse(&config.uri).await?;
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
        options.server_selection_timeout =
            Some(Duration::from_secs(config.server_selection_timeout_secs));
        options.app_name = Some("vector-bridge".to_string());

        let client = Client::with_options(options)?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| VectorError::Backend(format!("MongoDB ping failed: {}", e)))?;

        info!("Successfully connected to MongoDB");
        Ok(Self::from_client(client, config))
    }

    /// Wrap an existing client without any network round trip
    pub fn from_client(client: Client, config: &MongoVectorConfig) -> Self {
        let collection = client
            .database(&config.database)
            .collection::<Document>(&config.collection);

        Self {
            client,
            collection,
            index_name: config.index_name.clone(),
            num_candidates_factor: config.num_candidates_factor,
            page_size: config.page_size.max(1),
        }
    }

    /// Create the unique index on `key` that backs upsert-by-key
    pub async fn ensure_key_index(&self) -> VectorResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { KEY_FIELD: 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("idx_key_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(index).await?;
        info!("Vector key index ensured");
        Ok(())
    }

    /// Get the underlying collection for advanced operations
    pub fn collection(&self) -> &Collection<Document> {
        &self.collection
    }
}

#[async_trait]
impl VectorStore for MongoVectorStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn upsert(&self, records: Vec<VectorRecord>) -> VectorResult<UpsertSummary> {
        if records.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let namespace = self.collection.namespace();
        let models: Vec<UpdateOneModel> = records
            .iter()
            .map(|record| {
                let (filter, update) = upsert_parts(record);
                UpdateOneModel::builder()
                    .namespace(namespace.clone())
                    .filter(filter)
                    .update(UpdateModifications::Document(update))
                    .upsert(true)
                    .build()
            })
            .collect();

        let result = self.client.bulk_write(models).await?;

        let summary = UpsertSummary {
            upserted: result.upserted_count.max(0) as u64,
            modified: result.modified_count.max(0) as u64,
        };
        info!("Stored {} vectors", summary.total());
        Ok(summary)
    }

    #[instrument(skip(self, request), fields(top_k = request.top_k))]
    async fn search(&self, request: SearchRequest) -> VectorResult<Vec<QueryMatch>> {
        let pipeline = search_pipeline(&request, &self.index_name, self.num_candidates_factor);

        let documents: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;

        documents.iter().map(document_to_match).collect()
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str, return_metadata: bool) -> VectorResult<Option<VectorRecord>> {
        let mut projection = doc! { "_id": 0, KEY_FIELD: 1, EMBEDDING_FIELD: 1 };
        if return_metadata {
            projection.insert(METADATA_FIELD, 1);
        }

        let document = self
            .collection
            .find_one(doc! { KEY_FIELD: key })
            .projection(projection)
            .await?;

        match document {
            Some(document) => Ok(Some(document_to_record(&document)?)),
            None => {
                info!("No vector found with key {}", key);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, metadata))]
    async fn update_metadata(&self, key: &str, metadata: Metadata) -> VectorResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { KEY_FIELD: key },
                doc! { "$set": { METADATA_FIELD: metadata_to_bson(&metadata) } },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn list_keys(&self, page_token: Option<String>) -> VectorResult<KeyPage> {
        let filter = match page_token {
            Some(after) => doc! { KEY_FIELD: { "$gt": after } },
            None => doc! {},
        };

        let documents: Vec<Document> = self
            .collection
            .find(filter)
            .projection(doc! { "_id": 0, KEY_FIELD: 1 })
            .sort(doc! { KEY_FIELD: 1 })
            .limit(self.page_size)
            .await?
            .try_collect()
            .await?;

        let keys: Vec<String> = documents
            .iter()
            .filter_map(|d| d.get_str(KEY_FIELD).ok().map(str::to_string))
            .collect();

        let next_token = next_page_token(&keys, documents.len(), self.page_size);

        Ok(KeyPage::new(keys, next_token))
    }

    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    async fn delete(&self, keys: Vec<String>) -> VectorResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let result = self
            .collection
            .delete_many(doc! { KEY_FIELD: { "$in": keys } })
            .await?;

        Ok(result.deleted_count)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> VectorResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}
