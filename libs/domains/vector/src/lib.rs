//! Vector Domain Library
//!
//! Embeds text through a hosted embedding API and stores or queries the
//! resulting vectors in a managed vector backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  VectorService  │  ← sentinel-returning operations, batching, pagination
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌───────────────────┐
//! │   VectorStore   │     │ EmbeddingProvider │
//! │     (trait)     │     │      (trait)      │
//! └────────┬────────┘     └─────────┬─────────┘
//!          │                        │
//! ┌────────▼─────────┐    ┌─────────▼─────────┐
//! │ MongoVectorStore │    │AzureOpenAIProvider│
//! │ S3VectorStore    │    └───────────────────┘
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use core_config::{EmbeddingConfig, FromEnv, MongoVectorConfig};
//! use domain_vector::{AzureOpenAIProvider, MongoVectorStore, VectorDocument, VectorService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MongoVectorStore::connect(&MongoVectorConfig::from_env()?).await?;
//! let embedder = Arc::new(AzureOpenAIProvider::new(EmbeddingConfig::from_env()?));
//! let service = VectorService::new(store, embedder);
//!
//! let documents = vec![VectorDocument::new("Star Wars", "A space opera")];
//! let report = service.batch_store(&documents, 100, 3).await;
//! println!("{} chunks stored", report.stored);
//!
//! let response = service.query("space adventure", 3, None).await;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod distance;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod models;
pub mod mongodb;
pub mod pagination;
pub mod s3vectors;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use batch::{BatchReport, RetryPolicy};
pub use distance::{DistanceMethod, distance};
pub use embedding::{AzureOpenAIProvider, EmbeddingProvider};
pub use error::{VectorError, VectorResult};
pub use filter::{FilterCondition, FilterOp, MetadataFilter};
pub use models::{
    KeyPage, Metadata, MetadataValue, QueryMatch, QueryResponse, SearchRequest, UpsertSummary,
    VectorDocument, VectorRecord, metadata,
};
pub use self::mongodb::MongoVectorStore;
pub use s3vectors::S3VectorStore;
pub use service::VectorService;
pub use store::VectorStore;
