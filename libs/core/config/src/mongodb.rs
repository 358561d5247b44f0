use std::fmt;

use crate::{env_or_default, env_parse_or, env_required, ConfigError, FromEnv};

/// MongoDB Atlas vector search settings
#[derive(Clone)]
pub struct MongoVectorConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Name of the Atlas vector search index on the `embedding` path
    pub index_name: String,
    /// `numCandidates` is `top_k` multiplied by this factor
    pub num_candidates_factor: u32,
    /// Page size used when listing keys for delete-all
    pub page_size: i64,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoVectorConfig {
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
            index_name: "vector_index".to_string(),
            num_candidates_factor: 10,
            page_size: 500,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }
}

// The URI usually carries credentials
impl fmt::Debug for MongoVectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoVectorConfig")
            .field("uri", &"<redacted>")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("index_name", &self.index_name)
            .field("num_candidates_factor", &self.num_candidates_factor)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl FromEnv for MongoVectorConfig {
    /// Requires MONGO_URI, MONGO_DATABASE and MONGO_COLLECTION.
    /// MONGO_VECTOR_INDEX defaults to `vector_index`,
    /// MONGO_NUM_CANDIDATES_FACTOR to 10 and MONGO_PAGE_SIZE to 500.
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::new(String::new(), String::new(), String::new());
        Ok(Self {
            uri: env_required("MONGO_URI")?,
            database: env_required("MONGO_DATABASE")?,
            collection: env_required("MONGO_COLLECTION")?,
            index_name: env_or_default("MONGO_VECTOR_INDEX", &defaults.index_name),
            num_candidates_factor: env_parse_or(
                "MONGO_NUM_CANDIDATES_FACTOR",
                defaults.num_candidates_factor,
            )?,
            page_size: env_parse_or("MONGO_PAGE_SIZE", defaults.page_size)?,
            connect_timeout_secs: defaults.connect_timeout_secs,
            server_selection_timeout_secs: defaults.server_selection_timeout_secs,
        })
    }
}
