use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::MetadataFilter;

/// Scalar metadata value attached to a vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(v) => write!(f, "{}", v),
            MetadataValue::Integer(v) => write!(f, "{}", v),
            MetadataValue::Float(v) => write!(f, "{}", v),
            MetadataValue::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        MetadataValue::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        MetadataValue::String(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        MetadataValue::Integer(value)
    }
}

impl From<i32> for MetadataValue {
    fn from(value: i32) -> Self {
        MetadataValue::Integer(value as i64)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        MetadataValue::Float(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        MetadataValue::Bool(value)
    }
}

/// Metadata mapping, ordered by field name
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Build a [`Metadata`] map from `(field, value)` pairs
pub fn metadata<K, V, I>(pairs: I) -> Metadata
where
    K: Into<String>,
    V: Into<MetadataValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Caller-facing input: text that still needs embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorDocument {
    pub key: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl VectorDocument {
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A stored vector, keyed by a caller-supplied unique key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub key: String,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl VectorRecord {
    pub fn new(key: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            key: key.into(),
            embedding,
            metadata: Metadata::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One similarity search hit. The embedding is never returned.
///
/// Lower `distance` is closer on both backends. S3 Vectors reports the index's
/// own distance; MongoDB reports `1 - vectorSearchScore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMatch {
    pub key: String,
    pub distance: f32,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Backend search parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub vector: Vec<f32>,
    pub top_k: u32,
    pub filter: Option<MetadataFilter>,
}

impl SearchRequest {
    pub fn new(vector: Vec<f32>, top_k: u32) -> Self {
        Self {
            vector,
            top_k,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Counts reported by a bulk upsert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertSummary {
    pub upserted: u64,
    pub modified: u64,
}

impl UpsertSummary {
    pub fn total(&self) -> u64 {
        self.upserted + self.modified
    }
}

/// One page of a key listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPage {
    pub keys: Vec<String>,
    pub next_token: Option<String>,
}

impl KeyPage {
    pub fn new(keys: Vec<String>, next_token: Option<String>) -> Self {
        Self { keys, next_token }
    }

    pub fn last(keys: Vec<String>) -> Self {
        Self {
            keys,
            next_token: None,
        }
    }
}

/// Result of a text query: either ordered matches or an error payload.
///
/// Serializes to a JSON array or to `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Matches(Vec<QueryMatch>),
    Error { error: String },
}

impl QueryResponse {
    pub const EMBEDDING_FAILED: &'static str = "Failed to generate embedding";

    pub fn error(message: impl Into<String>) -> Self {
        QueryResponse::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResponse::Error { .. })
    }

    pub fn matches(&self) -> &[QueryMatch] {
        match self {
            QueryResponse::Matches(matches) => matches,
            QueryResponse::Error { .. } => &[],
        }
    }
}
