//! Mapping between domain types and BSON, plus pipeline builders.

use mongodb::bson::{doc, Bson, Document};

use crate::error::{VectorError, VectorResult};
use crate::filter::{FilterOp, MetadataFilter};
use crate::models::{Metadata, MetadataValue, QueryMatch, SearchRequest, VectorRecord};

pub const EMBEDDING_FIELD: &str = "embedding";
pub const METADATA_FIELD: &str = "metadata";
pub const KEY_FIELD: &str = "key";
pub const SCORE_FIELD: &str = "score";

pub fn value_to_bson(value: &MetadataValue) -> Bson {
    match value {
        MetadataValue::Bool(v) => Bson::Boolean(*v),
        MetadataValue::Integer(v) => Bson::Int64(*v),
        MetadataValue::Float(v) => Bson::Double(*v),
        MetadataValue::String(v) => Bson::String(v.clone()),
    }
}

/// Scalar BSON values only; anything else is skipped
pub fn bson_to_value(value: &Bson) -> Option<MetadataValue> {
    match value {
        Bson::Boolean(v) => Some(MetadataValue::Bool(*v)),
        Bson::Int32(v) => Some(MetadataValue::Integer(*v as i64)),
        Bson::Int64(v) => Some(MetadataValue::Integer(*v)),
        Bson::Double(v) => Some(MetadataValue::Float(*v)),
        Bson::String(v) => Some(MetadataValue::String(v.clone())),
        _ => None,
    }
}

pub fn metadata_to_bson(metadata: &Metadata) -> Document {
    metadata
        .iter()
        .map(|(k, v)| (k.clone(), value_to_bson(v)))
        .collect()
}

pub fn bson_to_metadata(document: &Document) -> Metadata {
    document
        .iter()
        .filter_map(|(k, v)| bson_to_value(v).map(|v| (k.clone(), v)))
        .collect()
}

pub fn embedding_to_bson(embedding: &[f32]) -> Bson {
    Bson::Array(embedding.iter().map(|v| Bson::Double(*v as f64)).collect())
}

pub fn bson_to_embedding(value: &Bson) -> VectorResult<Vec<f32>> {
    let array = value
        .as_array()
        .ok_or_else(|| VectorError::Internal("embedding is not an array".to_string()))?;

    array
        .iter()
        .map(|v| match v {
            Bson::Double(d) => Ok(*d as f32),
            Bson::Int32(i) => Ok(*i as f32),
            Bson::Int64(i) => Ok(*i as f32),
            other => Err(VectorError::Internal(format!(
                "non-numeric embedding component: {}",
                other
            ))),
        })
        .collect()
}

/// Filter and `$set` update for an upsert-by-key
pub fn upsert_parts(record: &VectorRecord) -> (Document, Document) {
    let filter = doc! { KEY_FIELD: &record.key };
    let update = doc! {
        "$set": {
            EMBEDDING_FIELD: embedding_to_bson(&record.embedding),
            METADATA_FIELD: metadata_to_bson(&record.metadata),
        }
    };
    (filter, update)
}

/// Render a metadata filter as MQL over `metadata.<field>` paths
pub fn filter_to_mql(filter: &MetadataFilter) -> Document {
    let mut clauses: Vec<Document> = filter
        .conditions
        .iter()
        .map(|condition| {
            let operand = match &condition.op {
                FilterOp::In(values) => Bson::Array(values.iter().map(value_to_bson).collect()),
                FilterOp::Eq(v)
                | FilterOp::Ne(v)
                | FilterOp::Gt(v)
                | FilterOp::Gte(v)
                | FilterOp::Lt(v)
                | FilterOp::Lte(v) => value_to_bson(v),
            };
            let path = format!("{}.{}", METADATA_FIELD, condition.field);
            doc! { path: { condition.op.operator(): operand } }
        })
        .collect();

    match clauses.len() {
        0 => Document::new(),
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    }
}

/// Aggregation pipeline for a top-k search.
///
/// `$vectorSearch` must be the first stage; the metadata pre-filter goes
/// inside it, which requires the filtered paths to be declared as `filter`
/// fields on the Atlas index.
pub fn search_pipeline(
    request: &SearchRequest,
    index_name: &str,
    num_candidates_factor: u32,
) -> Vec<Document> {
    let limit = request.top_k as i64;
    let num_candidates = limit.saturating_mul(num_candidates_factor.max(1) as i64);

    let mut vector_search = doc! {
        "index": index_name,
        "path": EMBEDDING_FIELD,
        "queryVector": embedding_to_bson(&request.vector),
        "numCandidates": num_candidates,
        "limit": limit,
    };

    if let Some(filter) = request.filter.as_ref().filter(|f| !f.is_empty()) {
        vector_search.insert("filter", filter_to_mql(filter));
    }

    vec![
        doc! { "$vectorSearch": vector_search },
        doc! { "$set": { SCORE_FIELD: { "$meta": "vectorSearchScore" } } },
        doc! { "$project": { "_id": 0, EMBEDDING_FIELD: 0 } },
    ]
}

pub fn document_to_match(document: &Document) -> VectorResult<QueryMatch> {
    let key = document
        .get_str(KEY_FIELD)
        .map_err(|e| VectorError::Internal(format!("search result without key: {}", e)))?;

    let score = match document.get(SCORE_FIELD) {
        Some(Bson::Double(s)) => *s,
        Some(Bson::Int32(s)) => *s as f64,
        Some(Bson::Int64(s)) => *s as f64,
        _ => 0.0,
    };

    let metadata = document
        .get_document(METADATA_FIELD)
        .map(bson_to_metadata)
        .unwrap_or_default();

    Ok(QueryMatch {
        key: key.to_string(),
        distance: score_to_distance(score),
        metadata,
    })
}

/// `vectorSearchScore` grows with similarity; flip it so lower is closer
pub fn score_to_distance(score: f64) -> f32 {
    (1.0 - score) as f32
}

/// Cursor for the next keyset page: the last key, but only after a full page
pub fn next_page_token(keys: &[String], returned: usize, page_size: i64) -> Option<String> {
    if page_size > 0 && returned as i64 >= page_size {
        keys.last().cloned()
    } else {
        None
    }
}

pub fn document_to_record(document: &Document) -> VectorResult<VectorRecord> {
    let key = document
        .get_str(KEY_FIELD)
        .map_err(|e| VectorError::Internal(format!("stored vector without key: {}", e)))?;

    let embedding = match document.get(EMBEDDING_FIELD) {
        Some(value) => bson_to_embedding(value)?,
        None => Vec::new(),
    };

    let metadata = document
        .get_document(METADATA_FIELD)
        .map(bson_to_metadata)
        .unwrap_or_default();

    Ok(VectorRecord {
        key: key.to_string(),
        embedding,
        metadata,
    })
}
