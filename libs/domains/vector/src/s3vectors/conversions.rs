//! Mapping between domain types and S3 Vectors' `Document` payloads

use std::collections::HashMap;

use aws_smithy_types::{Document, Number};

use crate::filter::{FilterOp, MetadataFilter};
use crate::models::{Metadata, MetadataValue};

pub fn value_to_document(value: &MetadataValue) -> Document {
    match value {
        MetadataValue::Bool(v) => Document::Bool(*v),
        MetadataValue::Integer(v) if *v >= 0 => Document::Number(Number::PosInt(*v as u64)),
        MetadataValue::Integer(v) => Document::Number(Number::NegInt(*v)),
        MetadataValue::Float(v) => Document::Number(Number::Float(*v)),
        MetadataValue::String(v) => Document::String(v.clone()),
    }
}

/// Scalar documents only; nested objects, arrays and nulls yield `None`
pub fn document_to_value(document: &Document) -> Option<MetadataValue> {
    match document {
        Document::Bool(v) => Some(MetadataValue::Bool(*v)),
        Document::String(v) => Some(MetadataValue::String(v.clone())),
        Document::Number(Number::PosInt(v)) => {
            Some(i64::try_from(*v).map_or(MetadataValue::Float(*v as f64), MetadataValue::Integer))
        }
        Document::Number(Number::NegInt(v)) => Some(MetadataValue::Integer(*v)),
        Document::Number(Number::Float(v)) => Some(MetadataValue::Float(*v)),
        _ => None,
    }
}

pub fn metadata_to_document(metadata: &Metadata) -> Document {
    Document::Object(
        metadata
            .iter()
            .map(|(k, v)| (k.clone(), value_to_document(v)))
            .collect(),
    )
}

/// Non-object documents produce empty metadata
pub fn document_to_metadata(document: &Document) -> Metadata {
    match document {
        Document::Object(fields) => fields
            .iter()
            .filter_map(|(k, v)| document_to_value(v).map(|v| (k.clone(), v)))
            .collect(),
        _ => Metadata::new(),
    }
}

fn condition_document(field: &str, op: &FilterOp) -> Document {
    let operand = match op {
        FilterOp::Eq(v)
        | FilterOp::Ne(v)
        | FilterOp::Gt(v)
        | FilterOp::Gte(v)
        | FilterOp::Lt(v)
        | FilterOp::Lte(v) => value_to_document(v),
        FilterOp::In(values) => Document::Array(values.iter().map(value_to_document).collect()),
    };

    let mut inner = HashMap::new();
    inner.insert(op.operator().to_string(), operand);

    let mut outer = HashMap::new();
    outer.insert(field.to_string(), Document::Object(inner));
    Document::Object(outer)
}

/// Render a filter in the S3 Vectors metadata filter language
///
/// Metadata keys are addressed directly. More than one condition is wrapped
/// in `$and`.
pub fn filter_to_document(filter: &MetadataFilter) -> Option<Document> {
    let mut clauses: Vec<Document> = filter
        .conditions
        .iter()
        .map(|c| condition_document(&c.field, &c.op))
        .collect();

    match clauses.len() {
        0 => None,
        1 => clauses.pop(),
        _ => {
            let mut and = HashMap::new();
            and.insert("$and".to_string(), Document::Array(clauses));
            Some(Document::Object(and))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metadata;

    fn object(pairs: Vec<(&str, Document)>) -> Document {
        Document::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_integers_use_signed_variants() {
        assert_eq!(
            value_to_document(&MetadataValue::Integer(1977)),
            Document::Number(Number::PosInt(1977))
        );
        assert_eq!(
            value_to_document(&MetadataValue::Integer(-3)),
            Document::Number(Number::NegInt(-3))
        );
        assert_eq!(
            document_to_value(&Document::Number(Number::PosInt(1977))),
            Some(MetadataValue::Integer(1977))
        );
    }

    #[test]
    fn test_metadata_document_round_trip() {
        let meta = metadata([
            ("genre", MetadataValue::from("scifi")),
            ("year", MetadataValue::from(1977)),
            ("rating", MetadataValue::from(8.6)),
        ]);
        assert_eq!(document_to_metadata(&metadata_to_document(&meta)), meta);
    }

    #[test]
    fn test_unsupported_documents_are_dropped() {
        let document = object(vec![
            ("genre", Document::String("family".into())),
            ("cast", Document::Array(vec![])),
            ("missing", Document::Null),
        ]);
        assert_eq!(document_to_metadata(&document), metadata([("genre", "family")]));
        assert!(document_to_metadata(&Document::Null).is_empty());
    }

    #[test]
    fn test_single_condition_filter() {
        let rendered = filter_to_document(&MetadataFilter::eq("genre", "scifi")).unwrap();
        assert_eq!(
            rendered,
            object(vec![(
                "genre",
                object(vec![("$eq", Document::String("scifi".into()))])
            )])
        );
    }

    #[test]
    fn test_multiple_conditions_use_and() {
        let filter = MetadataFilter::range("year", Some(1990.into()), Some(2000.into()));
        let rendered = filter_to_document(&filter).unwrap();
        match rendered {
            Document::Object(fields) => match fields.get("$and") {
                Some(Document::Array(clauses)) => assert_eq!(clauses.len(), 2),
                other => panic!("expected $and array, got {:?}", other),
            },
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_filter_renders_nothing() {
        assert!(filter_to_document(&MetadataFilter::new()).is_none());
    }
}
