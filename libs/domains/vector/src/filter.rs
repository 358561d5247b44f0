//! Metadata filters for similarity search.
//!
//! A [`MetadataFilter`] is a conjunction of per-field conditions. Each backend
//! renders it into its own dialect (see `mongodb::conversions` and
//! `s3vectors::conversions`).

use serde::{Deserialize, Serialize};

use crate::models::MetadataValue;

/// Comparison applied to a single metadata field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq(MetadataValue),
    Ne(MetadataValue),
    Gt(MetadataValue),
    Gte(MetadataValue),
    Lt(MetadataValue),
    Lte(MetadataValue),
    In(Vec<MetadataValue>),
}

impl FilterOp {
    /// Operator keyword shared by both backends
    pub fn operator(&self) -> &'static str {
        match self {
            FilterOp::Eq(_) => "$eq",
            FilterOp::Ne(_) => "$ne",
            FilterOp::Gt(_) => "$gt",
            FilterOp::Gte(_) => "$gte",
            FilterOp::Lt(_) => "$lt",
            FilterOp::Lte(_) => "$lte",
            FilterOp::In(_) => "$in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub op: FilterOp,
}

/// Conjunction of metadata conditions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub conditions: Vec<FilterCondition>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single equality condition
    pub fn eq(field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        Self::new().and(field, FilterOp::Eq(value.into()))
    }

    /// Inclusive range over a numeric field; either bound may be omitted
    pub fn range(
        field: impl Into<String>,
        min: Option<MetadataValue>,
        max: Option<MetadataValue>,
    ) -> Self {
        let field = field.into();
        let mut filter = Self::new();
        if let Some(min) = min {
            filter = filter.and(field.clone(), FilterOp::Gte(min));
        }
        if let Some(max) = max {
            filter = filter.and(field, FilterOp::Lte(max));
        }
        filter
    }

    pub fn and(mut self, field: impl Into<String>, op: FilterOp) -> Self {
        self.conditions.push(FilterCondition {
            field: field.into(),
            op,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}
