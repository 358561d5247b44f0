use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{VectorError, VectorResult};

/// Supported client-side distance measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMethod {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMethod::Cosine => "cosine",
            DistanceMethod::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMethod {
    type Err = VectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMethod::Cosine),
            "euclidean" => Ok(DistanceMethod::Euclidean),
            other => Err(VectorError::InvalidArgument(format!(
                "Unsupported distance method: {}",
                other
            ))),
        }
    }
}

/// Distance between two vectors by method name (`cosine` or `euclidean`).
///
/// `cosine` returns the similarity in [-1, 1]; `euclidean` the L2 norm of the
/// difference. Unknown methods, length mismatches and zero-norm vectors (for
/// cosine) are rejected with [`VectorError::InvalidArgument`].
pub fn distance(vec1: &[f32], vec2: &[f32], method: &str) -> VectorResult<f64> {
    let method: DistanceMethod = method.parse()?;
    distance_with(vec1, vec2, method)
}

/// Same as [`distance`] with an already-parsed method
pub fn distance_with(vec1: &[f32], vec2: &[f32], method: DistanceMethod) -> VectorResult<f64> {
    if vec1.len() != vec2.len() {
        return Err(VectorError::InvalidArgument(format!(
            "Vector length mismatch: {} vs {}",
            vec1.len(),
            vec2.len()
        )));
    }

    match method {
        DistanceMethod::Cosine => cosine_similarity(vec1, vec2),
        DistanceMethod::Euclidean => Ok(euclidean_distance(vec1, vec2)),
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> VectorResult<f64> {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return Err(VectorError::InvalidArgument(
            "Cosine similarity is undefined for zero-norm vectors".to_string(),
        ));
    }

    // Rounding can push identical vectors slightly past 1.0
    Ok((dot / denominator).clamp(-1.0, 1.0))
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = *x as f64 - *y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_cosine_identical_vectors() {
        let v = [0.3, -1.2, 4.5, 0.0001];
        let d = distance(&v, &v, "cosine").unwrap();
        assert!((d - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_orthogonal_unit_vectors() {
        let d = distance(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], "cosine").unwrap();
        assert!(d.abs() < EPS);
    }

    #[test]
    fn test_cosine_opposite_vectors() {
        let d = distance(&[1.0, 2.0], &[-1.0, -2.0], "cosine").unwrap();
        assert!((d + 1.0).abs() < EPS);
    }

    #[test]
    fn test_cosine_zero_norm_is_rejected() {
        let err = distance(&[0.0, 0.0], &[1.0, 0.0], "cosine").unwrap_err();
        assert!(matches!(err, VectorError::InvalidArgument(_)));
    }

    #[test]
    fn test_euclidean_identical_vectors() {
        let v = [1.5, 2.5, -3.5];
        assert_eq!(distance(&v, &v, "euclidean").unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_known_value() {
        let d = distance(&[0.0, 0.0], &[3.0, 4.0], "euclidean").unwrap();
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn test_unsupported_method() {
        for method in ["manhattan", "dot", ""] {
            let err = distance(&[1.0], &[1.0], method).unwrap_err();
            assert!(matches!(err, VectorError::InvalidArgument(_)));
        }
    }

    #[test]
    fn test_method_parse_is_case_insensitive() {
        assert_eq!("Cosine".parse::<DistanceMethod>().unwrap(), DistanceMethod::Cosine);
        assert_eq!(
            " EUCLIDEAN ".parse::<DistanceMethod>().unwrap(),
            DistanceMethod::Euclidean
        );
    }

    #[test]
    fn test_length_mismatch() {
        let err = distance(&[1.0, 2.0], &[1.0], "euclidean").unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }
}
