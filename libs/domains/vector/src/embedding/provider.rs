use async_trait::async_trait;

use crate::error::VectorResult;

/// Trait for embedding generation providers
///
/// Store adapters hold one of these rather than talking to an embedding API
/// themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model or deployment name, for logs
    fn model(&self) -> &str;

    /// Generate the embedding for a single non-empty text
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>>;
}
