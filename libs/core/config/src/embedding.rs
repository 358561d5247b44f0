use std::fmt;

use crate::{env_required, redact, ConfigError, FromEnv};

/// Azure OpenAI embedding endpoint settings
#[derive(Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub api_version: String,
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,
    /// Deployment / model name used both in the URL and the request body
    pub model: String,
}

impl EmbeddingConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_version: api_version.into(),
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }

    /// Full embeddings URL for the configured deployment
    pub fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            self.api_version
        )
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_version", &self.api_version)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl FromEnv for EmbeddingConfig {
    /// All four variables are required:
    /// - AZURE_OPENAI_API_KEY
    /// - AZURE_OPENAI_API_VERSION
    /// - AZURE_OPENAI_ENDPOINT
    /// - AZURE_OPENAI_EMBEDDING_MODEL
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: env_required("AZURE_OPENAI_API_KEY")?,
            api_version: env_required("AZURE_OPENAI_API_VERSION")?,
            endpoint: env_required("AZURE_OPENAI_ENDPOINT")?,
            model: env_required("AZURE_OPENAI_EMBEDDING_MODEL")?,
        })
    }
}
