mod azure_openai;
mod provider;

pub use azure_openai::AzureOpenAIProvider;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
