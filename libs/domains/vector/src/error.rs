use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pagination error: {0}")]
    Pagination(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl From<reqwest::Error> for VectorError {
    fn from(err: reqwest::Error) -> Self {
        VectorError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for VectorError {
    fn from(err: serde_json::Error) -> Self {
        VectorError::Internal(format!("JSON error: {}", err))
    }
}

impl From<mongodb::error::Error> for VectorError {
    fn from(err: mongodb::error::Error) -> Self {
        VectorError::Backend(format!("MongoDB: {}", err))
    }
}

impl From<mongodb::bson::ser::Error> for VectorError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        VectorError::Internal(format!("BSON serialization error: {}", err))
    }
}

impl From<mongodb::bson::de::Error> for VectorError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        VectorError::Internal(format!("BSON deserialization error: {}", err))
    }
}

impl<E, R> From<aws_sdk_s3vectors::error::SdkError<E, R>> for VectorError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    fn from(err: aws_sdk_s3vectors::error::SdkError<E, R>) -> Self {
        VectorError::Backend(format!(
            "S3 Vectors: {}",
            aws_sdk_s3vectors::error::DisplayErrorContext(&err)
        ))
    }
}

impl From<aws_sdk_s3vectors::error::BuildError> for VectorError {
    fn from(err: aws_sdk_s3vectors::error::BuildError) -> Self {
        VectorError::Validation(format!("S3 Vectors request: {}", err))
    }
}

impl From<core_config::ConfigError> for VectorError {
    fn from(err: core_config::ConfigError) -> Self {
        VectorError::Config(err.to_string())
    }
}
