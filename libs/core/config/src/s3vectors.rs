use std::fmt;

use crate::{env_required, redact, ConfigError, FromEnv};

/// Amazon S3 Vectors settings
#[derive(Clone)]
pub struct S3VectorsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    pub index_name: String,
}

impl S3VectorsConfig {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
            bucket: bucket.into(),
            index_name: index_name.into(),
        }
    }
}

impl fmt::Debug for S3VectorsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3VectorsConfig")
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("index_name", &self.index_name)
            .finish()
    }
}

impl FromEnv for S3VectorsConfig {
    /// Requires AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, S3_VECTORS_REGION,
    /// S3_VECTORS_BUCKET and S3_VECTORS_INDEX (no defaults).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_key_id: env_required("AWS_ACCESS_KEY_ID")?,
            secret_access_key: env_required("AWS_SECRET_ACCESS_KEY")?,
            region: env_required("S3_VECTORS_REGION")?,
            bucket: env_required("S3_VECTORS_BUCKET")?,
            index_name: env_required("S3_VECTORS_INDEX")?,
        })
    }
}
