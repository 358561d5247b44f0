//! Amazon S3 Vectors backend

pub mod conversions;
mod store;

pub use store::S3VectorStore;
