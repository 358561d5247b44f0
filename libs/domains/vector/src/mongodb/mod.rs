//! MongoDB Atlas vector search backend

pub mod conversions;
mod store;

pub use store::MongoVectorStore;
