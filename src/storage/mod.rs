//! Durable Storage Module
//!
//! File-backed equivalents of the platform's storage primitives: a
//! key-value store for state blobs and an append-only dataset for scraped
//! records. Both live under the configured storage directory.

pub mod dataset;
pub mod key_value_store;

pub use dataset::Dataset;
pub use key_value_store::KeyValueStore;
