//! kmsctl-core: Core library for the kmsctl secrets CLI
//!
//! This crate provides the core functionality for kmsctl, including:
//! - Configuration management
//! - KMS alias resolution and key lifecycle
//! - Bucket management
//! - Object traversal and filtering
//! - Download, upload and inline editing of encrypted objects
//!
//! This crate is designed to be independent of any specific cloud SDK;
//! every operation works against the `ObjectStore` and `KeyStore` traits.

pub mod buckets;
pub mod config;
pub mod edit;
pub mod error;
pub mod keys;
pub mod listing;
pub mod traits;
pub mod transfer;

#[cfg(test)]
mod testing;

pub use buckets::{BucketManager, DeletedBucket};
pub use config::{Config, ConfigManager};
pub use edit::{EditOutcome, Edited, Editor, edit_remote_file};
pub use error::{Error, Result};
pub use keys::KeyManager;
pub use listing::{Traversal, compile_filter};
pub use traits::{
    Bucket, KeyAlias, KeyMetadata, KeyStore, ObjectContent, ObjectEntry, ObjectPage, ObjectStore,
    PutObject,
};
pub use transfer::{DownloadRequest, Downloaded, Transfer, UploadRequest, Uploaded};
