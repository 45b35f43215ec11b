//! Provider trait definitions
//!
//! `ObjectStore` and `KeyStore` define the interface to the object storage and
//! key management backends. They allow the core to be decoupled from the
//! specific SDK implementation and to be faked in tests.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Prefix the key management service puts in front of every alias name
pub const ALIAS_PREFIX: &str = "alias/";

/// Server-side encryption mode requested for every uploaded object
pub const SSE_KMS: &str = "aws:kms";

/// A named pointer to a provider encryption key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAlias {
    /// Full alias name as reported by the provider, e.g. `alias/prod`
    pub alias_name: String,

    /// Identifier of the key the alias points at (None for unassigned aliases)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_key_id: Option<String>,
}

impl KeyAlias {
    /// Create an alias pointing at a key
    pub fn new(alias_name: impl Into<String>, target_key_id: impl Into<String>) -> Self {
        Self {
            alias_name: alias_name.into(),
            target_key_id: Some(target_key_id.into()),
        }
    }

    /// The alias name with the provider `alias/` prefix removed
    pub fn short_name(&self) -> &str {
        self.alias_name
            .strip_prefix(ALIAS_PREFIX)
            .unwrap_or(&self.alias_name)
    }
}

/// Metadata returned when a key is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetadata {
    /// Provider key id
    pub key_id: String,

    /// Fully qualified key ARN
    pub arn: String,

    /// Account owning the key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

/// A storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Bucket name
    pub name: String,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,
}

impl Bucket {
    /// Create a bucket record without a creation date
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: None,
        }
    }
}

/// A logical file in a bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key
    pub key: String,

    /// Size in bytes
    pub size: i64,

    /// Human-readable size
    pub size_human: String,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Owner display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl ObjectEntry {
    /// Create a new entry for an object of the given size
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            size_human: humansize::format_size(size.max(0) as u64, humansize::BINARY),
            storage_class: None,
            owner: None,
            etag: None,
            last_modified: None,
        }
    }

    /// Whether this entry is a pseudo-directory marker rather than a real file
    pub fn is_dir_marker(&self) -> bool {
        self.key.ends_with('/')
    }
}

/// One page of an object listing
#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    /// Objects in this page
    pub entries: Vec<ObjectEntry>,

    /// Token for the next page, None when the listing is complete
    pub next_token: Option<String>,
}

/// Content of a fetched object
#[derive(Debug, Clone, Default)]
pub struct ObjectContent {
    /// Decrypted object bytes
    pub data: Vec<u8>,

    /// KMS key the object was encrypted with, if any
    pub kms_key_id: Option<String>,
}

/// A single object upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObject {
    /// Target bucket
    pub bucket: String,

    /// Target key
    pub key: String,

    /// Raw content
    pub data: Vec<u8>,

    /// Content type sent with the object
    pub content_type: Option<String>,

    /// KMS key used for server-side encryption (None uses the account default key)
    pub kms_key_id: Option<String>,
}

/// Trait for object storage operations
///
/// This trait is implemented by the AWS adapter and faked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets visible to the caller
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// Create a bucket
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// List one page of objects under a prefix
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ObjectPage>;

    /// Fetch an object's content
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent>;

    /// Upload an object with server-side KMS encryption
    async fn put_object(&self, object: PutObject) -> Result<()>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;
}

/// Trait for key management operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// List every alias in the account and region
    async fn list_aliases(&self) -> Result<Vec<KeyAlias>>;

    /// Create a new symmetric key
    async fn create_key(&self, description: &str) -> Result<KeyMetadata>;

    /// Bind an alias (including the `alias/` prefix) to a key
    async fn create_alias(&self, alias_name: &str, target_key_id: &str) -> Result<()>;

    /// Remove an alias (including the `alias/` prefix)
    async fn delete_alias(&self, alias_name: &str) -> Result<()>;

    /// Schedule a key for deletion after the pending window
    async fn schedule_key_deletion(&self, key_id: &str, pending_window_days: i32) -> Result<()>;
}
