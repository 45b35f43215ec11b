//! Bucket management

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::listing::list_objects;
use crate::traits::{Bucket, ObjectStore};

/// Outcome of a bucket deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedBucket {
    /// Bucket name
    pub name: String,
    /// Number of objects removed before the bucket itself
    pub objects_removed: usize,
}

/// Manager for bucket operations
pub struct BucketManager<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> BucketManager<'a> {
    /// Create a BucketManager over an object storage backend
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// List all buckets
    pub async fn list(&self) -> Result<Vec<Bucket>> {
        self.store.list_buckets().await
    }

    /// Check whether a bucket with this name is visible in the listing
    pub async fn exists(&self, name: &str) -> Result<bool> {
        let buckets = self.store.list_buckets().await?;
        Ok(buckets.iter().any(|b| b.name == name))
    }

    /// Create a bucket, refusing to touch an existing one
    pub async fn create(&self, name: &str) -> Result<()> {
        if self.exists(name).await? {
            return Err(Error::AlreadyExists(format!("the bucket: {name}")));
        }
        self.store.create_bucket(name).await?;
        info!(bucket = name, "created bucket");
        Ok(())
    }

    /// Delete a bucket
    ///
    /// A bucket holding objects is only deleted when `force` is set, in which
    /// case every object is removed one at a time first. A failure part way
    /// through leaves the bucket partially emptied.
    pub async fn delete(&self, name: &str, force: bool) -> Result<DeletedBucket> {
        if !self.exists(name).await? {
            return Err(Error::BucketNotFound(name.to_string()));
        }

        let objects = list_objects(self.store, name, "").await?;
        if !objects.is_empty() && !force {
            return Err(Error::BucketNotEmpty(name.to_string()));
        }

        for object in &objects {
            debug!(bucket = name, key = %object.key, "removing object");
            self.store
                .delete_object(name, &object.key)
                .await
                .map_err(|e| {
                    e.context(|| format!("failed to remove the file: {} from bucket", object.key))
                })?;
        }

        self.store.delete_bucket(name).await?;
        info!(bucket = name, objects = objects.len(), "deleted bucket");

        Ok(DeletedBucket {
            name: name.to_string(),
            objects_removed: objects.len(),
        })
    }
}
