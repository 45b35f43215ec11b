//! KMS key and alias management
//!
//! Keys are addressed by a human-readable alias name. The provider stores
//! aliases as `alias/<name>`; callers always use the short form.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::{ALIAS_PREFIX, KeyAlias, KeyMetadata, KeyStore};

/// Pending window applied when a key deletion is scheduled
pub const DELETION_WINDOW_DAYS: i32 = 7;

/// Manager for key and alias operations
pub struct KeyManager<'a> {
    store: &'a dyn KeyStore,
}

impl<'a> KeyManager<'a> {
    /// Create a KeyManager over a key management backend
    pub fn new(store: &'a dyn KeyStore) -> Self {
        Self { store }
    }

    /// List every alias that points at a key
    pub async fn list_keys(&self) -> Result<Vec<KeyAlias>> {
        let aliases = self.store.list_aliases().await?;
        Ok(aliases
            .into_iter()
            .filter(|a| a.target_key_id.is_some())
            .collect())
    }

    /// Find the first alias whose short name equals `name`
    pub async fn resolve_alias(&self, name: &str) -> Result<KeyAlias> {
        let aliases = self.store.list_aliases().await?;
        debug!(count = aliases.len(), name, "resolving kms alias");

        aliases
            .into_iter()
            .find(|a| a.short_name() == name)
            .ok_or_else(|| Error::AliasNotFound(name.to_string()))
    }

    /// Check whether an alias with this name exists
    pub async fn alias_exists(&self, name: &str) -> Result<bool> {
        match self.resolve_alias(name).await {
            Ok(_) => Ok(true),
            Err(Error::AliasNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Create a key and bind `alias/<name>` to it
    ///
    /// The key and the alias are created by two separate calls; a failure in
    /// between leaves an unaliased key behind.
    pub async fn create_key(&self, name: &str, description: &str) -> Result<KeyMetadata> {
        if self.alias_exists(name).await? {
            return Err(Error::AlreadyExists(format!("kms alias: {name}")));
        }

        let metadata = self.store.create_key(description).await?;
        let alias_name = format!("{ALIAS_PREFIX}{name}");
        self.store.create_alias(&alias_name, &metadata.arn).await?;

        info!(alias = %alias_name, arn = %metadata.arn, "created kms key");
        Ok(metadata)
    }

    /// Remove an alias and optionally schedule its key for deletion
    pub async fn delete_key(&self, name: &str, schedule_deletion: bool) -> Result<KeyAlias> {
        let alias = self.resolve_alias(name).await?;
        self.store.delete_alias(&alias.alias_name).await?;

        if schedule_deletion {
            if let Some(key_id) = &alias.target_key_id {
                self.store
                    .schedule_key_deletion(key_id, DELETION_WINDOW_DAYS)
                    .await?;
                info!(alias = %alias.alias_name, key_id, "scheduled kms key deletion");
            }
        }

        Ok(alias)
    }
}
