//! KMS key store
//!
//! Wraps aws-sdk-kms and implements the KeyStore trait from kmsctl-core.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kms::types::OriginType;
use tracing::debug;

use kmsctl_core::{Error, KeyAlias, KeyMetadata, KeyStore, Result};

use crate::error::classify;

/// KMS client wrapper
pub struct KmsStore {
    inner: aws_sdk_kms::Client,
}

impl KmsStore {
    /// Create a new KMS store from the shared SDK configuration
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            inner: aws_sdk_kms::Client::new(config),
        }
    }
}

#[async_trait]
impl KeyStore for KmsStore {
    async fn list_aliases(&self) -> Result<Vec<KeyAlias>> {
        let mut aliases = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .inner
                .list_aliases()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| classify(&e, || Error::Provider("kms aliases unavailable".into())))?;

            aliases.extend(response.aliases().iter().filter_map(|entry| {
                entry.alias_name().map(|name| KeyAlias {
                    alias_name: name.to_string(),
                    target_key_id: entry.target_key_id().map(str::to_string),
                })
            }));

            match response.next_marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }

        debug!(count = aliases.len(), "listed kms aliases");
        Ok(aliases)
    }

    async fn create_key(&self, description: &str) -> Result<KeyMetadata> {
        let response = self
            .inner
            .create_key()
            .description(description)
            .origin(OriginType::AwsKms)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::Provider("kms key creation failed".into())))?;

        let metadata = response
            .key_metadata()
            .ok_or_else(|| Error::Provider("kms returned no key metadata".into()))?;

        let key_id = metadata.key_id().to_string();
        Ok(KeyMetadata {
            arn: metadata.arn().map(str::to_string).unwrap_or_else(|| key_id.clone()),
            account_id: metadata.aws_account_id().map(str::to_string),
            key_id,
        })
    }

    async fn create_alias(&self, alias_name: &str, target_key_id: &str) -> Result<()> {
        self.inner
            .create_alias()
            .alias_name(alias_name)
            .target_key_id(target_key_id)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::NotFound(target_key_id.to_string())))?;

        Ok(())
    }

    async fn delete_alias(&self, alias_name: &str) -> Result<()> {
        self.inner
            .delete_alias()
            .alias_name(alias_name)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::AliasNotFound(alias_name.to_string())))?;

        Ok(())
    }

    async fn schedule_key_deletion(&self, key_id: &str, pending_window_days: i32) -> Result<()> {
        self.inner
            .schedule_key_deletion()
            .key_id(key_id)
            .pending_window_in_days(pending_window_days)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::NotFound(key_id.to_string())))?;

        Ok(())
    }
}
