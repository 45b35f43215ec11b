//! In-memory provider used by unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::traits::{
    Bucket, KeyAlias, KeyMetadata, KeyStore, ObjectContent, ObjectEntry, ObjectPage, ObjectStore,
    PutObject,
};

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, ObjectContent>>,
    aliases: Vec<KeyAlias>,
    keys_created: usize,
    scheduled: Vec<String>,
    puts: Vec<PutObject>,
    gets: usize,
}

/// Object store and key store backed by maps
pub struct MemoryStore {
    state: Mutex<State>,
    page_size: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 1000,
        }
    }

    /// Serve listings in pages of `size` entries
    pub fn with_page_size(size: usize) -> Self {
        Self {
            page_size: size,
            ..Self::new()
        }
    }

    pub fn add_bucket(&self, bucket: &str) {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default();
    }

    pub fn add_object(&self, bucket: &str, key: &str, data: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(
                key.to_string(),
                ObjectContent {
                    data: data.to_vec(),
                    kms_key_id: Some("key-existing".to_string()),
                },
            );
    }

    pub fn add_alias(&self, alias: KeyAlias) {
        self.state.lock().unwrap().aliases.push(alias);
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.state.lock().unwrap().buckets.contains_key(bucket)
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<ObjectContent> {
        self.state
            .lock()
            .unwrap()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn puts(&self) -> Vec<PutObject> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn gets(&self) -> usize {
        self.state.lock().unwrap().gets
    }

    pub fn created_keys(&self) -> usize {
        self.state.lock().unwrap().keys_created
    }

    pub fn scheduled_deletions(&self) -> Vec<String> {
        self.state.lock().unwrap().scheduled.clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let state = self.state.lock().unwrap();
        Ok(state.buckets.keys().map(Bucket::new).collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.add_bucket(bucket);
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.buckets.get(bucket) {
            None => Err(Error::BucketNotFound(bucket.to_string())),
            Some(objects) if !objects.is_empty() => {
                Err(Error::Provider("BucketNotEmpty".to_string()))
            }
            Some(_) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ObjectPage> {
        let state = self.state.lock().unwrap();
        let objects = state
            .buckets
            .get(bucket)
            .ok_or_else(|| Error::BucketNotFound(bucket.to_string()))?;

        let start: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
        let matching: Vec<ObjectEntry> = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, content)| ObjectEntry::new(key.clone(), content.data.len() as i64))
            .collect();

        let end = (start + self.page_size).min(matching.len());
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ObjectPage {
            entries: matching[start.min(end)..end].to_vec(),
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent> {
        let mut state = self.state.lock().unwrap();
        state.gets += 1;
        state
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
            .ok_or_else(|| Error::NotFound(format!("{bucket}/{key}")))
    }

    async fn put_object(&self, object: PutObject) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let objects = state
            .buckets
            .get_mut(&object.bucket)
            .ok_or_else(|| Error::BucketNotFound(object.bucket.clone()))?;
        objects.insert(
            object.key.clone(),
            ObjectContent {
                data: object.data.clone(),
                kms_key_id: object.kms_key_id.clone(),
            },
        );
        state.puts.push(object);
        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(objects) = state.buckets.get_mut(bucket) {
            objects.remove(key);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn list_aliases(&self) -> Result<Vec<KeyAlias>> {
        Ok(self.state.lock().unwrap().aliases.clone())
    }

    async fn create_key(&self, description: &str) -> Result<KeyMetadata> {
        let mut state = self.state.lock().unwrap();
        state.keys_created += 1;
        let key_id = format!("key-{}", state.keys_created);
        tracing::trace!(description, key_id, "memory key created");
        Ok(KeyMetadata {
            arn: format!("arn:aws:kms:eu-west-1:123456789012:key/{key_id}"),
            key_id,
            account_id: Some("123456789012".to_string()),
        })
    }

    async fn create_alias(&self, alias_name: &str, target_key_id: &str) -> Result<()> {
        self.add_alias(KeyAlias::new(alias_name, target_key_id));
        Ok(())
    }

    async fn delete_alias(&self, alias_name: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .aliases
            .retain(|a| a.alias_name != alias_name);
        Ok(())
    }

    async fn schedule_key_deletion(&self, key_id: &str, _pending_window_days: i32) -> Result<()> {
        self.state.lock().unwrap().scheduled.push(key_id.to_string());
        Ok(())
    }
}
