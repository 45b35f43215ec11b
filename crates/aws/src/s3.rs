//! S3 object store
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from kmsctl-core.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, ServerSideEncryption};
use tracing::debug;

use kmsctl_core::{
    Bucket, Error, ObjectContent, ObjectEntry, ObjectPage, ObjectStore, PutObject, Result,
};

use crate::error::{classify, describe};

/// Region whose buckets must not carry a location constraint
const DEFAULT_S3_REGION: &str = "us-east-1";

/// Convert an SDK timestamp
pub(crate) fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(dt.secs()).ok()
}

/// S3 client wrapper
pub struct S3Store {
    inner: aws_sdk_s3::Client,
    region: Option<String>,
}

impl S3Store {
    /// Create a new S3 store from the shared SDK configuration
    ///
    /// Path-style addressing is used when a custom endpoint is configured.
    pub fn new(config: &SdkConfig) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(config.endpoint_url().is_some())
            .build();

        Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region: config.region().map(|r| r.to_string()),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| Error::Provider(describe(&e)))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| Bucket {
                name: b.name().unwrap_or_default().to_string(),
                created: b.creation_date().and_then(to_timestamp),
            })
            .collect();

        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.inner.create_bucket().bucket(bucket);

        if let Some(region) = self.region.as_deref().filter(|r| *r != DEFAULT_S3_REGION) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| classify(&e, || Error::BucketNotFound(bucket.to_string())))?;

        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| {
                let message = describe(&e);
                if message.contains("BucketNotEmpty") {
                    Error::BucketNotEmpty(bucket.to_string())
                } else {
                    classify(&e, || Error::BucketNotFound(bucket.to_string()))
                }
            })?;

        Ok(())
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: &str,
        token: Option<String>,
    ) -> Result<ObjectPage> {
        debug!(bucket, prefix, continuation = token.is_some(), "listing objects");
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .fetch_owner(true)
            .set_continuation_token(token)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::BucketNotFound(bucket.to_string())))?;

        let entries = response
            .contents()
            .iter()
            .map(|object| {
                let mut entry = ObjectEntry::new(
                    object.key().unwrap_or_default(),
                    object.size().unwrap_or(0),
                );
                entry.storage_class = object.storage_class().map(|sc| sc.as_str().to_string());
                entry.owner = object
                    .owner()
                    .and_then(|o| o.display_name().or(o.id()))
                    .map(str::to_string);
                entry.etag = object.e_tag().map(|t| t.trim_matches('"').to_string());
                entry.last_modified = object.last_modified().and_then(to_timestamp);
                entry
            })
            .collect();

        let next_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ObjectPage {
            entries,
            next_token,
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectContent> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::NotFound(format!("s3://{bucket}/{key}"))))?;

        let kms_key_id = response.ssekms_key_id().map(str::to_string);
        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Provider(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(ObjectContent { data, kms_key_id })
    }

    async fn put_object(&self, object: PutObject) -> Result<()> {
        let PutObject {
            bucket,
            key,
            data,
            content_type,
            kms_key_id,
        } = object;

        self.inner
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .server_side_encryption(ServerSideEncryption::AwsKms)
            .set_ssekms_key_id(kms_key_id)
            .set_content_type(content_type)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::BucketNotFound(bucket.clone())))?;

        Ok(())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(&e, || Error::NotFound(format!("s3://{bucket}/{key}"))))?;

        Ok(())
    }
}
