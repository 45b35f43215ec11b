//! kmsctl-aws: AWS adapter for the kmsctl secrets CLI
//!
//! This crate provides the implementations of the ObjectStore and KeyStore
//! traits using aws-sdk-s3 and aws-sdk-kms. It is the only crate that
//! directly depends on the AWS SDK.

mod error;
pub mod kms;
pub mod s3;
pub mod session;

pub use kms::KmsStore;
pub use s3::S3Store;
pub use session::{CredentialSource, SessionOptions, load_config};

/// Both provider handles, built from one session
pub struct Clients {
    /// Object storage
    pub s3: S3Store,
    /// Key management
    pub kms: KmsStore,
}

impl Clients {
    /// Build the S3 and KMS clients from the session options
    pub async fn connect(options: &SessionOptions) -> kmsctl_core::Result<Self> {
        let config = load_config(options).await?;
        Ok(Self {
            s3: S3Store::new(&config),
            kms: KmsStore::new(&config),
        })
    }
}
