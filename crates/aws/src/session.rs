//! Shared AWS session
//!
//! Builds the single `SdkConfig` both the S3 and the KMS clients are created
//! from: a mandatory region plus either static credentials, a named profile
//! or the SDK default provider chain.

use std::path::PathBuf;

use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use kmsctl_core::{Error, Result};

/// Inputs for building the AWS session
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// AWS region holding the bucket and keys
    pub region: String,
    /// Static access key id
    pub access_key: Option<String>,
    /// Static secret access key
    pub secret_key: Option<String>,
    /// Session token for temporary static credentials
    pub session_token: Option<String>,
    /// Named profile from the shared credentials file
    pub profile: Option<String>,
    /// Path to the shared credentials file
    pub credentials_file: Option<PathBuf>,
    /// Custom endpoint for S3/KMS compatible services
    pub endpoint: Option<String>,
}

/// How the session will authenticate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Access key and secret key given explicitly
    Static,
    /// Named profile, optionally from a custom credentials file
    Profile(String),
    /// SDK default provider chain
    DefaultChain,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl SessionOptions {
    /// Validate the options without touching the network
    pub fn credential_source(&self) -> Result<CredentialSource> {
        if self.region.trim().is_empty() {
            return Err(Error::Config(
                "you have not specified the aws region the resources reside".into(),
            ));
        }
        if let Some(endpoint) = present(&self.endpoint) {
            url::Url::parse(endpoint)?;
        }

        match (present(&self.access_key), present(&self.secret_key)) {
            (Some(_), Some(_)) => Ok(CredentialSource::Static),
            (Some(_), None) => Err(Error::Config(
                "you have specified an access key without a secret key".into(),
            )),
            (None, Some(_)) => Err(Error::Config(
                "you have specified a secret key without an access key".into(),
            )),
            (None, None) => Ok(match present(&self.profile) {
                Some(profile) => CredentialSource::Profile(profile.to_string()),
                None => CredentialSource::DefaultChain,
            }),
        }
    }
}

/// Build the shared SDK configuration
pub async fn load_config(options: &SessionOptions) -> Result<SdkConfig> {
    let source = options.credential_source()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(options.region.trim().to_string()));

    match source {
        CredentialSource::Static => {
            let credentials = aws_credential_types::Credentials::new(
                present(&options.access_key).unwrap_or_default(),
                present(&options.secret_key).unwrap_or_default(),
                present(&options.session_token).map(str::to_string),
                None,
                "kmsctl-static-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }
        CredentialSource::Profile(profile) => {
            tracing::debug!(profile = %profile, "using named credentials profile");
            loader = loader.profile_name(profile);
            if let Some(file) = &options.credentials_file {
                let files = ProfileFiles::builder()
                    .include_default_config_file(true)
                    .with_file(ProfileFileKind::Credentials, file)
                    .build();
                loader = loader.profile_files(files);
            }
        }
        CredentialSource::DefaultChain => {}
    }

    if let Some(endpoint) = present(&options.endpoint) {
        loader = loader.endpoint_url(endpoint);
    }

    Ok(loader.load().await)
}
