//! put command - Upload files into a bucket
//!
//! Each file is stored with server-side KMS encryption under the given key.

use std::path::PathBuf;

use clap::Args;
use kmsctl_core::{Result, Transfer, UploadRequest, Uploaded};
use serde::Serialize;

use super::Context;

/// Upload files into a bucket
#[derive(Args, Debug)]
pub struct PutArgs {
    /// The name of the bucket to upload into
    #[arg(short, long, env = "AWS_SECRETS_BUCKET")]
    pub bucket: Option<String>,

    /// The KMS key id, ARN or alias used to encrypt the files
    #[arg(short, long, env = "AWS_KMS_ID")]
    pub kms: String,

    /// Use only the file name as the key, dropping the directory structure
    #[arg(long)]
    pub flatten: bool,

    /// Files or directories to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Serialize)]
struct PutRecord<'a> {
    action: &'static str,
    path: String,
    bucket: &'a str,
    key: &'a str,
}

fn put_line(file: &Uploaded) -> String {
    format!(
        "successfully pushed the file: {} to s3://{}/{}",
        file.path.display(),
        file.bucket,
        file.key
    )
}

/// Execute the put command
pub async fn execute(args: PutArgs, ctx: &Context) -> Result<()> {
    let request = UploadRequest {
        bucket: ctx.bucket(args.bucket.as_deref())?,
        paths: args.paths,
        kms_key_id: args.kms,
        flatten: args.flatten,
    };

    let clients = ctx.connect().await?;
    let out = &ctx.formatter;
    Transfer::new(&clients.s3)
        .push_files(&request, |file: &Uploaded| {
            let record = PutRecord {
                action: "put",
                path: file.path.display().to_string(),
                bucket: &file.bucket,
                key: &file.key,
            };
            out.emit(&record, &put_line(file));
        })
        .await?;

    Ok(())
}
