//! list command - List the files in a bucket

use clap::{ArgAction, Args};
use kmsctl_core::listing::{MATCH_ALL, resolve_paths};
use kmsctl_core::{ObjectEntry, Result, Traversal};
use serde::Serialize;

use super::Context;
use crate::output::{rfc822, rfc822z};

/// List the files in a bucket
#[derive(Args, Debug)]
pub struct ListArgs {
    /// The name of the bucket containing the encrypted files
    #[arg(short, long, env = "AWS_SECRETS_BUCKET")]
    pub bucket: Option<String>,

    /// Provide a detailed listing of the files
    #[arg(short, long)]
    pub long: bool,

    /// Descend into the sub-directories below each path
    #[arg(
        short,
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub recursive: bool,

    /// Paths within the bucket, defaults to the root
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct KeyRecord<'a> {
    key: &'a str,
}

#[derive(Debug, Serialize)]
struct DetailedRecord<'a> {
    key: &'a str,
    size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
    #[serde(rename = "last-modified", skip_serializing_if = "Option::is_none")]
    last_modified: Option<String>,
}

fn long_line(entry: &ObjectEntry) -> String {
    let modified = entry.last_modified.as_ref().map(rfc822).unwrap_or_default();
    format!(
        "{} {:<10} {:<20} {}",
        entry.owner.as_deref().unwrap_or("-"),
        entry.size_human,
        modified,
        entry.key
    )
}

/// Execute the list command
pub async fn execute(args: ListArgs, ctx: &Context) -> Result<()> {
    let bucket = ctx.bucket(args.bucket.as_deref())?;
    let traversal = Traversal::new(args.recursive, MATCH_ALL)?;
    let clients = ctx.connect().await?;
    let out = &ctx.formatter;

    for prefix in resolve_paths(&args.paths) {
        for entry in traversal.collect(&clients.s3, &bucket, &prefix).await? {
            if args.long {
                let record = DetailedRecord {
                    key: &entry.key,
                    size: entry.size,
                    class: entry.storage_class.as_deref(),
                    owner: entry.owner.as_deref(),
                    etag: entry.etag.as_deref(),
                    last_modified: entry.last_modified.as_ref().map(rfc822z),
                };
                out.emit(&record, &long_line(&entry));
            } else {
                out.emit(&KeyRecord { key: &entry.key }, &entry.key);
            }
        }
    }

    Ok(())
}
