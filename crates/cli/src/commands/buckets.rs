//! buckets command - List, create and delete buckets

use clap::{Args, Subcommand};
use jiff::Timestamp;
use kmsctl_core::{Bucket, BucketManager, Result};
use serde::Serialize;

use super::Context;
use crate::output::{rfc822, rfc822z};

/// Manage the buckets
#[derive(Args, Debug)]
pub struct BucketsArgs {
    #[command(subcommand)]
    pub action: Option<BucketsAction>,
}

#[derive(Subcommand, Debug)]
pub enum BucketsAction {
    /// List the buckets in the account
    #[command(visible_alias = "ls")]
    List,

    /// Create a bucket
    Create(CreateArgs),

    /// Delete a bucket
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The name of the bucket to create
    #[arg(short, long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// The name of the bucket to delete
    #[arg(short, long)]
    pub name: String,

    /// Delete the bucket regardless of whether it is empty
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct BucketRecord<'a> {
    bucket: &'a str,
    created: String,
}

#[derive(Debug, Serialize)]
struct OperationRecord<'a> {
    operation: &'static str,
    bucket: &'a str,
    created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    objects_removed: Option<usize>,
}

fn bucket_line(bucket: &Bucket) -> String {
    let created = bucket.created.as_ref().map(rfc822).unwrap_or_default();
    format!("{:<42} {:>20}", bucket.name, created)
}

/// Execute the buckets command
pub async fn execute(args: BucketsArgs, ctx: &Context) -> Result<()> {
    let clients = ctx.connect().await?;
    let buckets = BucketManager::new(&clients.s3);
    let out = &ctx.formatter;

    match args.action.unwrap_or(BucketsAction::List) {
        BucketsAction::List => {
            for bucket in buckets.list().await? {
                let record = BucketRecord {
                    bucket: &bucket.name,
                    created: bucket.created.as_ref().map(rfc822z).unwrap_or_default(),
                };
                out.emit(&record, &bucket_line(&bucket));
            }
        }
        BucketsAction::Create(create) => {
            buckets.create(&create.name).await?;
            let record = OperationRecord {
                operation: "created",
                bucket: &create.name,
                created: rfc822z(&Timestamp::now()),
                objects_removed: None,
            };
            out.emit(
                &record,
                &format!("successfully created the bucket: {}", create.name),
            );
        }
        BucketsAction::Delete(delete) => {
            let deleted = buckets.delete(&delete.name, delete.force).await?;
            let record = OperationRecord {
                operation: "delete",
                bucket: &deleted.name,
                created: rfc822z(&Timestamp::now()),
                objects_removed: Some(deleted.objects_removed),
            };
            out.emit(
                &record,
                &format!("successfully deleted the bucket: {}", deleted.name),
            );
        }
    }

    Ok(())
}
