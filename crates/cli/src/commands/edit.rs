//! edit command - Edit files in place
//!
//! Opens each object in a local editor and uploads the result when it changed.

use clap::Args;
use kmsctl_core::{EditOutcome, Edited, Editor, Result, edit_remote_file};
use serde::Serialize;

use super::Context;

/// Edit files held in a bucket
#[derive(Args, Debug)]
pub struct EditArgs {
    /// The name of the bucket containing the encrypted files
    #[arg(short, long, env = "AWS_SECRETS_BUCKET")]
    pub bucket: Option<String>,

    /// Re-encrypt with this KMS key instead of the one already in use
    #[arg(short, long)]
    pub kms: Option<String>,

    /// Editor command, defaults to $EDITOR or vim
    #[arg(long)]
    pub editor: Option<String>,

    /// Keys of the files to edit
    #[arg(required = true)]
    pub keys: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EditRecord<'a> {
    action: &'static str,
    bucket: &'a str,
    key: &'a str,
    outcome: EditOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    kms: Option<&'a str>,
}

fn edit_line(bucket: &str, edited: &Edited) -> String {
    let key = &edited.key;
    match edited.outcome {
        EditOutcome::Updated => format!("successfully updated the file: s3://{bucket}/{key}"),
        EditOutcome::Unchanged => format!("no changes made to the file: s3://{bucket}/{key}"),
    }
}

/// Execute the edit command
pub async fn execute(args: EditArgs, ctx: &Context) -> Result<()> {
    let bucket = ctx.bucket(args.bucket.as_deref())?;
    let editor = Editor::resolve(ctx.editor(args.editor.as_deref()).as_deref())?;
    let clients = ctx.connect().await?;

    for key in &args.keys {
        let edited =
            edit_remote_file(&clients.s3, &bucket, key, &editor, args.kms.as_deref()).await?;
        let record = EditRecord {
            action: "edit",
            bucket: &bucket,
            key: &edited.key,
            outcome: edited.outcome,
            kms: edited.kms_key_id.as_deref(),
        };
        ctx.formatter.emit(&record, &edit_line(&bucket, &edited));
    }

    Ok(())
}
