//! kms command - Manage KMS keys and aliases
//!
//! Without a subcommand the keys are listed.

use clap::{ArgAction, Args, Subcommand};
use kmsctl_core::{KeyAlias, KeyManager, KeyMetadata, Result};
use serde::Serialize;

use super::Context;

/// Manage the KMS keys
#[derive(Args, Debug)]
pub struct KmsArgs {
    #[command(subcommand)]
    pub action: Option<KmsAction>,
}

#[derive(Subcommand, Debug)]
pub enum KmsAction {
    /// List the KMS keys which have an alias
    #[command(visible_alias = "ls")]
    List,

    /// Create a new KMS key and alias
    Create(CreateArgs),

    /// Delete a KMS alias and schedule its key for deletion
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// The alias name for the new key
    #[arg(short, long)]
    pub name: String,

    /// A description for the key
    #[arg(short, long)]
    pub description: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// The alias name of the key to delete
    #[arg(short, long)]
    pub name: String,

    /// Schedule the key itself for deletion, not just the alias
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub schedule_deletion: bool,
}

#[derive(Debug, Serialize)]
struct KeyRecord<'a> {
    id: &'a str,
    alias: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatedRecord<'a> {
    alias: &'a str,
    arn: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    account: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeletedRecord<'a> {
    alias: &'a str,
    #[serde(rename = "keyId")]
    key_id: &'a str,
    deletion: bool,
}

fn key_line(alias: &KeyAlias) -> String {
    format!(
        "{:<40} {}",
        alias.target_key_id.as_deref().unwrap_or_default(),
        alias.alias_name
    )
}

/// Execute the kms command
pub async fn execute(args: KmsArgs, ctx: &Context) -> Result<()> {
    let clients = ctx.connect().await?;
    let keys = KeyManager::new(&clients.kms);
    let out = &ctx.formatter;

    match args.action.unwrap_or(KmsAction::List) {
        KmsAction::List => {
            for alias in keys.list_keys().await? {
                let record = KeyRecord {
                    id: alias.target_key_id.as_deref().unwrap_or_default(),
                    alias: &alias.alias_name,
                };
                out.emit(&record, &key_line(&alias));
            }
        }
        KmsAction::Create(create) => {
            let KeyMetadata {
                arn, account_id, ..
            } = keys.create_key(&create.name, &create.description).await?;
            let record = CreatedRecord {
                alias: &create.name,
                arn: &arn,
                account: account_id.as_deref(),
            };
            out.emit(
                &record,
                &format!("successfully created the key: {}", create.name),
            );
        }
        KmsAction::Delete(delete) => {
            let alias = keys.delete_key(&delete.name, delete.schedule_deletion).await?;
            let record = DeletedRecord {
                alias: &alias.alias_name,
                key_id: alias.target_key_id.as_deref().unwrap_or_default(),
                deletion: delete.schedule_deletion,
            };
            out.emit(
                &record,
                &format!("successfully deleted the kms key: {}", delete.name),
            );
        }
    }

    Ok(())
}
