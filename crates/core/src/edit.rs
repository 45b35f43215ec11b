//! Inline editing of remote objects
//!
//! The object is copied into a temporary file, the user's editor is run on it
//! and, if the content changed, the result is uploaded back under SSE-KMS.
//! The temporary file is removed when the guard drops, whatever the outcome.

use std::io::Write;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::{ObjectStore, PutObject};

/// Editor used when nothing else is configured
pub const DEFAULT_EDITOR: &str = "vim";

/// An external editor command, e.g. `vim` or `code --wait`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Parse an editor command line, split on whitespace
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| Error::Editor("the editor command is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Pick the editor: explicit setting, then `$EDITOR`, then vim
    ///
    /// Blank values are treated as unset.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        Self::pick(explicit, std::env::var("EDITOR").ok().as_deref())
    }

    fn pick(explicit: Option<&str>, from_env: Option<&str>) -> Result<Self> {
        let command = [explicit, from_env]
            .into_iter()
            .flatten()
            .find(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_EDITOR);
        Self::new(command)
    }

    async fn run(&self, path: &std::path::Path) -> Result<()> {
        debug!(editor = %self.program, path = %path.display(), "launching editor");
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .status()
            .await
            .map_err(|e| Error::Editor(format!("unable to run {}: {e}", self.program)))?;

        if !status.success() {
            return Err(Error::Editor(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

/// Whether an edit produced new content
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOutcome {
    /// The edited content was uploaded
    Updated,
    /// The content was left as it was, nothing uploaded
    Unchanged,
}

/// Result of editing one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edited {
    /// Object key
    pub key: String,
    /// What happened to it
    pub outcome: EditOutcome,
    /// KMS key the new content was encrypted with
    pub kms_key_id: Option<String>,
}

/// Edit a single object in place
///
/// The content is re-uploaded with `kms_key_id` when given, otherwise with the
/// key the object was already encrypted under.
pub async fn edit_remote_file(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    editor: &Editor,
    kms_key_id: Option<&str>,
) -> Result<Edited> {
    let original = store
        .get_object(bucket, key)
        .await
        .map_err(|e| e.context(|| format!("unable to retrieve the file: {key}")))?;

    let base_name = key.rsplit('/').next().unwrap_or(key);
    let mut temp = tempfile::Builder::new()
        .prefix(&format!("{base_name}."))
        .tempfile()?;
    temp.write_all(&original.data)?;
    temp.flush()?;

    editor.run(temp.path()).await?;
    let edited = std::fs::read(temp.path())?;
    drop(temp);

    if edited == original.data {
        debug!(bucket, key, "content unchanged, skipping upload");
        return Ok(Edited {
            key: key.to_string(),
            outcome: EditOutcome::Unchanged,
            kms_key_id: original.kms_key_id,
        });
    }

    let kms_key_id = kms_key_id.map(str::to_string).or(original.kms_key_id);
    let content_type = mime_guess::from_path(key)
        .first()
        .map(|m| m.essence_str().to_string());

    store
        .put_object(PutObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            data: edited,
            content_type,
            kms_key_id: kms_key_id.clone(),
        })
        .await?;
    info!(bucket, key, "uploaded edited file");

    Ok(Edited {
        key: key.to_string(),
        outcome: EditOutcome::Updated,
        kms_key_id,
    })
}
