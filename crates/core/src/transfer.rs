//! Download and upload of encrypted objects
//!
//! Downloads mirror (or flatten) object keys into a local directory. Uploads
//! expand local paths into regular files and push each one with SSE-KMS.
//! Neither direction is transactional: the first failure stops the run and
//! whatever was already written stays written.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::buckets::BucketManager;
use crate::error::{Error, Result};
use crate::listing::{Traversal, resolve_paths};
use crate::traits::{ObjectStore, PutObject};

/// Default permissions for downloaded files
pub const DEFAULT_FILE_MODE: u32 = 0o744;

/// Options for downloading objects into a local directory
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Source bucket
    pub bucket: String,
    /// Prefixes to process (empty means the bucket root)
    pub paths: Vec<String>,
    /// Descend into sub-levels below each prefix
    pub recursive: bool,
    /// Write every file directly under the output directory
    pub flatten: bool,
    /// Compiled key filter
    pub filter: Regex,
    /// Local directory receiving the files
    pub output_dir: PathBuf,
    /// Unix permissions applied to written files
    pub file_mode: Option<u32>,
}

/// A file written by a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downloaded {
    /// Object key
    pub source: String,
    /// Local path written
    pub destination: PathBuf,
    /// Number of bytes written
    pub size: usize,
}

/// Options for uploading local files
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Target bucket, which must already exist
    pub bucket: String,
    /// Files or directories to upload
    pub paths: Vec<PathBuf>,
    /// KMS key used for server-side encryption
    pub kms_key_id: String,
    /// Use only the file name as the object key
    pub flatten: bool,
}

/// A file pushed by an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uploaded {
    /// Local file read
    pub path: PathBuf,
    /// Target bucket
    pub bucket: String,
    /// Object key written
    pub key: String,
}

/// Orchestrates transfers between a bucket and the local filesystem
pub struct Transfer<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> Transfer<'a> {
    /// Create a Transfer over an object storage backend
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Download every object matched by the request
    ///
    /// `report` is called once per file after it has been written.
    pub async fn materialize_objects(
        &self,
        request: &DownloadRequest,
        mut report: impl FnMut(&Downloaded),
    ) -> Result<usize> {
        std::fs::create_dir_all(&request.output_dir)?;

        let traversal = Traversal {
            recursive: request.recursive,
            pattern: request.filter.clone(),
        };

        let mut written = 0;
        for prefix in resolve_paths(&request.paths) {
            let entries = traversal
                .collect(self.store, &request.bucket, &prefix)
                .await?;

            for entry in entries {
                let Some(destination) =
                    destination_path(&request.output_dir, &entry.key, request.flatten)
                else {
                    warn!(key = %entry.key, "skipping object, key is not a plain relative path");
                    continue;
                };

                let content = self.store.get_object(&request.bucket, &entry.key).await?;
                write_file(&destination, &content.data, request.file_mode)?;

                written += 1;
                report(&Downloaded {
                    source: entry.key,
                    destination,
                    size: content.data.len(),
                });
            }
        }

        Ok(written)
    }

    /// Upload every file under the requested paths
    ///
    /// `report` is called once per file after the object has been stored.
    pub async fn push_files(
        &self,
        request: &UploadRequest,
        mut report: impl FnMut(&Uploaded),
    ) -> Result<usize> {
        if !BucketManager::new(self.store).exists(&request.bucket).await? {
            return Err(Error::BucketNotFound(request.bucket.clone()));
        }
        if request.paths.is_empty() {
            return Err(Error::NoInput);
        }

        let mut pushed = 0;
        for path in &request.paths {
            let files = expand_files(path).map_err(|e| match e {
                Error::Io(io) => Error::Io(std::io::Error::new(
                    io.kind(),
                    format!("failed to process path: {}, error: {io}", path.display()),
                )),
                other => other,
            })?;

            for file in files {
                let key = remote_key(&file, request.flatten);
                let data = std::fs::read(&file)?;
                let content_type = mime_guess::from_path(&file)
                    .first()
                    .map(|m| m.essence_str().to_string());

                debug!(path = %file.display(), key, "uploading file");
                self.store
                    .put_object(PutObject {
                        bucket: request.bucket.clone(),
                        key: key.clone(),
                        data,
                        content_type,
                        kms_key_id: Some(request.kms_key_id.clone()),
                    })
                    .await
                    .map_err(|e| e.context(|| format!("failed to put the file: {}", file.display())))?;

                pushed += 1;
                report(&Uploaded {
                    path: file,
                    bucket: request.bucket.clone(),
                    key,
                });
            }
        }

        Ok(pushed)
    }

    /// Write the raw content of each object to `out`, in order
    pub async fn read_objects(
        &self,
        bucket: &str,
        keys: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        for key in keys {
            let content = self.store.get_object(bucket, key).await?;
            out.write_all(&content.data)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Compute where an object lands under the output directory
///
/// Returns `None` when the key cannot be written as is: an empty, `.` or `..`
/// segment would either leave `output_dir` or alias another key's file.
/// With `flatten` only the final segment has to be a plain name.
pub fn destination_path(output_dir: &Path, key: &str, flatten: bool) -> Option<PathBuf> {
    let plain = |segment: &str| !segment.is_empty() && segment != "." && segment != "..";

    if flatten && key.contains('/') {
        let name = key.rsplit('/').next().filter(|s| plain(s))?;
        return Some(output_dir.join(name));
    }

    let mut path = output_dir.to_path_buf();
    for segment in key.split('/') {
        if !plain(segment) {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

/// Compute the object key for a local file
///
/// The path is kept as given minus root, `.` and `..` components; with
/// `flatten` only the file name is used.
pub fn remote_key(path: &Path, flatten: bool) -> String {
    if flatten {
        if let Some(name) = path.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }

    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Expand a local path into the regular files beneath it
///
/// A path argument that is a symlink is followed. While walking a directory,
/// symlinks and special files are skipped.
pub fn expand_files(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(path)?;
    if metadata.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !metadata.is_dir() {
        warn!(path = %path.display(), "skipping special file");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let file_type = entry.file_type();

        if file_type.is_file() {
            files.push(entry.into_path());
        } else if file_type.is_symlink() {
            warn!(path = %entry.path().display(), "skipping symbolic link");
        } else if !file_type.is_dir() {
            warn!(path = %entry.path().display(), "skipping special file");
        }
    }

    Ok(files)
}

fn write_file(destination: &Path, data: &[u8], mode: Option<u32>) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(destination, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            std::fs::set_permissions(destination, std::fs::Permissions::from_mode(mode))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
