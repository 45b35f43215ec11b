//! get command - Retrieve files from a bucket
//!
//! Downloads every object matching the paths and filter into a local
//! directory, keeping or flattening the key structure.

use std::path::PathBuf;

use clap::Args;
use kmsctl_core::listing::MATCH_ALL;
use kmsctl_core::{DownloadRequest, Downloaded, Result, Transfer, compile_filter};
use serde::Serialize;

use super::Context;

/// Retrieve files from a bucket
#[derive(Args, Debug)]
pub struct GetArgs {
    /// The name of the bucket containing the encrypted files
    #[arg(short, long, env = "AWS_SECRETS_BUCKET")]
    pub bucket: Option<String>,

    /// The directory in which to save the files
    #[arg(short = 'd', long, env = "KMSCTL_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// The file permissions on any newly created files (octal)
    #[arg(short, long, default_value = "0744", value_parser = parse_mode)]
    pub perms: u32,

    /// Traverse all the sub-directories below each path
    #[arg(short, long)]
    pub recursive: bool,

    /// Do not keep the directory structure, write every file into one directory
    #[arg(long)]
    pub flatten: bool,

    /// Only retrieve the files whose key matches this regex
    #[arg(short, long, default_value = MATCH_ALL)]
    pub filter: String,

    /// Paths within the bucket, defaults to the root
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GetRecord<'a> {
    action: &'static str,
    source: &'a str,
    destination: String,
    size: usize,
}

/// Parse an octal file mode such as `0744` or `0o600`
fn parse_mode(value: &str) -> std::result::Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    match u32::from_str_radix(digits, 8) {
        Ok(mode) if mode <= 0o7777 => Ok(mode),
        Ok(_) => Err(format!("file mode out of range: {value}")),
        Err(e) => Err(format!("invalid octal file mode {value}: {e}")),
    }
}

/// Execute the get command
pub async fn execute(args: GetArgs, ctx: &Context) -> Result<()> {
    let filter = compile_filter(&args.filter)?;
    let bucket = ctx.bucket(args.bucket.as_deref())?;

    let request = DownloadRequest {
        bucket,
        paths: args.paths,
        recursive: args.recursive,
        flatten: args.flatten,
        filter,
        output_dir: ctx.output_dir(args.output_dir.as_deref()),
        file_mode: Some(args.perms),
    };

    let clients = ctx.connect().await?;
    let out = &ctx.formatter;
    Transfer::new(&clients.s3)
        .materialize_objects(&request, |file: &Downloaded| {
            let destination = file.destination.display().to_string();
            let line = format!(
                "retrieved the file: {} and wrote to: {destination}",
                file.source
            );
            let record = GetRecord {
                action: "get",
                source: &file.source,
                destination,
                size: file.size,
            };
            out.emit(&record, &line);
        })
        .await?;

    Ok(())
}
