//! cat command - Display object contents
//!
//! Writes the decrypted content of each object to stdout, in order.

use std::io::{self, Write};

use clap::Args;
use kmsctl_core::{Result, Transfer};

use super::Context;

/// Display the content of one or more files
#[derive(Args, Debug)]
pub struct CatArgs {
    /// The name of the bucket containing the encrypted files
    #[arg(short, long, env = "AWS_SECRETS_BUCKET")]
    pub bucket: Option<String>,

    /// Keys of the files to print
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, ctx: &Context) -> Result<()> {
    let bucket = ctx.bucket(args.bucket.as_deref())?;
    let clients = ctx.connect().await?;

    // Raw bytes bypass the formatter
    let mut stdout = io::stdout();
    Transfer::new(&clients.s3)
        .read_objects(&bucket, &args.keys, &mut stdout as &mut dyn Write)
        .await
}

#[cfg(test)]
mod tests {
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_cat_requires_key() {
        assert!(Cli::try_parse_from(["kmsctl", "cat", "-b", "secrets"]).is_err());

        let cli = Cli::try_parse_from(["kmsctl", "cat", "-b", "secrets", "a.yaml", "b.yaml"])
            .unwrap();
        let Commands::Cat(args) = cli.command else {
            panic!("expected cat");
        };
        assert_eq!(args.keys, vec!["a.yaml".to_string(), "b.yaml".to_string()]);
    }
}
