//! CLI command definitions and execution
//!
//! Global options configure the AWS session and the output format; each
//! subcommand lives in its own module and receives a resolved `Context`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use kmsctl_aws::{Clients, SessionOptions};
use kmsctl_core::{Config, ConfigManager, Error, Result};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, OutputFormat};

mod buckets;
mod cat;
mod completions;
mod edit;
mod get;
mod kms;
mod list;
mod put;

/// kmsctl - manage KMS encrypted secrets in S3
///
/// Lists, retrieves, uploads and edits files held in an S3 bucket with
/// server-side KMS encryption, and manages the KMS keys and buckets.
#[derive(Parser, Debug)]
#[command(name = "kmsctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options given before the subcommand
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// The AWS profile to use for static credentials
    #[arg(short = 'p', long, env = "AWS_DEFAULT_PROFILE")]
    pub profile: Option<String>,

    /// The path to the credentials file containing the AWS profiles
    #[arg(short = 'c', long, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// The AWS access key to use to access the resources
    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    pub access_key: Option<String>,

    /// The AWS secret key to use when accessing the resources
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// The AWS session token to use when accessing the resources
    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    pub session_token: Option<String>,

    /// The AWS region where the resources are located
    #[arg(short = 'r', long, env = "AWS_DEFAULT_REGION")]
    pub region: Option<String>,

    /// Custom endpoint for S3 and KMS compatible services
    #[arg(long, env = "KMSCTL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// The format of the output to generate
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the KMS keys and their aliases
    Kms(kms::KmsArgs),

    /// Manage the S3 buckets
    Buckets(buckets::BucketsArgs),

    /// List the files in a bucket
    #[command(visible_alias = "ls")]
    List(list::ListArgs),

    /// Retrieve files from a bucket into a local directory
    Get(get::GetArgs),

    /// Print the content of one or more files to stdout
    Cat(cat::CatArgs),

    /// Upload files into a bucket, encrypted with a KMS key
    Put(put::PutArgs),

    /// Edit a file held in a bucket with a local editor
    Edit(edit::EditArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Settings resolved from flags, environment and the config file
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded config file
    pub config: Config,
    /// AWS session inputs
    pub session: SessionOptions,
    /// Record formatter
    pub formatter: Formatter,
}

impl Context {
    /// Load the config file and merge it under the global flags
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = ConfigManager::new()?.load()?;
        Self::resolve(global, config)
    }

    /// Merge flags over config values
    pub fn resolve(global: &GlobalArgs, config: Config) -> Result<Self> {
        let format = match (global.format, config.defaults.format.as_deref()) {
            (Some(format), _) => format,
            (None, Some(name)) => name.parse().map_err(Error::Config)?,
            (None, None) => OutputFormat::default(),
        };

        let session = SessionOptions {
            region: global
                .region
                .clone()
                .unwrap_or_else(|| config.region().to_string()),
            access_key: global.access_key.clone(),
            secret_key: global.secret_key.clone(),
            session_token: global.session_token.clone(),
            profile: global
                .profile
                .clone()
                .or_else(|| config.defaults.profile.clone()),
            credentials_file: global
                .credentials
                .clone()
                .or_else(|| config.defaults.credentials.as_ref().map(PathBuf::from)),
            endpoint: global
                .endpoint
                .clone()
                .or_else(|| config.defaults.endpoint.clone()),
        };

        Ok(Self {
            config,
            session,
            formatter: Formatter::new(OutputConfig {
                format,
                no_color: global.no_color,
            }),
        })
    }

    /// Bucket from the flag, else the config file
    pub fn bucket(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.config.defaults.bucket.clone())
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| Error::Config("you have not specified the bucket to use".into()))
    }

    /// Download directory from the flag, else the config file, else `./secrets`
    pub fn output_dir(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from(self.config.output_dir()),
        }
    }

    /// Editor command from the flag, else the config file
    pub fn editor(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::to_string)
            .or_else(|| self.config.defaults.editor.clone())
    }

    /// Build the S3 and KMS clients
    pub async fn connect(&self) -> Result<Clients> {
        Clients::connect(&self.session).await
    }
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let Cli { global, command } = cli;

    match run(command, &global).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let formatter = Formatter::new(OutputConfig {
                format: OutputFormat::Text,
                no_color: global.no_color,
            });
            formatter.error(&e.to_string());
            ExitCode::from(&e)
        }
    }
}

async fn run(command: Commands, global: &GlobalArgs) -> Result<()> {
    match command {
        Commands::Completions(args) => completions::execute(args),
        Commands::Kms(args) => kms::execute(args, &Context::load(global)?).await,
        Commands::Buckets(args) => buckets::execute(args, &Context::load(global)?).await,
        Commands::List(args) => list::execute(args, &Context::load(global)?).await,
        Commands::Get(args) => get::execute(args, &Context::load(global)?).await,
        Commands::Cat(args) => cat::execute(args, &Context::load(global)?).await,
        Commands::Put(args) => put::execute(args, &Context::load(global)?).await,
        Commands::Edit(args) => edit::execute(args, &Context::load(global)?).await,
    }
}
