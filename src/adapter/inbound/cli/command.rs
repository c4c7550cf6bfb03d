//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Durable order ingestion with a restart-safe lookup cache
#[derive(Parser, Debug)]
#[command(name = "ordercache")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the consumer and the read endpoint (foreground)
    Run(RunArgs),

    /// Validate the configuration and print a summary
    CheckConfig(ConfigArg),

    /// Delete the persisted cache index for the configured app key
    ClearCacheIndex(ConfigArg),

    /// Publish the demonstration order to the configured stream
    PublishSample(SampleArgs),
}

/// Arguments for `ordercache run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Publish the demonstration order once the consumer is running.
    #[arg(long)]
    pub publish_sample: bool,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty-printed logs.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `ordercache publish-sample`.
#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the order as JSON instead of publishing it.
    #[arg(long)]
    pub dry_run: bool,
}

/// A lone `--config` argument.
#[derive(Args, Debug)]
pub struct ConfigArg {
    /// Path to the configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
