//! Command-line interface.

pub mod check;
pub mod command;
pub mod index;
pub mod output;
pub mod run;
pub mod sample;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::infrastructure::config::settings::Config;

pub use command::{Cli, Commands};

/// Config file read when `-c` is not given.
pub const DEFAULT_CONFIG: &str = "config.toml";

/// Dispatch a parsed command line.
///
/// # Errors
/// Returns whatever the selected command fails with.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));
    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::CheckConfig(args) => check::execute(args.config.as_deref()),
        Commands::ClearCacheIndex(args) => index::execute_clear(args.config.as_deref()).await,
        Commands::PublishSample(args) => sample::execute(&args).await,
    }
}

/// Load the configuration named on the command line.
///
/// Without an explicit path, `config.toml` is used when present and the
/// built-in defaults (plus environment overrides) otherwise.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match resolve_config_path(path) {
        Some(path) => Config::load(path),
        None => Config::parse_toml(""),
    }
}

fn resolve_config_path(path: Option<&Path>) -> Option<PathBuf> {
    match path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG);
            default.exists().then_some(default)
        }
    }
}
