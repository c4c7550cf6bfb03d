//! Handler for the `run` command.

use tracing::error;

use super::command::RunArgs;
use super::{load_config, output};
use crate::application::runtime::{self, RunOptions};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_log_overrides(&mut config, args);
    config.init_logging();

    if !output::is_quiet() {
        print_startup(&config, args.publish_sample);
    }

    let options = RunOptions {
        publish_sample: args.publish_sample,
    };
    let result = runtime::run(config, options).await;
    if let Err(e) = &result {
        error!(error = %e, "Fatal error");
    }
    result
}

fn apply_log_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }
}

fn print_startup(config: &Config, publish_sample: bool) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("App key", &config.app_key);
    output::field("Database", &config.database.url);
    output::field("Stream", &config.stream.url);
    output::field("Cluster", &config.stream.cluster_id);
    output::field("Subject", &config.stream.subject);
    output::field("Durable", &config.stream.durable_name);
    output::field("Cache", config.cache.capacity);
    output::field("Listen", &config.http.bind);
    if publish_sample {
        output::field("Sample", "publishing on startup");
    }
}
