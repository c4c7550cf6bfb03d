//! Handler for the `publish-sample` command.

use super::command::SampleArgs;
use super::{load_config, output};
use crate::adapter::outbound::broker::JetStreamBroker;
use crate::application::publisher::{publish_sample, sample_order};
use crate::error::Result;

/// Publish the demonstration order to the configured stream, or print it
/// with `--dry-run`.
pub async fn execute(args: &SampleArgs) -> Result<()> {
    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&sample_order())?);
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let broker = JetStreamBroker::connect(&config.stream).await?;
    let sequence = publish_sample(&broker, &config.stream.subject).await?;

    output::field("Server", &config.stream.url);
    output::field("Subject", &config.stream.subject);
    output::success(&format!("Sample order published at sequence {sequence}"));
    Ok(())
}
