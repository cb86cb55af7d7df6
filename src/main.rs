use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use workflow_dispatch::{DispatchConfig, Dispatcher};

/// Trigger the image build workflow for one OCI image
#[derive(Parser)]
#[command(name = "wf-dispatch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the image to build
    #[arg(long)]
    image_name: String,

    /// Base64-encoded image trigger, passed to the workflow untouched
    #[arg(long, env = "IMAGE_TRIGGER")]
    trigger: String,

    /// GitHub token allowed to dispatch the workflow
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Workflow dispatch URL (default: canonical/oci-factory Image.yaml)
    #[arg(long)]
    endpoint: Option<String>,

    /// Value for the X-GitHub-Api-Version header
    #[arg(long)]
    api_version: Option<String>,

    /// Give up on the request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Log request progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::default()
            .with_timeout(self.timeout_secs.map(Duration::from_secs));
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(api_version) = &self.api_version {
            config = config.with_api_version(api_version);
        }
        config
    }
}

/// Failures reach the user through the returned error alone, so quiet runs
/// only let `error` events through.
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "error" }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let dispatcher = Dispatcher::new(cli.config());
    let payload = dispatcher.build_payload(cli.image_name.as_str(), cli.trigger.as_str());
    let external_ref_id = payload.external_ref_id().to_string();

    dispatcher
        .dispatch_blocking(payload, &cli.token)
        .with_context(|| format!("workflow dispatch {external_ref_id} failed"))?;

    Ok(())
}
