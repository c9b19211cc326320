use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser};
use fleet_framework_config::{
    constants::{self, DEFAULT_CHANNEL_COUNT, DEFAULT_NODE_COUNT},
    fleet::{FleetConfig, load_fleet_config},
};
use fleet_framework_core::{FleetBuilder, LncliIssuer};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(about = "Generate a signet + lnd test fleet for warnet")]
struct Args {
    /// Network name; output lands in `<output-root>/<network>/`.
    #[arg(long)]
    network: Option<String>,
    /// Number of ordinary nodes, not counting the minter.
    #[arg(long, default_value_t = DEFAULT_NODE_COUNT)]
    nodes: usize,
    /// Channel requests; `n` requests make `n - 1` random attempts.
    #[arg(long, default_value_t = DEFAULT_CHANNEL_COUNT)]
    channels: usize,
    /// Root directory for generated networks.
    #[arg(long)]
    output_root: Option<PathBuf>,
    /// Optional YAML file overriding image tags, channel sizes or the signer.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Raise log verbosity (`-v` debug, `-vv` trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_fleet_config(path)
            .with_context(|| format!("failed to load fleet config from {}", path.display()))?,
        None => FleetConfig::default(),
    };
    let network = cli.network.unwrap_or_else(constants::network_name);
    let output_root = cli.output_root.unwrap_or_else(constants::networks_dir);

    info!(
        network = %network,
        nodes = cli.nodes,
        channels = cli.channels,
        signer = %config.signer.program,
        "generating fleet"
    );

    let issuer = LncliIssuer::from_config(&config.signer);
    let mut builder =
        FleetBuilder::new(network, config, issuer).context("invalid fleet configuration")?;

    builder
        .derive_genesis()
        .context("failed to derive signet challenge")?;
    builder
        .add_nodes(cli.nodes)
        .await
        .context("failed to create fleet nodes")?;
    builder
        .add_channels(cli.channels)
        .context("failed to wire channels")?;
    builder
        .add_minter()
        .await
        .context("failed to attach minter")?;
    let artifacts = builder
        .write(&output_root)
        .context("failed to write fleet assets")?;

    info!(
        path = %artifacts.network_file.display(),
        channels = builder.channel_count(),
        "fleet ready"
    );
    Ok(())
}
