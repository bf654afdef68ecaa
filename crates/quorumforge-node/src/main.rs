//! QuorumForge Node - quorum configuration loader

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quorumforge_common::VERSION;
use quorumforge_trustledger::{NodeConfig, QuorumConfigurator};

#[derive(Parser)]
#[command(name = "quorumforge-node")]
#[command(about = "Build and validate the quorum set of a federated consensus node", long_about = None)]
#[command(version)]
struct Cli {
    /// Node configuration file
    #[arg(short, long, global = true, default_value = "quorumforge.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the canonical quorum set
    Check,
    /// Print the quorum set with validator names
    Describe,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let cli = Cli::parse();
    info!("Starting QuorumForge Node v{}", VERSION);

    let doc = NodeConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let configured = match QuorumConfigurator::from_document(&doc) {
        Ok(configured) => configured,
        Err(err) => {
            if err.is_suppressible() {
                error!("Set UNSAFE_QUORUM=true only if you know what you are doing");
            }
            return Err(err).context("invalid quorum configuration");
        }
    };

    match cli.command.unwrap_or(Commands::Check) {
        Commands::Check => {
            let quorum = configured.quorum();
            let report = json!({
                "node": configured.node_id().to_string(),
                "quorum_set": quorum.quorum_set.canonical(),
                "failure_safety": quorum.failure_safety,
                "blocking_set_size": quorum.blocking_set_size,
                "overridden": configured.is_overridden(),
                "fingerprint": hex::encode(configured.fingerprint()),
            });
            println!("{:#}", report);
        }
        Commands::Describe => {
            println!("{}", configured.quorum().quorum_set.describe(configured.aliases()));
        }
    }

    Ok(())
}
