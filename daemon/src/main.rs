//! Sentinel daemon: governance automation for a masternode.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sentinel_node::{init_logging, LogFormat, NetworkChoice, SentinelConfig, SentinelNode};

#[derive(Parser)]
#[command(name = "sentinel", about = "Governance sentinel for a masternode", version)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "SENTINEL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of the LMDB store.
    #[arg(long, env = "SENTINEL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// URL of the chain node's JSON-RPC interface.
    #[arg(long, env = "SENTINEL_RPC_URL")]
    rpc_url: Option<String>,

    #[arg(long, env = "SENTINEL_RPC_USER")]
    rpc_user: Option<String>,

    #[arg(long, env = "SENTINEL_RPC_PASSWORD", hide_env_values = true)]
    rpc_password: Option<String>,

    /// Network whose address rules apply: "auto", "main" or "test".
    #[arg(long, env = "SENTINEL_NETWORK")]
    network: Option<String>,

    /// Log filter: "trace", "debug", "info", "warn", "error" or a directive list.
    #[arg(long, env = "SENTINEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SENTINEL_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the scheduler until SIGINT/SIGTERM (default).
    Run,
    /// Print the effective configuration as TOML and exit.
    PrintConfig,
}

impl Cli {
    /// File configuration (or defaults) with the command-line overrides applied.
    fn resolve_config(&self) -> anyhow::Result<SentinelConfig> {
        let mut config = match &self.config {
            Some(path) => SentinelConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SentinelConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.store.data_dir = dir.clone();
        }
        if let Some(url) = &self.rpc_url {
            config.chain.rpc_url = url.clone();
        }
        if let Some(user) = &self.rpc_user {
            config.chain.rpc_user = user.clone();
        }
        if let Some(password) = &self.rpc_password {
            config.chain.rpc_password = password.clone();
        }
        if let Some(network) = &self.network {
            config.chain.network = network.parse::<NetworkChoice>()?;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::PrintConfig => {
            print!("{}", config.to_toml_string()?);
        }
        Command::Run => {
            let format: LogFormat = config.log_format.parse()?;
            init_logging(format, &config.log_level)?;

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                rpc_url = %config.chain.rpc_url,
                data_dir = %config.store.data_dir.display(),
                "starting sentinel"
            );

            let node = SentinelNode::new(config)
                .await
                .context("failed to start sentinel")?;

            let shutdown = node.shutdown.clone();
            tokio::spawn(async move { shutdown.wait_for_signal().await });

            node.run().await?;
            tracing::info!("sentinel exited cleanly");
        }
    }

    Ok(())
}
