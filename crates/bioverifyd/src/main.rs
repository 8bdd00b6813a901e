use std::net::SocketAddr;

use anyhow::{Context, Result};
use bioverify_core::init_tracing;
use bioverifyd::{DaemonConfig, Server};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "bioverifyd")]
#[command(about = "BioVerify orchestration daemon", version)]
struct Cli {
    /// Address to listen on (overrides BIOVERIFY_LISTEN_ADDR)
    #[arg(long, env = "BIOVERIFY_LISTEN_ADDR")]
    listen: Option<SocketAddr>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    init_tracing(cli.json, level);

    let mut config = DaemonConfig::from_env().context("Failed to read daemon configuration")?;
    if let Some(addr) = cli.listen {
        config = config.with_listen_addr(addr);
    }

    let server = Server::from_env(config)
        .await
        .context("Failed to initialise daemon")?;
    server.run().await.context("Daemon exited with an error")?;
    Ok(())
}
