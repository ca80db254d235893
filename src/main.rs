use anyhow::Context;
use clap::Parser;
use tracing::info;

use kvs::config::Config;
use kvs::logging;
use kvs::server::Server;

/// In-memory key-value store served over gRPC
#[derive(Debug, Parser)]
#[command(name = "kvs-server", version)]
struct Args {
  /// Path to a TOML configuration file
  #[arg(short, long)]
  config: Option<String>,

  /// Listening address, overrides the config file
  #[arg(short, long)]
  listen: Option<String>,

  /// Require an `authorization` entry on every call
  #[arg(long)]
  auth: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let mut config = match &args.config {
    Some(path) => Config::from_file(path)?,
    None => Config::default(),
  };
  if let Some(listen) = args.listen {
    config.listen_addr = listen;
  }
  if args.auth {
    config.auth.enabled = true;
  }

  logging::init(&config.log).context("failed to initialize logging")?;

  info!("Starting KVS - in-memory key-value store");
  info!("Version: {}", env!("CARGO_PKG_VERSION"));

  let server = Server::bind(config)
    .await
    .context("failed to bind server")?;
  info!("Server listening on: {}", server.local_addr());

  server
    .run_until(async {
      if tokio::signal::ctrl_c().await.is_ok() {
        info!("Interrupt received, shutting down");
      }
    })
    .await?;

  Ok(())
}
