use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use kvs::client::{Client, ClientOptions, DEFAULT_ADDR};

/// Command line client for the KVS server
#[derive(Debug, Parser)]
#[command(name = "kvs-client", version)]
struct Args {
  /// Server URL
  #[arg(long, default_value = DEFAULT_ADDR)]
  addr: String,

  /// CA certificate (PEM); enables TLS, use an https:// address
  #[arg(long)]
  ca: Option<PathBuf>,

  /// Server name to verify against the certificate
  #[arg(long)]
  domain: Option<String>,

  /// Sent as the `authorization` metadata entry
  #[arg(long)]
  token: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Store VALUE under KEY
  Put { key: String, value: String },
  /// Append ARG to the value under KEY, printing the previous value
  Append { key: String, arg: String },
  /// Print the value under KEY
  Get { key: String },
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();
  match run(args).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {:#}", e);
      ExitCode::FAILURE
    }
  }
}

async fn run(args: Args) -> anyhow::Result<()> {
  let mut client = Client::connect(ClientOptions {
    addr: args.addr,
    ca: args.ca,
    domain: args.domain,
    token: args.token,
  })
  .await?;

  match args.command {
    Command::Put { key, value } => {
      println!("PUT({}, {})", key, value);
      client.put(&key, &value).await?;
    }
    Command::Append { key, arg } => {
      println!("APPEND({}, {})", key, arg);
      let old_value = client.append(&key, &arg).await?;
      println!("old_value: {:?}", old_value);
    }
    Command::Get { key } => {
      println!("GET({})", key);
      let value = client.get(&key).await?;
      println!("Value: {:?}", value);
    }
  }

  Ok(())
}
