mod call;
mod media;
mod prompt;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use tandem_server::{Server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Two-party WebRTC calls over a small signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay.
    Serve {
        #[arg(long, env = "TANDEM_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },
    /// Join a room and chat with the peer over the data channel.
    Call(call::CallArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Commands::Serve { bind } => {
            let server = Server::bind(&ServerConfig { bind }).await?;
            println!(
                "{} ws://{}/ws",
                "📡 Relay listening on".green().bold(),
                server.local_addr()?
            );
            server
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await?;
            println!("{}", "Relay stopped.".cyan());
        }
        Commands::Call(args) => call::run(args).await?,
    }

    Ok(())
}
