use crate::media::{SyntheticMediaSource, TerminalSink};
use crate::prompt::TerminalPrompt;
use anyhow::Result;
use colored::*;
use std::sync::Arc;
use tandem_client::{
    CallDeps, CallEvent, CallHandle, CallManager, ClientConfig, FixedRoom, Origin,
    WebRtcEngineFactory, WsConnector,
};
use tandem_core::IceServerConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

#[derive(clap::Args)]
pub struct CallArgs {
    /// WebSocket endpoint of the relay.
    #[arg(long, env = "TANDEM_SIGNALING_URL", default_value = "ws://127.0.0.1:3000/ws")]
    server: String,

    /// Room to join. Asked for interactively when absent.
    #[arg(long)]
    room: Option<String>,

    #[arg(long, env = "TURN_URL")]
    turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    turn_credential: Option<String>,

    /// Pretend the camera is missing and share the screen instead.
    #[arg(long)]
    no_camera: bool,
}

impl CallArgs {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            signaling_url: self.server.clone(),
            ..Default::default()
        };
        if let Some(url) = &self.turn_url {
            config.ice_servers.push(IceServerConfig {
                urls: vec![url.clone()],
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }
        config
    }
}

pub async fn run(args: CallArgs) -> Result<()> {
    let config = args.client_config();
    let deps = CallDeps {
        media: Arc::new(SyntheticMediaSource::new(!args.no_camera)),
        connector: Arc::new(WsConnector::new(config.signaling_url.clone())),
        engines: Arc::new(WebRtcEngineFactory::new(config.ice_servers.clone())),
        local_sink: Arc::new(TerminalSink::new("local")),
        remote_sink: Arc::new(TerminalSink::new("remote")),
    };
    let handle = CallManager::spawn(deps, config);
    let printer = tokio::spawn(print_events(handle.subscribe()));

    let started = match args.room {
        Some(room) => handle.start(FixedRoom::new(room)).await,
        None => handle.start(TerminalPrompt).await,
    };

    if started.is_ok() {
        println!(
            "{}",
            "Type a message and press Enter. /hangup ends the call, Ctrl-D quits.".dimmed()
        );
        chat(&handle).await?;
    }

    handle.shutdown().await;
    // Last sender gone: the printer drains what is left and stops.
    drop(handle);
    let _ = printer.await;
    Ok(())
}

async fn chat(handle: &CallHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let text = line.trim();
                match text {
                    "" => {}
                    "/hangup" => handle.hang_up().await,
                    _ => {
                        if let Err(e) = handle.send_text(text).await {
                            println!("{}", format!("Not sent: {}", e).yellow());
                        }
                    }
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<CallEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        };
        match event {
            CallEvent::Notice(e) => println!("{}", format!("⚠ {}", e).red().bold()),
            CallEvent::StateChanged(state) => println!("{}", format!("· {:?}", state).dimmed()),
            CallEvent::RoleAssigned(role) => println!("{}", format!("You are the {}", role).cyan()),
            CallEvent::RemoteStream { id } => {
                println!("{}", format!("Receiving remote media ({})", id).green())
            }
            CallEvent::ChannelOpen => println!("{}", "✨ Chat channel open".green().bold()),
            CallEvent::Message(entry) => match entry.origin {
                Origin::Local => println!("{} {}", "you:".blue().bold(), entry.text),
                Origin::Remote => println!("{} {}", "peer:".magenta().bold(), entry.text),
            },
            CallEvent::ChannelClosed => println!("{}", "Call ended.".yellow()),
        }
    }
}
