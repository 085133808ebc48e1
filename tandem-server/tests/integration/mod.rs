
use std::sync::Arc;
use tandem_core::{PeerId, RoomToken};
use tandem_server::{RoomCommand, RoomManager};
use tokio::sync::mpsc;
use tracing::Level;

use crate::utils::{Delivered, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_manager() -> (
    mpsc::Sender<RoomCommand>,
    mpsc::UnboundedReceiver<Delivered>,
    MockSignalingOutput,
) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<RoomCommand>(100);
    let (signaling, signal_rx) = MockSignalingOutput::new();

    let manager = RoomManager::new(cmd_rx, Arc::new(signaling.clone()));
    tokio::spawn(manager.run());

    (cmd_tx, signal_rx, signaling)
}

pub fn room(name: &str) -> RoomToken {
    RoomToken::parse(name).expect("valid room name")
}

pub async fn join(cmd_tx: &mpsc::Sender<RoomCommand>, peer_id: PeerId, name: &str) {
    cmd_tx
        .send(RoomCommand::Join {
            peer_id,
            room: room(name),
        })
        .await
        .expect("room manager alive");
}
