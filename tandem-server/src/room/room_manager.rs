use crate::room::{JoinOutcome, Room, RoomCommand};
use crate::signaling::SignalingOutput;
use std::collections::HashMap;
use std::sync::Arc;
use tandem_core::{PeerId, RoomToken, SignalEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Owns every room and which room each peer is in. All membership changes
/// go through its command channel and are applied one at a time.
pub struct RoomManager {
    rooms: HashMap<RoomToken, Room>,
    memberships: HashMap<PeerId, RoomToken>,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl RoomManager {
    pub fn new(command_rx: mpsc::Receiver<RoomCommand>, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            command_rx,
            signaling,
        }
    }

    /// Starts a manager on its own task and returns its command sender.
    pub fn spawn(signaling: Arc<dyn SignalingOutput>) -> mpsc::Sender<RoomCommand> {
        let (tx, rx) = mpsc::channel(256);
        tokio::spawn(Self::new(rx, signaling).run());
        tx
    }

    pub async fn run(mut self) {
        info!("Room manager event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Room manager finished.");
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join { peer_id, room } => self.join(peer_id, room).await,

            RoomCommand::Relay { peer_id, event } => {
                let is_bye = matches!(event, SignalEvent::Bye(_));
                self.relay(peer_id, event).await;
                if is_bye {
                    self.leave(&peer_id);
                }
            }

            RoomCommand::Disconnect { peer_id } => {
                self.leave(&peer_id);
            }
        }
    }

    async fn join(&mut self, peer_id: PeerId, token: RoomToken) {
        if let Some(current) = self.memberships.get(&peer_id) {
            if *current != token {
                info!("Peer {} moves from room '{}' to '{}'", peer_id, current, token);
                self.leave(&peer_id);
            }
        }

        let room = self
            .rooms
            .entry(token.clone())
            .or_insert_with(Room::new);

        match room.join(peer_id) {
            JoinOutcome::Created => {
                info!("Peer {} created room '{}'", peer_id, token);
                self.memberships.insert(peer_id, token);
                self.signaling.send_signal(peer_id, SignalEvent::Created).await;
            }
            JoinOutcome::Joined { existing } => {
                info!("Peer {} joined room '{}'", peer_id, token);
                self.memberships.insert(peer_id, token.clone());
                self.signaling.send_signal(peer_id, SignalEvent::Joined).await;
                self.signaling
                    .send_signal(existing, SignalEvent::NewPeer(token))
                    .await;
            }
            JoinOutcome::Full => {
                info!("Room '{}' is full; refusing peer {}", token, peer_id);
                self.signaling.send_signal(peer_id, SignalEvent::Full).await;
            }
            JoinOutcome::AlreadyMember => {
                warn!("Peer {} is already in room '{}'", peer_id, token);
            }
        }
    }

    async fn relay(&self, peer_id: PeerId, event: SignalEvent) {
        if !event.is_peer_relayed() {
            warn!("Dropping '{}' from peer {}: not relayable", event.name(), peer_id);
            return;
        }
        let Some(token) = self.memberships.get(&peer_id) else {
            warn!("Dropping '{}' from peer {}: not in a room", event.name(), peer_id);
            return;
        };
        let Some(other) = self.rooms.get(token).and_then(|r| r.other(&peer_id)) else {
            debug!("No one else in room '{}' to receive '{}'", token, event.name());
            return;
        };

        debug!("Relaying '{}' in room '{}': {} -> {}", event.name(), token, peer_id, other);
        self.signaling.send_signal(other, event).await;
    }

    fn leave(&mut self, peer_id: &PeerId) {
        let Some(token) = self.memberships.remove(peer_id) else {
            return;
        };
        let Some(room) = self.rooms.get_mut(&token) else {
            return;
        };
        room.leave(peer_id);
        info!("Peer {} left room '{}'", peer_id, token);

        if room.is_empty() {
            self.rooms.remove(&token);
            info!("Room '{}' is empty and was dropped", token);
        }
    }
}
