use crate::call::session::Session;
use crate::call::{CallCommand, CallEvent, CallHandle, CallStatus, Envelope, Inbound, RoomPrompt};
use crate::channel::{ChannelState, DataChannelSession};
use crate::config::ClientConfig;
use crate::engine::{EngineEvent, EngineEvents, EngineFactory, NegotiationEngine};
use crate::error::CallError;
use crate::media::{MediaSink, MediaSource, MediaStream, acquire_local_stream};
use crate::negotiation::{Coordinator, Effect, Input, NegotiationState};
use crate::transport::{SignalInbox, SignalingTransport, TransportConnector};
use std::sync::Arc;
use tandem_core::{RoomToken, SessionId, SignalEvent};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// External collaborators a call needs.
#[derive(Clone)]
pub struct CallDeps {
    pub media: Arc<dyn MediaSource>,
    pub connector: Arc<dyn TransportConnector>,
    pub engines: Arc<dyn EngineFactory>,
    pub local_sink: Arc<dyn MediaSink>,
    pub remote_sink: Arc<dyn MediaSink>,
}

type StartReply = oneshot::Sender<Result<SessionId, CallError>>;

/// A start that holds media and a transport while the user picks a room.
struct PendingStart {
    id: SessionId,
    local_stream: Arc<dyn MediaStream>,
    transport: Arc<dyn SignalingTransport>,
    reply: StartReply,
}

/// Owns the single live [`Session`] and runs every transition of it on one
/// event loop: user commands, relayed signals, engine events and operation
/// completions are handled one at a time, each to completion.
pub struct CallManager {
    deps: CallDeps,
    config: ClientConfig,
    session: Option<Session>,
    pending: Option<PendingStart>,
    finished: Option<CallStatus>,
    last_state: NegotiationState,
    command_rx: mpsc::Receiver<CallCommand>,
    inbox_tx: mpsc::UnboundedSender<Envelope>,
    inbox_rx: mpsc::UnboundedReceiver<Envelope>,
    events: broadcast::Sender<CallEvent>,
}

impl CallManager {
    pub fn new(deps: CallDeps, config: ClientConfig) -> (Self, CallHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(256);

        let handle = CallHandle::new(command_tx, events.clone());
        let manager = Self {
            deps,
            config,
            session: None,
            pending: None,
            finished: None,
            last_state: NegotiationState::Idle,
            command_rx,
            inbox_tx,
            inbox_rx,
            events,
        };
        (manager, handle)
    }

    /// Spawns the event loop and returns its handle.
    pub fn spawn(deps: CallDeps, config: ClientConfig) -> CallHandle {
        let (manager, handle) = Self::new(deps, config);
        tokio::spawn(manager.run());
        handle
    }

    pub async fn run(mut self) {
        info!("Call manager event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(CallCommand::Shutdown { reply }) => {
                            self.shutdown().await;
                            let _ = reply.send(());
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("All call handles dropped. Shutting down.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                Some(envelope) = self.inbox_rx.recv() => {
                    self.handle_envelope(envelope).await;
                }
            }
        }

        info!("Call manager event loop finished");
    }

    async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::Start { prompt, reply } => self.start(prompt, reply).await,
            CallCommand::SendText { text, reply } => {
                let _ = reply.send(self.send_text(&text).await);
            }
            CallCommand::HangUp { reply } => {
                self.hang_up().await;
                let _ = reply.send(());
            }
            CallCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            CallCommand::Shutdown { reply } => {
                self.shutdown().await;
                let _ = reply.send(());
            }
        }
    }

    /// Acquires media and the transport, then hands the prompt to its own
    /// task. The answer comes back as [`Inbound::RoomChosen`], so the loop
    /// keeps serving commands while the user types.
    async fn start(&mut self, prompt: Box<dyn RoomPrompt>, reply: StartReply) {
        if self.session.is_some() || self.pending.is_some() {
            warn!("Refusing to start a second call");
            self.fail_start(reply, CallError::SessionActive);
            return;
        }

        let id = SessionId::new();
        let local_stream = match acquire_local_stream(self.deps.media.as_ref()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_start(reply, e);
                return;
            }
        };

        let inbox = SignalInbox::new(id, self.inbox_tx.clone());
        let transport = match self.deps.connector.connect(inbox).await {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Signaling transport unavailable: {:#}", e);
                local_stream.stop_all_tracks();
                self.fail_start(reply, CallError::TransportClosed);
                return;
            }
        };

        self.pending = Some(PendingStart {
            id,
            local_stream,
            transport,
            reply,
        });

        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let answer = prompt.ask_room().await;
            let _ = tx.send(Envelope {
                session: id,
                event: Inbound::RoomChosen(answer),
            });
        });
    }

    async fn finish_start(&mut self, answer: Option<String>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let PendingStart {
            id,
            local_stream,
            transport,
            reply,
        } = pending;

        let room = match answer.as_deref().map(RoomToken::parse) {
            Some(Ok(room)) => room,
            _ => {
                warn!("No room name given; join request not sent");
                local_stream.stop_all_tracks();
                transport.close().await;
                self.fail_start(reply, CallError::EmptyRoomName);
                return;
            }
        };

        self.deps.local_sink.attach(local_stream.clone());
        info!("Starting call {} in room '{}'", id, room);

        self.finished = None;
        self.session = Some(Session {
            id,
            coordinator: Coordinator::new(room),
            local_stream,
            remote_streams: Vec::new(),
            engine: None,
            channel: DataChannelSession::new(self.config.ready_marker.clone()),
            transport,
        });

        self.dispatch(Input::Join).await;
        let _ = reply.send(Ok(id));
    }

    /// Gives back what a start acquired before a room was chosen.
    async fn abandon_start(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        info!("Call {} abandoned before a room was chosen", pending.id);
        pending.local_stream.stop_all_tracks();
        pending.transport.close().await;
        // The call never became active.
        let _ = pending.reply.send(Err(CallError::NoActiveSession));
    }

    fn fail_start(&self, reply: StartReply, error: CallError) {
        self.publish(CallEvent::Notice(error.clone()));
        let _ = reply.send(Err(error));
    }

    async fn send_text(&mut self, text: &str) -> Result<(), CallError> {
        let Some(session) = self.session.as_mut() else {
            return Err(CallError::ChannelNotOpen);
        };
        let Some(engine) = session.engine.clone() else {
            return Err(CallError::ChannelNotOpen);
        };
        let entry = session.channel.send(engine.as_ref(), text).await?.clone();
        let _ = self.events.send(CallEvent::Message(entry));
        Ok(())
    }

    async fn hang_up(&mut self) {
        self.abandon_start().await;
        if self.session.is_none() {
            debug!("Hang-up with no live call");
            return;
        }
        info!("Hanging up");
        self.dispatch(Input::HangUp).await;
    }

    async fn shutdown(&mut self) {
        self.abandon_start().await;
        if self.session.is_some() {
            info!("Client shutting down; ending live call");
            self.dispatch(Input::HangUp).await;
        }
    }

    async fn handle_envelope(&mut self, envelope: Envelope) {
        let live = self
            .session
            .as_ref()
            .map(|s| s.id)
            .or(self.pending.as_ref().map(|p| p.id));
        if live != Some(envelope.session) {
            debug!("Dropping event for stale session {}", envelope.session);
            return;
        }

        match envelope.event {
            Inbound::RoomChosen(answer) => self.finish_start(answer).await,
            Inbound::Signal(event) => {
                debug!("Signal in: {}", event.name());
                self.dispatch(Input::Signal(event)).await;
            }
            Inbound::Completion(input) => self.dispatch(input).await,
            Inbound::Engine(event) => self.handle_engine_event(event).await,
            Inbound::TransportLost => {
                warn!("Connection to the signaling server was lost");
            }
        }
    }

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::LocalCandidate(candidate) => {
                self.dispatch(Input::LocalCandidate(candidate)).await;
            }

            EngineEvent::RemoteTrack(stream) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if session.remote_streams.iter().any(|s| s.id() == stream.id()) {
                    return;
                }
                info!("Remote track arrived: {}", stream.id());
                if session.remote_streams.is_empty() {
                    self.deps.remote_sink.attach(stream.clone());
                }
                let id = stream.id().to_owned();
                session.remote_streams.push(stream);
                let _ = self.events.send(CallEvent::RemoteStream { id });
            }

            EngineEvent::RemoteDataChannel { label } => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                info!("Received DataChannel: {}", label);
                session.channel.adopt(&label);
            }

            EngineEvent::DataChannelOpen => self.on_channel_open().await,

            EngineEvent::DataChannelMessage(text) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                let entry = session.channel.on_message(text).clone();
                let _ = self.events.send(CallEvent::Message(entry));
            }
        }
    }

    async fn on_channel_open(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(marker) = session.channel.on_open() else {
            return;
        };
        let _ = self.events.send(CallEvent::ChannelOpen);

        let Some(engine) = session.engine.clone() else {
            return;
        };
        match session.channel.send(engine.as_ref(), &marker).await {
            Ok(entry) => {
                let _ = self.events.send(CallEvent::Message(entry.clone()));
            }
            Err(e) => warn!("Ready marker not delivered: {}", e),
        }
    }

    /// Feeds one input to the coordinator and carries out its effects.
    async fn dispatch(&mut self, input: Input) {
        let Some(session) = self.session.as_mut() else {
            debug!("No live call for {}", input.name());
            return;
        };

        let had_role = session.coordinator.role().is_some();
        let result = session.coordinator.handle(input);
        let state = session.coordinator.state();
        let role = session.coordinator.role();

        if matches!(result, Err(CallError::RoomUnavailable)) {
            self.publish(CallEvent::Notice(CallError::RoomUnavailable));
            self.discard().await;
            return;
        }

        self.set_state(state);
        if let (false, Some(role)) = (had_role, role) {
            self.publish(CallEvent::RoleAssigned(role));
        }

        match result {
            Ok(effects) => self.apply(effects).await,
            // Already logged by the coordinator; the call carries on.
            Err(CallError::OutOfOrderSignal { .. }) => {}
            Err(e) => {
                warn!("Call continues after error: {}", e);
                self.publish(CallEvent::Notice(e));
            }
        }
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        let mut operations = Vec::new();

        for effect in effects {
            match effect {
                Effect::Send(event) => self.send_signal(event).await,
                Effect::CreateEngine => self.create_engine().await,
                Effect::Release { notify_peer } => {
                    self.teardown(notify_peer).await;
                    return;
                }
                Effect::CreateDataChannel => {
                    if let Some(session) = self.session.as_mut() {
                        session.channel.create(&self.config.data_channel_label);
                    }
                    operations.push(Effect::CreateDataChannel);
                }
                op if op.is_engine_operation() => operations.push(op),
                other => warn!("Unhandled effect {:?}", other),
            }
        }

        self.spawn_operations(operations);
    }

    async fn send_signal(&self, event: SignalEvent) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let name = event.name();
        match session.transport.send(event).await {
            Ok(()) => debug!("Signal out: {}", name),
            Err(e) => warn!("Failed to send {}: {}", name, e),
        }
    }

    async fn create_engine(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.engine.is_some() {
            warn!("Session {} already has a negotiation engine", session.id);
            return;
        }

        let events = EngineEvents::new(session.id, self.inbox_tx.clone());
        match self
            .deps
            .engines
            .create(session.local_stream.clone(), events)
            .await
        {
            Ok(engine) => {
                info!("Negotiation engine created for session {}", session.id);
                session.engine = Some(engine);
            }
            Err(e) => {
                error!("Failed to create negotiation engine: {:#}", e);
                let _ = self.events.send(CallEvent::Notice(CallError::Engine {
                    operation: "create engine",
                    reason: format!("{:#}", e),
                }));
            }
        }
    }

    /// Runs engine operations in order on a separate task. Each result
    /// comes back to the loop as a completion tagged with the session.
    fn spawn_operations(&self, operations: Vec<Effect>) {
        if operations.is_empty() {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(engine) = session.engine.clone() else {
            warn!(
                "Dropping {} engine operations: no negotiation engine",
                operations.len()
            );
            return;
        };

        let session_id = session.id;
        let label = self.config.data_channel_label.clone();
        let tx = self.inbox_tx.clone();

        tokio::spawn(async move {
            for op in operations {
                let (completion, failed) = match run_operation(engine.as_ref(), op, &label).await {
                    Ok(None) => continue,
                    Ok(Some(input)) => (input, false),
                    Err(input) => (input, true),
                };
                let envelope = Envelope {
                    session: session_id,
                    event: Inbound::Completion(completion),
                };
                if tx.send(envelope).is_err() || failed {
                    return;
                }
            }
        });
    }

    /// Ends the live call: releases it, keeps its status for later and
    /// tells the user the channel closed. No-op without a live session.
    async fn teardown(&mut self, notify_peer: bool) {
        let Some(mut session) = self.session.take() else {
            debug!("Teardown with no live call");
            return;
        };
        self.release(&mut session, notify_peer).await;

        let mut status = snapshot(&session);
        status.session = None;
        self.finished = Some(status);

        self.set_state(NegotiationState::Closed);
        info!(
            "Call {} in room '{}': channel closed",
            session.id,
            session.coordinator.room()
        );
        self.publish(CallEvent::ChannelClosed);
    }

    /// Drops a session the room turned away. It never became a call, so
    /// nothing of it is kept and no closed notice goes out.
    async fn discard(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        info!("Call {} discarded: room was full", session.id);
        self.release(&mut session, false).await;
        self.set_state(NegotiationState::Idle);
    }

    /// Releases everything `session` owns. Each step runs even if an
    /// earlier one failed.
    async fn release(&self, session: &mut Session, notify_peer: bool) {
        let room = session.coordinator.room().clone();
        if !session.coordinator.is_closed() {
            let _ = session.coordinator.handle(Input::HangUp);
        }

        if notify_peer {
            match session.transport.send(SignalEvent::Bye(room.clone())).await {
                Ok(()) => info!("Sent bye to room '{}'", room),
                Err(CallError::TransportClosed) => {
                    debug!("Transport already closed; peer will find out anyway")
                }
                Err(e) => warn!("Failed to send bye: {}", e),
            }
        }

        session.local_stream.stop_all_tracks();
        for stream in &session.remote_streams {
            stream.stop_all_tracks();
        }
        self.deps.local_sink.detach();
        self.deps.remote_sink.detach();

        if let Some(engine) = session.engine.take() {
            if let Err(e) = engine.close().await {
                warn!("Failed to close negotiation engine: {:#}", e);
            }
        }
        session.channel.close();
        session.transport.close().await;
    }

    fn status(&self) -> CallStatus {
        if let Some(session) = &self.session {
            return snapshot(session);
        }
        self.finished.clone().unwrap_or(CallStatus {
            session: None,
            room: None,
            state: self.last_state,
            role: None,
            channel: ChannelState::Absent,
            transcript: Vec::new(),
        })
    }

    fn set_state(&mut self, state: NegotiationState) {
        if state == self.last_state {
            return;
        }
        info!("Call state: {:?} -> {:?}", self.last_state, state);
        self.last_state = state;
        self.publish(CallEvent::StateChanged(state));
    }

    fn publish(&self, event: CallEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn snapshot(session: &Session) -> CallStatus {
    CallStatus {
        session: Some(session.id),
        room: Some(session.coordinator.room().clone()),
        state: session.coordinator.state(),
        role: session.coordinator.role(),
        channel: session.channel.state(),
        transcript: session.channel.transcript().to_vec(),
    }
}

/// Executes one engine operation. `Ok(Some)` carries the completion to
/// feed back, `Err` the failure report.
async fn run_operation(
    engine: &dyn NegotiationEngine,
    op: Effect,
    label: &str,
) -> Result<Option<Input>, Input> {
    let (operation, result) = match op {
        Effect::CreateDataChannel => (
            "create data channel",
            engine.create_data_channel(label).await.map(|_| None),
        ),
        Effect::CreateOffer => (
            "create offer",
            engine
                .create_offer()
                .await
                .map(|offer| Some(Input::OfferCreated(offer))),
        ),
        Effect::CreateAnswer => (
            "create answer",
            engine
                .create_answer()
                .await
                .map(|answer| Some(Input::AnswerCreated(answer))),
        ),
        Effect::SetLocalDescription(description) => (
            "set local description",
            engine
                .set_local_description(description)
                .await
                .map(|_| Some(Input::LocalDescriptionApplied)),
        ),
        Effect::SetRemoteDescription(description) => (
            "set remote description",
            engine
                .set_remote_description(description)
                .await
                .map(|_| Some(Input::RemoteDescriptionApplied)),
        ),
        Effect::AddRemoteCandidate(candidate) => {
            if let Err(e) = engine.add_remote_candidate(candidate).await {
                warn!("Error adding ICE: {:#}", e);
            }
            return Ok(None);
        }
        other => {
            warn!("Not an engine operation: {:?}", other);
            return Ok(None);
        }
    };

    result.map_err(|e| Input::EngineFailed {
        operation,
        reason: format!("{:#}", e),
    })
}
