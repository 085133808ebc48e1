use crate::error::CallError;
use crate::negotiation::input::{Effect, Input};
use crate::negotiation::role::{Membership, RoleDecision, RoleResolver};
use tandem_core::{IceCandidate, Role, RoomToken, SdpKind, SessionDescription, SignalEvent};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    Joining,
    RoleAssigned,
    OfferSent,
    OfferReceived,
    AnswerReceived,
    AnswerSent,
    Connected,
    Closed,
}

/// Engine operation the coordinator is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    CreateOffer,
    ApplyLocalOffer,
    ApplyRemoteOffer,
    CreateAnswer,
    ApplyLocalAnswer,
    ApplyRemoteAnswer,
}

/// Offer/answer/candidate state machine for one session.
///
/// `handle` never performs I/O: it returns the effects the caller must
/// execute, and operation results come back later as completion inputs.
#[derive(Debug)]
pub struct Coordinator {
    room: RoomToken,
    state: NegotiationState,
    roles: RoleResolver,
    pending: Option<Pending>,
    local_description: Option<SessionDescription>,
    remote_description_set: bool,
    queued_remote: Vec<IceCandidate>,
    queued_local: Vec<IceCandidate>,
}

impl Coordinator {
    pub fn new(room: RoomToken) -> Self {
        Self {
            room,
            state: NegotiationState::Idle,
            roles: RoleResolver::new(),
            pending: None,
            local_description: None,
            remote_description_set: false,
            queued_remote: Vec::new(),
            queued_local: Vec::new(),
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn role(&self) -> Option<Role> {
        self.roles.role()
    }

    pub fn room(&self) -> &RoomToken {
        &self.room
    }

    pub fn is_closed(&self) -> bool {
        self.state == NegotiationState::Closed
    }

    /// Remote candidates held until the remote description is applied.
    pub fn queued_remote_candidates(&self) -> usize {
        self.queued_remote.len()
    }

    pub fn handle(&mut self, input: Input) -> Result<Vec<Effect>, CallError> {
        if self.is_closed() {
            debug!("Ignoring {} for closed session in '{}'", input.name(), self.room);
            return Ok(Vec::new());
        }

        match input {
            Input::Join => self.on_join(),
            Input::Signal(event) => self.on_signal(event),
            Input::LocalCandidate(candidate) => Ok(self.on_local_candidate(candidate)),
            Input::OfferCreated(offer) => self.on_offer_created(offer),
            Input::AnswerCreated(answer) => self.on_answer_created(answer),
            Input::LocalDescriptionApplied => self.on_local_description_applied(),
            Input::RemoteDescriptionApplied => self.on_remote_description_applied(),
            Input::EngineFailed { operation, reason } => {
                error!("Engine failed to {} in '{}': {}", operation, self.room, reason);
                self.pending = None;
                Err(CallError::Engine { operation, reason })
            }
            Input::HangUp => Ok(self.close(true)),
        }
    }

    fn on_join(&mut self) -> Result<Vec<Effect>, CallError> {
        if self.state != NegotiationState::Idle {
            return self.out_of_order("join");
        }
        self.transition(NegotiationState::Joining);
        Ok(vec![Effect::Send(SignalEvent::Join(self.room.clone()))])
    }

    fn on_signal(&mut self, event: SignalEvent) -> Result<Vec<Effect>, CallError> {
        match event {
            SignalEvent::Created => self.on_membership(Membership::Created, "created"),
            SignalEvent::Joined => self.on_membership(Membership::Joined, "joined"),
            SignalEvent::Full => self.on_membership(Membership::Full, "full"),
            SignalEvent::NewPeer(_) => self.on_membership(Membership::PeerJoined, "new_peer"),
            SignalEvent::Offer(offer) => self.on_remote_offer(offer),
            SignalEvent::Answer(answer) => self.on_remote_answer(answer),
            SignalEvent::IceCandidate(candidate) => Ok(self.on_remote_candidate(candidate)),
            SignalEvent::Bye(_) => {
                info!("Peer ended the call in '{}'", self.room);
                Ok(self.close(false))
            }
            SignalEvent::Join(_) => self.out_of_order("join"),
        }
    }

    fn on_membership(
        &mut self,
        signal: Membership,
        name: &'static str,
    ) -> Result<Vec<Effect>, CallError> {
        if self.state != NegotiationState::Joining {
            return self.out_of_order(name);
        }

        let decision = match self.roles.resolve(signal) {
            Ok(decision) => decision,
            Err(e) => {
                warn!("Room '{}' rejected the join: {}", self.room, e);
                self.transition(NegotiationState::Closed);
                return Err(e);
            }
        };

        match decision {
            RoleDecision::Wait => {
                info!("Waiting in room '{}' ({})", self.room, name);
                Ok(Vec::new())
            }
            RoleDecision::Assign(Role::Caller) => {
                self.transition(NegotiationState::RoleAssigned);
                self.pending = Some(Pending::CreateOffer);
                let mut effects = vec![
                    Effect::CreateEngine,
                    Effect::CreateDataChannel,
                    Effect::CreateOffer,
                ];
                effects.extend(self.flush_local());
                Ok(effects)
            }
            RoleDecision::Assign(Role::Callee) | RoleDecision::AlreadyAssigned(_) => {
                self.out_of_order(name)
            }
        }
    }

    fn on_remote_offer(&mut self, offer: SessionDescription) -> Result<Vec<Effect>, CallError> {
        if offer.kind != SdpKind::Offer {
            warn!("Discarding invite whose description is not an offer");
            return self.out_of_order("invite");
        }
        if self.state != NegotiationState::Joining {
            return self.out_of_order("invite");
        }

        match self.roles.resolve(Membership::InviteReceived)? {
            RoleDecision::Assign(Role::Callee) => {}
            _ => return self.out_of_order("invite"),
        }

        self.transition(NegotiationState::RoleAssigned);
        self.transition(NegotiationState::OfferReceived);
        self.pending = Some(Pending::ApplyRemoteOffer);

        let mut effects = vec![Effect::CreateEngine, Effect::SetRemoteDescription(offer)];
        effects.extend(self.flush_local());
        Ok(effects)
    }

    fn on_remote_answer(&mut self, answer: SessionDescription) -> Result<Vec<Effect>, CallError> {
        if answer.kind != SdpKind::Answer {
            warn!("Discarding ok whose description is not an answer");
            return self.out_of_order("ok");
        }
        if self.state != NegotiationState::OfferSent || self.role() != Some(Role::Caller) {
            return self.out_of_order("ok");
        }

        self.transition(NegotiationState::AnswerReceived);
        self.pending = Some(Pending::ApplyRemoteAnswer);
        Ok(vec![Effect::SetRemoteDescription(answer)])
    }

    fn on_remote_candidate(&mut self, candidate: IceCandidate) -> Vec<Effect> {
        if self.remote_description_set {
            return vec![Effect::AddRemoteCandidate(candidate)];
        }
        debug!(
            "Queueing remote candidate until the remote description is set ({} queued)",
            self.queued_remote.len() + 1
        );
        self.queued_remote.push(candidate);
        Vec::new()
    }

    fn on_local_candidate(&mut self, candidate: Option<IceCandidate>) -> Vec<Effect> {
        let Some(candidate) = candidate else {
            debug!("Local candidate gathering complete");
            return Vec::new();
        };
        if self.role().is_none() {
            self.queued_local.push(candidate);
            return Vec::new();
        }
        vec![Effect::Send(SignalEvent::IceCandidate(candidate))]
    }

    fn on_offer_created(&mut self, offer: SessionDescription) -> Result<Vec<Effect>, CallError> {
        if self.pending != Some(Pending::CreateOffer) {
            return self.out_of_order("offer_created");
        }
        self.pending = Some(Pending::ApplyLocalOffer);
        self.local_description = Some(offer.clone());
        Ok(vec![Effect::SetLocalDescription(offer)])
    }

    fn on_answer_created(&mut self, answer: SessionDescription) -> Result<Vec<Effect>, CallError> {
        if self.pending != Some(Pending::CreateAnswer) {
            return self.out_of_order("answer_created");
        }
        self.pending = Some(Pending::ApplyLocalAnswer);
        self.local_description = Some(answer.clone());
        Ok(vec![Effect::SetLocalDescription(answer)])
    }

    fn on_local_description_applied(&mut self) -> Result<Vec<Effect>, CallError> {
        let step = self.pending;
        let Some(local) = self.local_description.clone() else {
            return self.out_of_order("local_description_applied");
        };

        match step {
            Some(Pending::ApplyLocalOffer) => {
                self.pending = None;
                self.transition(NegotiationState::OfferSent);
                Ok(vec![Effect::Send(SignalEvent::Offer(local))])
            }
            Some(Pending::ApplyLocalAnswer) => {
                self.pending = None;
                self.transition(NegotiationState::AnswerSent);
                self.transition(NegotiationState::Connected);
                Ok(vec![Effect::Send(SignalEvent::Answer(local))])
            }
            _ => self.out_of_order("local_description_applied"),
        }
    }

    fn on_remote_description_applied(&mut self) -> Result<Vec<Effect>, CallError> {
        match self.pending {
            Some(Pending::ApplyRemoteOffer) => {
                self.remote_description_set = true;
                self.pending = Some(Pending::CreateAnswer);
                let mut effects = self.flush_remote();
                effects.push(Effect::CreateAnswer);
                Ok(effects)
            }
            Some(Pending::ApplyRemoteAnswer) => {
                self.remote_description_set = true;
                self.pending = None;
                self.transition(NegotiationState::Connected);
                Ok(self.flush_remote())
            }
            _ => self.out_of_order("remote_description_applied"),
        }
    }

    fn close(&mut self, notify_peer: bool) -> Vec<Effect> {
        self.transition(NegotiationState::Closed);
        self.pending = None;
        self.queued_remote.clear();
        self.queued_local.clear();
        vec![Effect::Release { notify_peer }]
    }

    fn flush_remote(&mut self) -> Vec<Effect> {
        if !self.queued_remote.is_empty() {
            info!("Applying {} queued remote candidates", self.queued_remote.len());
        }
        self.queued_remote
            .drain(..)
            .map(Effect::AddRemoteCandidate)
            .collect()
    }

    fn flush_local(&mut self) -> Vec<Effect> {
        self.queued_local
            .drain(..)
            .map(|c| Effect::Send(SignalEvent::IceCandidate(c)))
            .collect()
    }

    fn transition(&mut self, next: NegotiationState) {
        debug!("Negotiation in '{}': {:?} -> {:?}", self.room, self.state, next);
        self.state = next;
    }

    fn out_of_order(&self, signal: &'static str) -> Result<Vec<Effect>, CallError> {
        warn!(
            "Discarding out-of-order {} in room '{}' (state {:?})",
            signal, self.room, self.state
        );
        Err(CallError::OutOfOrderSignal {
            signal,
            state: self.state,
        })
    }
}
