use crate::error::CallError;
use tandem_core::Role;
use tracing::info;

/// Room-membership signals that can decide this client's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// This client is the first occupant.
    Created,
    /// This client is the second occupant; the Caller will invite us.
    Joined,
    /// A second occupant arrived while this client was present.
    PeerJoined,
    /// An offer arrived before any role was decided.
    InviteReceived,
    /// The room already has two occupants.
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleDecision {
    /// No role yet.
    Wait,
    /// Role newly assigned; the matching flow must start now.
    Assign(Role),
    /// The signal would pick a role but one is already set.
    AlreadyAssigned(Role),
}

/// Assign-once role slot fed by membership signals.
#[derive(Debug, Default)]
pub struct RoleResolver {
    role: Option<Role>,
}

impl RoleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn resolve(&mut self, signal: Membership) -> Result<RoleDecision, CallError> {
        let wanted = match signal {
            Membership::Created | Membership::Joined => return Ok(RoleDecision::Wait),
            Membership::Full => return Err(CallError::RoomUnavailable),
            Membership::PeerJoined => Role::Caller,
            Membership::InviteReceived => Role::Callee,
        };

        if let Some(existing) = self.role {
            return Ok(RoleDecision::AlreadyAssigned(existing));
        }

        info!("Role assigned: {}", wanted);
        self.role = Some(wanted);
        Ok(RoleDecision::Assign(wanted))
    }
}
