use async_trait::async_trait;

/// Asks the user which room to join. `None` means the user declined.
#[async_trait]
pub trait RoomPrompt: Send + Sync {
    async fn ask_room(&self) -> Option<String>;
}

/// Answers the prompt with a fixed room name.
#[derive(Debug, Clone)]
pub struct FixedRoom(pub String);

impl FixedRoom {
    pub fn new(room: impl Into<String>) -> Self {
        Self(room.into())
    }
}

#[async_trait]
impl RoomPrompt for FixedRoom {
    async fn ask_room(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
