use async_trait::async_trait;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use tandem_client::RoomPrompt;
use tracing::warn;

/// Asks for the room name on the terminal.
pub struct TerminalPrompt;

#[async_trait]
impl RoomPrompt for TerminalPrompt {
    async fn ask_room(&self) -> Option<String> {
        let answer = tokio::task::spawn_blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Room name")
                .allow_empty(true)
                .interact_text()
        })
        .await;

        match answer {
            Ok(Ok(room)) => Some(room),
            Ok(Err(e)) => {
                warn!("Room prompt failed: {}", e);
                None
            }
            Err(e) => {
                warn!("Room prompt task failed: {}", e);
                None
            }
        }
    }
}
