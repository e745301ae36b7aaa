use crate::bot::commands::{parse_command, Command, ParsedCommand};
use crate::bot::handlers::CommandHandlers;
use crate::bot::texts;
use crate::telegram::Message;
use crate::utils::error::CourierError;
use anyhow::Result;
use tracing::{debug, error, warn};

/// Routes parsed commands to their handlers behind the single-user guard
#[derive(Clone)]
pub struct Dispatcher {
    handlers: CommandHandlers,
    authorized_user: i64,
}

impl Dispatcher {
    pub fn new(handlers: CommandHandlers, authorized_user: i64) -> Self {
        Self {
            handlers,
            authorized_user,
        }
    }

    pub fn handlers(&self) -> &CommandHandlers {
        &self.handlers
    }

    /// The guard in front of every handler
    pub fn authorize(&self, message: &Message) -> Result<(), CourierError> {
        match &message.from {
            Some(user) if user.id == self.authorized_user => Ok(()),
            Some(user) => Err(CourierError::Unauthorized(user.id)),
            None => Err(CourierError::Unauthorized(message.chat.id)),
        }
    }

    /// Handle one incoming message; errors are logged, never returned
    pub async fn handle(&self, message: Message) {
        let Some(parsed) = message.text.as_deref().and_then(parse_command) else {
            debug!("Ignoring non-command message {}", message.message_id);
            return;
        };
        let chat_id = message.chat.id;

        if let Err(e) = self.authorize(&message) {
            warn!("Rejected /{}: {}", parsed.command.name(), e);
            if let Err(e) = self.handlers.reply(chat_id, texts::UNAUTHORIZED, None).await {
                error!("Failed to send rejection: {:#}", e);
            }
            return;
        }

        if let Err(e) = self.dispatch(chat_id, &parsed).await {
            error!("Error handling /{}: {:#}", parsed.command.name(), e);
        }
    }

    async fn dispatch(&self, chat_id: i64, cmd: &ParsedCommand) -> Result<()> {
        let h = &self.handlers;
        match cmd.command {
            Command::Start => h.start(chat_id).await,
            Command::Help => h.help(chat_id).await,
            Command::Status => h.status(chat_id).await,
            Command::Enable => h.enable(chat_id).await,
            Command::Disable => h.disable(chat_id).await,
            Command::AddPlaylist => h.add_playlist(chat_id, cmd).await,
            Command::RemovePlaylist => h.remove_playlist(chat_id, cmd).await,
            Command::ListPlaylists => h.list_playlists(chat_id).await,
            Command::SetInterval => h.set_interval(chat_id, cmd).await,
            Command::SetFormat => h.set_format(chat_id, cmd).await,
            Command::SendNow => h.send_now(chat_id).await.map(|_| ()),
        }
    }
}
