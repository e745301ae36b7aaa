//! Command names, menu entries and parsing of `/command args` text

use crate::telegram::BotCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Enable,
    Disable,
    AddPlaylist,
    RemovePlaylist,
    ListPlaylists,
    SetInterval,
    SetFormat,
    SendNow,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::Start,
        Command::Help,
        Command::Status,
        Command::Enable,
        Command::Disable,
        Command::AddPlaylist,
        Command::RemovePlaylist,
        Command::ListPlaylists,
        Command::SetInterval,
        Command::SetFormat,
        Command::SendNow,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Status => "status",
            Command::Enable => "enable",
            Command::Disable => "disable",
            Command::AddPlaylist => "add_playlist",
            Command::RemovePlaylist => "remove_playlist",
            Command::ListPlaylists => "list_playlists",
            Command::SetInterval => "set_interval",
            Command::SetFormat => "set_format",
            Command::SendNow => "send_now",
        }
    }

    /// Menu description
    pub fn description(&self) -> &'static str {
        match self {
            Command::Start => "Start the bot and see instructions",
            Command::Help => "Show all available commands",
            Command::Status => "Show bot status and settings",
            Command::Enable => "Enable automatic music sending",
            Command::Disable => "Disable automatic music sending",
            Command::AddPlaylist => "Add a new YouTube playlist",
            Command::RemovePlaylist => "Remove a playlist by number",
            Command::ListPlaylists => "Show all configured playlists",
            Command::SetInterval => "Set sending interval in minutes",
            Command::SetFormat => "Set download format (audio/video)",
            Command::SendNow => "Send random music immediately",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.name() == name)
    }

    /// Entries for `setMyCommands`
    pub fn menu() -> Vec<BotCommand> {
        Self::ALL
            .iter()
            .map(|cmd| BotCommand::new(cmd.name(), cmd.description()))
            .collect()
    }
}

/// A recognised command and its whitespace-separated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: Vec<String>,
}

impl ParsedCommand {
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Parse `/name[@bot] arg...`; `None` for plain text and unknown commands
pub fn parse_command(text: &str) -> Option<ParsedCommand> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next()?.strip_prefix('/')?;
    let name = head.split('@').next().unwrap_or(head);
    let command = Command::from_name(name)?;

    Some(ParsedCommand {
        command,
        args: tokens.map(str::to_string).collect(),
    })
}
