//! Command surface: parsing, authorization, handlers and the polling loop

pub mod actor;
pub mod commands;
pub mod dispatcher;
pub mod handlers;
pub mod texts;

pub use actor::BotActor;
pub use commands::{parse_command, Command, ParsedCommand};
pub use dispatcher::Dispatcher;
pub use handlers::CommandHandlers;
