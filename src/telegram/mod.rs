//! Telegram Bot API: the messaging collaborator

pub mod client;
pub mod models;
pub mod traits;

pub use client::TelegramClient;
pub use models::{BotCommand, Message, ParseMode, Update};
pub use traits::Messenger;
