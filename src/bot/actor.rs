use crate::bot::commands::Command;
use crate::bot::dispatcher::Dispatcher;
use crate::telegram::TelegramClient;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Pause after a failed poll before trying again
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polling loop feeding Telegram updates to the [`Dispatcher`]
pub struct BotActor {
    client: Arc<TelegramClient>,
    dispatcher: Dispatcher,
    offset: i64,
}

impl BotActor {
    pub fn new(client: Arc<TelegramClient>, dispatcher: Dispatcher) -> Self {
        Self {
            client,
            dispatcher,
            offset: 0,
        }
    }

    /// Register the menu, drop stale updates, then poll until `shutdown` resolves
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        info!("BotActor started");

        if let Err(e) = self.client.set_my_commands(&Command::menu()).await {
            warn!("Failed to register command menu: {:#}", e);
        }
        if let Err(e) = self.client.drop_pending_updates().await {
            warn!("Failed to drop pending updates: {:#}", e);
        }

        let client = self.client.clone();
        tokio::pin!(shutdown);
        loop {
            let offset = self.offset;
            tokio::select! {
                _ = &mut shutdown => {
                    info!("BotActor shutting down");
                    break;
                }
                polled = client.get_updates(offset) => match polled {
                    Ok(updates) => {
                        for update in updates {
                            self.offset = self.offset.max(update.update_id + 1);
                            if let Some(message) = update.message {
                                self.dispatcher.handle(message).await;
                            }
                        }
                    }
                    Err(e) => {
                        error!("Failed to fetch updates: {:#}", e);
                        tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    }
                }
            }
        }
    }
}
