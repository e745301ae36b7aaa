//! tunecourier - random picks from your YouTube playlists, delivered to Telegram
//!
//! Every few minutes the bot picks a random playlist, a random video from it,
//! downloads it with yt-dlp as MP3 or MP4 and sends it to a single Telegram
//! user, who controls everything through bot commands.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tunecourier::bot::{BotActor, CommandHandlers, Dispatcher};
use tunecourier::extractor::{Extractor, YtDlpExtractor};
use tunecourier::pipeline::DeliveryPipeline;
use tunecourier::scheduler::Scheduler;
use tunecourier::telegram::{Messenger, TelegramClient};
use tunecourier::utils::{self, ConfigStore};

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Bot token from @BotFather
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Telegram user id allowed to control the bot and receive files
    #[arg(long, env = "TELEGRAM_USER_ID")]
    user_id: Option<i64>,

    /// Settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log file (appended to)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory for per-download scratch folders
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Explicit yt-dlp binary
    #[arg(long)]
    ytdlp: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().unwrap_or_else(utils::get_log_path);
    utils::init_logging(&log_file)?;

    let (token, user_id) = match (args.token.clone(), args.user_id) {
        (Some(token), Some(user_id)) if !token.trim().is_empty() => (token, user_id),
        (token, _) => {
            if token.map_or(true, |t| t.trim().is_empty()) {
                eprintln!("❌ Error: no bot token set");
                eprintln!("1. Create a bot with @BotFather on Telegram");
                eprintln!("2. Pass it with --token or TELEGRAM_BOT_TOKEN");
            } else {
                eprintln!("❌ Error: no user id set");
                eprintln!("1. Message @userinfobot on Telegram to get your user ID");
                eprintln!("2. Pass it with --user-id or TELEGRAM_USER_ID");
            }
            bail!("missing Telegram credentials");
        }
    };

    let extractor: Arc<dyn Extractor> = match args.ytdlp {
        Some(path) => Arc::new(YtDlpExtractor::with_path(path)),
        None => match YtDlpExtractor::new() {
            Ok(extractor) => Arc::new(extractor),
            Err(e) => {
                // Keep running; every extraction will fail and be logged
                warn!("{}. Playlists and downloads will fail until it is installed", e);
                Arc::new(YtDlpExtractor::with_path("yt-dlp"))
            }
        },
    };

    let config_path = args.config.unwrap_or_else(utils::get_settings_path);
    let config = Arc::new(ConfigStore::load(&config_path).await);
    info!("Settings loaded from {}", config.path().display());

    let client = Arc::new(TelegramClient::new(&token).context("Failed to create Telegram client")?);
    let messenger: Arc<dyn Messenger> = client.clone();

    let scratch_root = args.scratch_dir.unwrap_or_else(utils::get_scratch_root);
    let pipeline = Arc::new(DeliveryPipeline::new(
        config.clone(),
        extractor,
        messenger.clone(),
        user_id,
        scratch_root,
    ));

    let scheduler = Arc::new(Scheduler::new(pipeline.clone()));
    scheduler.reconfigure(&config.snapshot().await).await;

    let handlers = CommandHandlers::new(config.clone(), scheduler.clone(), pipeline, messenger);
    let dispatcher = Dispatcher::new(handlers, user_id);

    info!("🎵 Music Bot started successfully!");
    BotActor::new(client, dispatcher)
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    scheduler.clear().await;
    info!("Bot stopped by user");
    Ok(())
}
