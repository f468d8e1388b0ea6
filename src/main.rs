mod budget;
mod config;
mod fetcher;
mod notify;
mod omdb;
mod source;
mod tg;

use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::fetcher::{Clock, MovieFetcher, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("horror_movie_bot=info,teloxide=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = config::Config::from_env()?;
    if cfg.admin_chat.is_none() {
        info!("ADMIN_USER_ID not set, operator notifications disabled");
    }

    let bot = Bot::new(&cfg.bot_token);
    let omdb = omdb::OmdbClient::new(cfg.omdb_api_key.clone(), cfg.omdb_base_url.clone())?;
    let notifier = notify::TelegramNotifier::new(bot.clone(), cfg.admin_chat);
    let clock = SystemClock;
    let budget = budget::SharedBudget::new(clock.today(), cfg.max_api_calls);
    info!(limit = cfg.max_api_calls, "daily OMDb call budget");

    let fetcher = MovieFetcher::new(Arc::new(omdb), Arc::new(notifier), Arc::new(clock), budget);
    tg::run(bot, Arc::new(fetcher)).await;
    Ok(())
}
