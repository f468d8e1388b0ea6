use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Destination for diagnostic messages meant for the bot operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> anyhow::Result<()>;
}

/// Sends diagnostics to a fixed Telegram chat. Without one it drops them.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    operator: Option<ChatId>,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, operator: Option<ChatId>) -> Self {
        Self { bot, operator }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> anyhow::Result<()> {
        let Some(chat) = self.operator else {
            return Ok(());
        };
        self.bot.send_message(chat, text).await?;
        Ok(())
    }
}
