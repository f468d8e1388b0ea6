use crate::fetcher::{FetchError, MovieDetail, MovieFetcher};
use std::sync::Arc;
use teloxide::{
    dispatching::{Dispatcher, UpdateFilterExt},
    prelude::*,
    types::{ChatId, InputFile, ParseMode},
    utils::command::BotCommands,
};
use tracing::{debug, info, warn};

/// Telegram rejects photo captions longer than this, counted in UTF-16 units.
const CAPTION_LIMIT: usize = 1024;
const MESSAGE_LIMIT: usize = 4096;

pub const WELCOME: &str = "Welcome! Use /horrormovie to get a random horror movie suggestion.";
pub const QUOTA_REPLY: &str =
    "Sorry, the bot has reached its daily API call limit. Please try again tomorrow.";
pub const FAILURE_REPLY: &str =
    "Sorry, I couldn't find a horror movie right now. Please try again later.";

/* ====== Commands ====== */
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "suggest a random horror movie")]
    HorrorMovie,
    #[command(description = "show this help")]
    Help,
}

pub async fn run(bot: Bot, fetcher: Arc<MovieFetcher>) {
    if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %err, "could not register bot commands");
    }

    let handler = Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let fetcher = fetcher.clone();
            async move { on_command(bot, msg, cmd, &fetcher).await }
        });

    info!("dispatching updates");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn on_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    fetcher: &MovieFetcher,
) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, WELCOME).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::HorrorMovie => {
            match fetcher.fetch_random_horror_movie().await {
                Ok(movie) => send_movie(&bot, msg.chat.id, &movie).await?,
                Err(err) => {
                    bot.send_message(msg.chat.id, error_reply(&err)).await?;
                }
            }
            let usage = fetcher.budget().snapshot().await;
            debug!(calls = usage.count, limit = fetcher.budget().limit(), "OMDb budget");
        }
    }
    Ok(())
}

/* ====== Rendering ====== */

async fn send_movie(bot: &Bot, chat: ChatId, movie: &MovieDetail) -> ResponseResult<()> {
    if let Some(url) = movie.poster_url.as_deref().and_then(|p| reqwest::Url::parse(p).ok()) {
        let sent = bot
            .send_photo(chat, InputFile::url(url))
            .caption(render_movie(movie, CAPTION_LIMIT))
            .parse_mode(ParseMode::Html)
            .await;
        match sent {
            Ok(_) => return Ok(()),
            // Telegram could not fetch the poster; the text alone still answers.
            Err(err) => warn!(error = %err, title = %movie.title, "poster send failed"),
        }
    }
    bot.send_message(chat, render_movie(movie, MESSAGE_LIMIT))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Formats the reply. `limit` bounds the visible text in UTF-16 units, the way
/// Telegram measures it; the plot is shortened before escaping so no entity
/// gets cut in half.
pub fn render_movie(m: &MovieDetail, limit: usize) -> String {
    let released = m.release_date.as_deref().unwrap_or("Unknown");
    let plot = m.plot.as_deref().unwrap_or("No description available.");
    let head = format!("🔪 {}\nRelease Date: {}\n\n", m.title, released)
        .encode_utf16()
        .count();
    let plot = clip(plot, limit.saturating_sub(head));
    format!(
        "🔪 <b>{}</b>\nRelease Date: {}\n\n{}",
        html_escape(&m.title),
        html_escape(released),
        html_escape(&plot)
    )
}

pub fn error_reply(err: &FetchError) -> &'static str {
    match err {
        FetchError::QuotaExceeded { .. } => QUOTA_REPLY,
        FetchError::NoResultsFound { .. } | FetchError::DataSource(_) => FAILURE_REPLY,
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Shortens `s` to at most `max` UTF-16 units, marking the cut with `…`.
fn clip(s: &str, max: usize) -> String {
    if utf16_len(s) <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        if used + ch.len_utf16() > max - 1 {
            break;
        }
        used += ch.len_utf16();
        out.push(ch);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;

    fn movie() -> MovieDetail {
        MovieDetail {
            title: "Nosferatu".to_string(),
            plot: Some("A vampire moves to Wisborg.".to_string()),
            release_date: Some("16 Mar 1922".to_string()),
            poster_url: None,
        }
    }

    #[test]
    fn commands_parse() {
        assert_eq!(Command::parse("/start", "bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/horrormovie", "bot").unwrap(), Command::HorrorMovie);
        assert_eq!(Command::parse("/help", "bot").unwrap(), Command::Help);
        assert!(Command::parse("/comedy", "bot").is_err());
    }

    #[test]
    fn movie_is_rendered_with_title_date_and_plot() {
        assert_eq!(
            render_movie(&movie(), CAPTION_LIMIT),
            "🔪 <b>Nosferatu</b>\nRelease Date: 16 Mar 1922\n\nA vampire moves to Wisborg."
        );
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let m = MovieDetail { plot: None, release_date: None, ..movie() };
        let text = render_movie(&m, CAPTION_LIMIT);
        assert!(text.contains("Release Date: Unknown"));
        assert!(text.ends_with("No description available."));
    }

    #[test]
    fn markup_in_data_is_escaped() {
        let m = MovieDetail { title: "Tom & Jerry <3".to_string(), ..movie() };
        assert!(render_movie(&m, CAPTION_LIMIT).starts_with("🔪 <b>Tom &amp; Jerry &lt;3</b>"));
    }

    #[test]
    fn quota_gets_its_own_reply() {
        assert_eq!(error_reply(&FetchError::QuotaExceeded { limit: 1000 }), QUOTA_REPLY);
        assert_eq!(error_reply(&FetchError::NoResultsFound { year: 1999 }), FAILURE_REPLY);
        assert_eq!(
            error_reply(&FetchError::DataSource(SourceError::Api("Daily API call limit".into()))),
            FAILURE_REPLY
        );
    }

    #[test]
    fn long_plots_are_clipped_to_the_caption_limit() {
        let m = MovieDetail { plot: Some("&".repeat(3000)), ..movie() };
        let text = render_movie(&m, CAPTION_LIMIT);
        assert!(text.ends_with("&amp;…"));
        let visible = text.replace("<b>", "").replace("</b>", "").replace("&amp;", "&");
        assert_eq!(utf16_len(&visible), CAPTION_LIMIT);
    }

    #[test]
    fn astral_characters_count_double_against_the_limit() {
        let m = MovieDetail { plot: Some("👻".repeat(1000)), ..movie() };
        let text = render_movie(&m, CAPTION_LIMIT);
        let visible = text.replace("<b>", "").replace("</b>", "");
        assert!(utf16_len(&visible) <= CAPTION_LIMIT);
        assert!(utf16_len(&visible) >= CAPTION_LIMIT - 1);
        assert!(visible.ends_with("👻…"));
    }

    #[test]
    fn clip_keeps_short_text() {
        assert_eq!(clip("short", CAPTION_LIMIT), "short");
        assert_eq!(clip("short", 0), "");
        assert_eq!(clip("shorter", 4), "sho…");
        assert_eq!(clip("👻👻👻", 4), "👻…");
    }
}
