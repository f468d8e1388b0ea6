use teloxide::types::ChatId;
use thiserror::Error;

pub const DEFAULT_MAX_API_CALLS: u32 = 1000;
pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is missing")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub omdb_api_key: String,
    pub omdb_base_url: String,
    /// Chat that receives diagnostic messages; `None` disables them.
    pub admin_chat: Option<ChatId>,
    pub max_api_calls: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .or_else(|| get("TELOXIDE_TOKEN"))
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let omdb_api_key = get("OMDB_API_KEY").ok_or(ConfigError::Missing("OMDB_API_KEY"))?;
        let omdb_base_url =
            get("OMDB_BASE_URL").unwrap_or_else(|| DEFAULT_OMDB_BASE_URL.to_string());

        let admin_chat = match get("ADMIN_USER_ID") {
            Some(raw) => Some(ChatId(raw.parse::<i64>().map_err(|_| ConfigError::Invalid {
                name: "ADMIN_USER_ID",
                value: raw.clone(),
            })?)),
            None => None,
        };

        let max_api_calls = match get("MAX_API_CALLS") {
            Some(raw) => raw.parse::<u32>().map_err(|_| ConfigError::Invalid {
                name: "MAX_API_CALLS",
                value: raw.clone(),
            })?,
            None => DEFAULT_MAX_API_CALLS,
        };

        Ok(Self { bot_token, omdb_api_key, omdb_base_url, admin_chat, max_api_calls })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("OMDB_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(cfg.bot_token, "123:abc");
        assert_eq!(cfg.omdb_api_key, "key");
        assert_eq!(cfg.omdb_base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(cfg.admin_chat, None);
        assert_eq!(cfg.max_api_calls, 1000);
    }

    #[test]
    fn teloxide_token_is_accepted_as_fallback() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELOXIDE_TOKEN", "456:def"),
            ("OMDB_API_KEY", "key"),
        ]))
        .unwrap();
        assert_eq!(cfg.bot_token, "456:def");
    }

    #[test]
    fn admin_and_limit_are_parsed() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("OMDB_API_KEY", "k"),
            ("ADMIN_USER_ID", "-100200"),
            ("MAX_API_CALLS", "50"),
        ]))
        .unwrap();
        assert_eq!(cfg.admin_chat, Some(ChatId(-100200)));
        assert_eq!(cfg.max_api_calls, 50);
    }

    #[test]
    fn empty_admin_disables_notifications() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("OMDB_API_KEY", "k"),
            ("ADMIN_USER_ID", "  "),
        ]))
        .unwrap();
        assert_eq!(cfg.admin_chat, None);
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("OMDB_API_KEY"));
    }

    #[test]
    fn garbage_limit_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("OMDB_API_KEY", "k"),
            ("MAX_API_CALLS", "lots"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MAX_API_CALLS", .. }));
    }
}
