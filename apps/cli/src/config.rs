use std::{path::PathBuf, str::FromStr, time::Duration};

use balances_core::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_COOKIE_TOKEN, DEFAULT_COOKIE_USERDATA, DEFAULT_CURRENCY,
    DEFAULT_LOCALE, DEFAULT_PAGE_SIZE,
};

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub default_page_size: u32,
    pub default_locale: String,
    pub default_currency: String,
    pub cookie_token: String,
    pub cookie_user_data: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub ready_timeout: Duration,
}

impl Config {
    /// Reads `BALANCES_*` variables. Call after `.env` has been loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |name: &str, default: &str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value.trim().to_string(),
            _ => default.to_string(),
        };
        let timeout_ms = |name: &str, default: u64| {
            Duration::from_millis(parse_or(name, lookup(name), default))
        };

        let default_page_size = match parse_or(
            "BALANCES_DEFAULT_PAGE_SIZE",
            lookup("BALANCES_DEFAULT_PAGE_SIZE"),
            DEFAULT_PAGE_SIZE,
        ) {
            0 => {
                tracing::warn!("BALANCES_DEFAULT_PAGE_SIZE must be positive; using {DEFAULT_PAGE_SIZE}");
                DEFAULT_PAGE_SIZE
            }
            size => size,
        };

        Self {
            api_base_url: text("BALANCES_API_BASE_URL", DEFAULT_API_BASE_URL),
            default_page_size,
            default_locale: text("BALANCES_DEFAULT_LOCALE", DEFAULT_LOCALE),
            default_currency: text("BALANCES_DEFAULT_CURRENCY", DEFAULT_CURRENCY),
            cookie_token: text("BALANCES_COOKIE_TOKEN", DEFAULT_COOKIE_TOKEN),
            cookie_user_data: text("BALANCES_COOKIE_USERDATA", DEFAULT_COOKIE_USERDATA),
            session_file: PathBuf::from(text("BALANCES_SESSION_FILE", "./balances-session.json")),
            request_timeout: timeout_ms("BALANCES_REQUEST_TIMEOUT_MS", 30_000),
            ready_timeout: timeout_ms("BALANCES_READY_TIMEOUT_MS", 10_000),
        }
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!("Invalid {name} value '{raw}'; using {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config(&[]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.default_locale, "en-US");
        assert_eq!(config.cookie_token, "token");
        assert_eq!(config.cookie_user_data, "userData");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.ready_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_reads_overrides() {
        let config = config(&[
            ("BALANCES_API_BASE_URL", "https://api.example.com/"),
            ("BALANCES_DEFAULT_PAGE_SIZE", "25"),
            ("BALANCES_SESSION_FILE", "/tmp/s.json"),
            ("BALANCES_READY_TIMEOUT_MS", "500"),
        ]);
        assert_eq!(config.api_base_url, "https://api.example.com/");
        assert_eq!(config.default_page_size, 25);
        assert_eq!(config.session_file, PathBuf::from("/tmp/s.json"));
        assert_eq!(config.ready_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[
            ("BALANCES_DEFAULT_PAGE_SIZE", "0"),
            ("BALANCES_REQUEST_TIMEOUT_MS", "soon"),
            ("BALANCES_DEFAULT_LOCALE", "  "),
        ]);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.default_locale, "en-US");
    }
}
