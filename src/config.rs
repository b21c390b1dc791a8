use std::{env, str::FromStr, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_BASE_URL: &str = "http://127.0.0.1:3010/api";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_DEADLINE_SECS: u64 = 30;
const DEFAULT_MEAL_FETCH_CONCURRENCY: usize = 16;
const DEFAULT_HISTORY_MAX_DAYS: i64 = 366;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub upstream_base_url: String,
    /// Raw `identity:apiKey` / `identity:secret:apiKey` list.
    pub user_credentials: String,
    pub upstream_timeout: Duration,
    pub request_deadline: Duration,
    pub meal_fetch_concurrency: usize,
    pub history_max_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let upstream_base_url = lookup("UPSTREAM_BASE_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        Self {
            port: parsed(&lookup, "PORT", DEFAULT_PORT),
            upstream_base_url: upstream_base_url.trim_end_matches('/').to_string(),
            user_credentials: lookup("USER_CREDENTIALS").unwrap_or_default(),
            upstream_timeout: Duration::from_secs(parsed(
                &lookup,
                "UPSTREAM_TIMEOUT_SECS",
                DEFAULT_UPSTREAM_TIMEOUT_SECS,
            )),
            request_deadline: Duration::from_secs(parsed(
                &lookup,
                "REQUEST_DEADLINE_SECS",
                DEFAULT_REQUEST_DEADLINE_SECS,
            )),
            meal_fetch_concurrency: parsed(
                &lookup,
                "MEAL_FETCH_CONCURRENCY",
                DEFAULT_MEAL_FETCH_CONCURRENCY,
            )
            .max(1),
            history_max_days: parsed(&lookup, "HISTORY_MAX_DAYS", DEFAULT_HISTORY_MAX_DAYS).max(1),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    lookup(name)
        .and_then(|value| value.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_base_url, "http://127.0.0.1:3010/api");
        assert!(config.user_credentials.is_empty());
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.request_deadline, Duration::from_secs(30));
        assert_eq!(config.meal_fetch_concurrency, 16);
        assert_eq!(config.history_max_days, 366);
    }

    #[test]
    fn reads_values_and_ignores_garbage() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("UPSTREAM_BASE_URL", "https://fit.example.com/api/"),
            ("UPSTREAM_TIMEOUT_SECS", "soon"),
            ("MEAL_FETCH_CONCURRENCY", "0"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.upstream_base_url, "https://fit.example.com/api");
        assert_eq!(config.upstream_timeout, Duration::from_secs(10));
        assert_eq!(config.meal_fetch_concurrency, 1);
    }
}
