use std::{path::PathBuf, time::Duration};

use anyhow::Context;

const DEFAULT_DATABASE_URL: &str = "sqlite://abholi.db";
const DEFAULT_USER_AGENT: &str = "abholi/0.1";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_FILE: &str = "abholi.log";
const DEFAULT_LOG_FILTER: &str = "abholi=info,sqlx=warn";

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub database_url: String,
    pub geocoder_url: String,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub log_file: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    pub(crate) fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let http_timeout_secs = match read("ABHOLI_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("ABHOLI_HTTP_TIMEOUT_SECS must be whole seconds, got {raw:?}")
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: read("ABHOLI_DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            geocoder_url: read("ABHOLI_GEOCODER_URL")
                .unwrap_or_else(|| abholi_geocoder_nominatim::DEFAULT_BASE_URL.into()),
            user_agent: read("ABHOLI_USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
            http_timeout: Duration::from_secs(http_timeout_secs),
            log_file: read("ABHOLI_LOG_FILE")
                .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from),
            log_filter: read("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("defaults are valid");

        assert_eq!(config.database_url, "sqlite://abholi.db");
        assert_eq!(config.geocoder_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.user_agent, "abholi/0.1");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.log_file, PathBuf::from("abholi.log"));
        assert_eq!(config.log_filter, "abholi=info,sqlx=warn");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("ABHOLI_DATABASE_URL", "sqlite:///var/lib/abholi/data.db"),
            ("ABHOLI_GEOCODER_URL", "http://localhost:8080"),
            ("ABHOLI_HTTP_TIMEOUT_SECS", " 3 "),
            ("ABHOLI_LOG_FILE", "/tmp/abholi-test.log"),
            ("RUST_LOG", "debug"),
        ])
        .expect("overrides are valid");

        assert_eq!(config.database_url, "sqlite:///var/lib/abholi/data.db");
        assert_eq!(config.geocoder_url, "http://localhost:8080");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.log_file, PathBuf::from("/tmp/abholi-test.log"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.user_agent, "abholi/0.1");
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("ABHOLI_DATABASE_URL", "  ")]).expect("blank is unset");
        assert_eq!(config.database_url, "sqlite://abholi.db");
    }

    #[test]
    fn unparseable_timeout_is_rejected() {
        let err = config_from(&[("ABHOLI_HTTP_TIMEOUT_SECS", "ten")])
            .expect_err("timeout must be numeric");
        assert!(err.to_string().contains("ABHOLI_HTTP_TIMEOUT_SECS"));
    }
}
