// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pipeline configuration loaded from environment variables.
//!
//! The configuration is built once at startup and passed by reference into
//! each stage. Building it has no side effects; call
//! [`Config::ensure_dirs`] to create the on-disk layout.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_TOKEN_URL: &str = "https://www.strava.com/oauth/token";
const DEFAULT_PER_PAGE: u32 = 50;
const DEFAULT_MAX_PAGES: u32 = 10;
const DEFAULT_PAGE_DELAY_MS: u64 = 200;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Layout ---
    /// Root for `data/` and `site/`
    pub base_dir: PathBuf,
    /// Raw batches (append-only)
    pub bronze_dir: PathBuf,
    /// Canonical typed runs
    pub silver_dir: PathBuf,
    /// Canonical weekly aggregate
    pub gold_dir: PathBuf,
    /// Static site root (index.html)
    pub site_dir: PathBuf,
    /// JSON documents consumed by the site
    pub assets_dir: PathBuf,

    // --- Strava ---
    pub strava_api_url: String,
    pub strava_token_url: String,
    pub strava_client_id: Option<String>,
    pub strava_client_secret: Option<String>,
    pub strava_refresh_token: Option<String>,

    // --- Fetch behavior ---
    /// Only fetch activities after this Unix timestamp
    pub after_epoch: Option<i64>,
    pub per_page: u32,
    pub max_pages: u32,
    /// Pause between page requests
    pub page_delay: Duration,
}

/// OAuth credentials needed to mint an access token.
#[derive(Debug, Clone)]
pub struct StravaCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Config {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_dir = lookup("RUN_PROGRESS_HOME")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = Self::with_base_dir(base_dir);

        if let Some(url) = lookup("STRAVA_API_URL") {
            config.strava_api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("STRAVA_TOKEN_URL") {
            config.strava_token_url = url;
        }

        config.strava_client_id = secret(&lookup, "STRAVA_CLIENT_ID");
        config.strava_client_secret = secret(&lookup, "STRAVA_CLIENT_SECRET");
        config.strava_refresh_token = secret(&lookup, "STRAVA_REFRESH_TOKEN");

        config.after_epoch = lookup("STRAVA_AFTER").and_then(|v| v.trim().parse().ok());
        config.per_page = lookup("STRAVA_PER_PAGE")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PER_PAGE);
        config.max_pages = lookup("STRAVA_MAX_PAGES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_PAGES);
        config.page_delay = Duration::from_millis(
            lookup("STRAVA_PAGE_DELAY_MS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PAGE_DELAY_MS),
        );

        config
    }

    /// Default configuration rooted at `base_dir`, without credentials.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let data_dir = base_dir.join("data");
        let site_dir = base_dir.join("site");

        Self {
            bronze_dir: data_dir.join("bronze"),
            silver_dir: data_dir.join("silver"),
            gold_dir: data_dir.join("gold"),
            assets_dir: site_dir.join("assets"),
            site_dir,
            base_dir,
            strava_api_url: DEFAULT_API_URL.to_string(),
            strava_token_url: DEFAULT_TOKEN_URL.to_string(),
            strava_client_id: None,
            strava_client_secret: None,
            strava_refresh_token: None,
            after_epoch: None,
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
        }
    }

    /// Create every pipeline directory.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [
            &self.bronze_dir,
            &self.silver_dir,
            &self.gold_dir,
            &self.site_dir,
            &self.assets_dir,
        ] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Canonical silver dataset location.
    pub fn silver_path(&self) -> PathBuf {
        self.silver_dir.join("runs.parquet")
    }

    /// Canonical gold dataset location.
    pub fn gold_path(&self) -> PathBuf {
        self.gold_dir.join("weekly_progress.parquet")
    }

    pub fn weekly_json_path(&self) -> PathBuf {
        self.assets_dir.join("progression_weekly.json")
    }

    pub fn activities_json_path(&self) -> PathBuf {
        self.assets_dir.join("activities.json")
    }

    pub fn index_html_path(&self) -> PathBuf {
        self.site_dir.join("index.html")
    }

    /// Strava credentials, or the first missing variable.
    pub fn credentials(&self) -> Result<StravaCredentials, ConfigError> {
        Ok(StravaCredentials {
            client_id: self
                .strava_client_id
                .clone()
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            client_secret: self
                .strava_client_secret
                .clone()
                .ok_or(ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            refresh_token: self
                .strava_refresh_token
                .clone()
                .ok_or(ConfigError::Missing("STRAVA_REFRESH_TOKEN"))?,
        })
    }
}

fn secret<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_vars(|_| None);

        assert_eq!(config.base_dir, PathBuf::from("."));
        assert_eq!(config.bronze_dir, PathBuf::from("./data/bronze"));
        assert_eq!(config.assets_dir, PathBuf::from("./site/assets"));
        assert_eq!(config.per_page, 50);
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.page_delay, Duration::from_millis(200));
        assert!(config.after_epoch.is_none());
    }

    #[test]
    fn test_config_from_vars() {
        let config = Config::from_vars(lookup_from(&[
            ("RUN_PROGRESS_HOME", "/tmp/runs"),
            ("STRAVA_CLIENT_ID", "test_id"),
            ("STRAVA_CLIENT_SECRET", " test_secret \n"),
            ("STRAVA_REFRESH_TOKEN", "test_refresh"),
            ("STRAVA_AFTER", "1700000000"),
            ("STRAVA_PER_PAGE", "not-a-number"),
            ("STRAVA_API_URL", "http://127.0.0.1:9999/api/"),
        ]));

        assert_eq!(config.silver_path(), PathBuf::from("/tmp/runs/data/silver/runs.parquet"));
        assert_eq!(config.after_epoch, Some(1_700_000_000));
        assert_eq!(config.per_page, 50);
        assert_eq!(config.strava_api_url, "http://127.0.0.1:9999/api");

        let creds = config.credentials().expect("credentials should resolve");
        assert_eq!(creds.client_id, "test_id");
        assert_eq!(creds.client_secret, "test_secret");
        assert_eq!(creds.refresh_token, "test_refresh");
    }

    #[test]
    fn test_missing_credentials_names_variable() {
        let config = Config::from_vars(lookup_from(&[
            ("STRAVA_CLIENT_ID", "test_id"),
            ("STRAVA_CLIENT_SECRET", "   "),
        ]));

        let err = config.credentials().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("STRAVA_CLIENT_SECRET")));
    }

    #[test]
    fn test_ensure_dirs_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::with_base_dir(tmp.path());

        config.ensure_dirs().unwrap();

        assert!(config.bronze_dir.is_dir());
        assert!(config.silver_dir.is_dir());
        assert!(config.gold_dir.is_dir());
        assert!(config.assets_dir.is_dir());
    }
}
