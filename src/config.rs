//! Configuration management for Sporldisco.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Variables already present in the process
//! environment take precedence over the file.
//!
//! Spotify endpoints fall back to the public Spotify URLs; the client id has no
//! default and is only required for the authentication flow and token refresh.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    error::Error,
    pipeline::{DEFAULT_JOB_TIMEOUT, DEFAULT_WORKERS, RetryPolicy},
};

pub const APP_DIR: &str = "sporldisco";

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";

/// Loads environment variables from `.env` in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is not an error;
/// an unreadable or malformed one is.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/sporldisco/.env`
/// - macOS: `~/Library/Application Support/sporldisco/.env`
/// - Windows: `%LOCALAPPDATA%/sporldisco/.env`
pub async fn load_env() -> Result<(), Error> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Config(e.to_string()))?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Root of everything Sporldisco keeps on disk.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Address the OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client id registered with the Spotify developer dashboard
/// (`SPOTIFY_API_AUTH_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String, Error> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .map_err(|_| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))
}

/// Callback URL registered for the application (`SPOTIFY_API_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

/// Permissions requested during authorization (`SPOTIFY_API_AUTH_SCOPE`).
pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Tunables of a discography run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Concurrent album track fetches.
    pub workers: usize,
    /// Upper bound for fetching one album's tracks, retries included.
    pub track_timeout: Duration,
    pub retry: RetryPolicy,
    pub search_page_size: u32,
    pub album_page_size: u32,
    pub public: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            track_timeout: DEFAULT_JOB_TIMEOUT,
            retry: RetryPolicy::default(),
            search_page_size: 50,
            album_page_size: 50,
            public: true,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden by `SPORLDISCO_WORKERS`, `SPORLDISCO_TRACK_TIMEOUT_SECS`,
    /// `SPORLDISCO_MAX_ATTEMPTS` and `SPORLDISCO_BASE_DELAY_MS`.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Self::default();

        let workers = parse_var("SPORLDISCO_WORKERS")?.unwrap_or(defaults.workers);
        let track_timeout = parse_var("SPORLDISCO_TRACK_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.track_timeout);
        let max_attempts =
            parse_var("SPORLDISCO_MAX_ATTEMPTS")?.unwrap_or(defaults.retry.max_attempts);
        let base_delay = parse_var("SPORLDISCO_BASE_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.base_delay);

        Ok(Self {
            track_timeout,
            ..defaults
        }
        .with_workers(workers)
        .with_retry(RetryPolicy::new(max_attempts, base_delay)))
    }

    /// Sets the worker count, clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy::new(retry.max_attempts, retry.base_delay);
        self
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, Error> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(None),
    }
}
