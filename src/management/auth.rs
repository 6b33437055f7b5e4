use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{config, error::RemoteError, spotify, types::Token};

/// Seconds before expiry at which a token is already treated as stale.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Supplies bearer tokens to the catalog client.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, RemoteError>;
}

/// Persisted OAuth token with transparent refresh.
///
/// Concurrent callers that find the token stale share a single refresh: the
/// first one through `refresh_gate` performs the grant, the others wait and
/// pick up its result.
pub struct TokenManager {
    token: Mutex<Token>,
    refresh_gate: Mutex<()>,
    token_url: String,
    client_id: Option<String>,
    path: Option<PathBuf>,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token: Mutex::new(token),
            refresh_gate: Mutex::new(()),
            token_url: config::spotify_apitoken_url(),
            client_id: None,
            path: Some(Self::token_path()),
        }
    }

    /// Refreshes against `token_url` as `client_id` instead of the
    /// configured Spotify endpoint.
    pub fn with_token_endpoint(
        mut self,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        self.token_url = token_url.into();
        self.client_id = Some(client_id.into());
        self
    }

    /// Keeps refreshed tokens in memory only.
    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self
    }

    pub async fn load() -> Result<Self, String> {
        let content = async_fs::read_to_string(Self::token_path())
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self::new(token))
    }

    pub async fn persist(&self) -> Result<(), String> {
        let token = self.token.lock().await.clone();
        self.write(&token).await
    }

    async fn write(&self, token: &Token) -> Result<(), String> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    fn token_path() -> PathBuf {
        config::data_dir().join("cache/token.json")
    }

    async fn current(&self) -> Current {
        let token = self.token.lock().await;
        if is_expired(&token, Utc::now().timestamp() as u64) {
            Current::Stale(token.refresh_token.clone())
        } else {
            Current::Fresh(token.access_token.clone())
        }
    }

    async fn refresh(&self, stale: String) -> Result<String, RemoteError> {
        let client_id = match &self.client_id {
            Some(id) => id.clone(),
            None => config::spotify_client_id().map_err(|e| {
                tracing::warn!(error = %e, "cannot refresh token");
                RemoteError::Unauthenticated
            })?,
        };

        let mut refreshed = spotify::auth::refresh_token(&self.token_url, &client_id, &stale)
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token refresh failed");
                RemoteError::Unauthenticated
            })?;
        // Spotify does not always rotate the refresh token.
        if refreshed.refresh_token.is_empty() {
            refreshed.refresh_token = stale;
        }

        if let Err(e) = self.write(&refreshed).await {
            tracing::warn!(error = %e, "could not persist refreshed token");
        }
        tracing::debug!("access token refreshed");

        let access_token = refreshed.access_token.clone();
        *self.token.lock().await = refreshed;
        Ok(access_token)
    }
}

enum Current {
    Fresh(String),
    /// Carries the refresh token.
    Stale(String),
}

pub fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at + token.expires_in
}

#[async_trait]
impl SessionProvider for TokenManager {
    async fn access_token(&self) -> Result<String, RemoteError> {
        if let Current::Fresh(access_token) = self.current().await {
            return Ok(access_token);
        }

        let _gate = self.refresh_gate.lock().await;
        // whoever held the gate before may already have refreshed
        match self.current().await {
            Current::Fresh(access_token) => Ok(access_token),
            Current::Stale(refresh_token) => self.refresh(refresh_token).await,
        }
    }
}
