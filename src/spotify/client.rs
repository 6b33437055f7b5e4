use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{HeaderMap, RETRY_AFTER},
};
use serde::de::DeserializeOwned;

use crate::{
    catalog::{Catalog, MAX_APPEND_ITEMS},
    config,
    error::RemoteError,
    management::SessionProvider,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, Album, AlbumType, Artist,
        CreatePlaylistRequest, CreatePlaylistResponse, CurrentUserResponse, Cursor, Page,
        Playlist, SearchArtistsResponse, TrackId, TrackItem, UserId,
    },
};

/// Page size for album track listings; 50 is the Spotify maximum.
const TRACK_PAGE_SIZE: u32 = 50;

/// [`Catalog`] implementation backed by the Spotify Web API.
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl SpotifyClient {
    pub fn new(session: Arc<dyn SessionProvider>) -> Self {
        Self::with_base_url(config::spotify_apiurl(), session)
    }

    pub fn with_base_url(base_url: impl Into<String>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let token = self.session.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(from_reqwest)?;
        let response = check_status(response).await?;
        response.json::<T>().await.map_err(from_reqwest)
    }

    async fn artists_page(&self, request: RequestBuilder) -> Result<Page<Artist>, RemoteError> {
        let response: SearchArtistsResponse = self.send_json(request).await?;
        Ok(response.artists.unwrap_or(Page {
            items: None,
            next: None,
            total: None,
        }))
    }

    async fn tracks_page(&self, request: RequestBuilder) -> Result<Page<TrackId>, RemoteError> {
        let page: Page<TrackItem> = self.send_json(request).await?;
        Ok(page.map(|item| TrackId(item.uri)))
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Page<Artist>, RemoteError> {
        let q = format!("artist:{}", query);
        let limit = limit.to_string();
        let request = self.http.get(self.url("/search")).query(&[
            ("q", q.as_str()),
            ("type", "artist"),
            ("limit", limit.as_str()),
        ]);
        self.artists_page(request).await
    }

    async fn list_albums(
        &self,
        artist_id: &str,
        album_type: AlbumType,
        limit: u32,
    ) -> Result<Page<Album>, RemoteError> {
        let request = self
            .http
            .get(self.url(&format!("/artists/{}/albums", artist_id)))
            .query(&[
                ("include_groups", album_type.to_string()),
                ("limit", limit.to_string()),
            ]);
        self.send_json(request).await
    }

    async fn list_tracks(&self, album_id: &str) -> Result<Page<TrackId>, RemoteError> {
        let request = self
            .http
            .get(self.url(&format!("/albums/{}/tracks", album_id)))
            .query(&[("limit", TRACK_PAGE_SIZE)]);
        self.tracks_page(request).await
    }

    async fn next_artists(&self, cursor: &Cursor) -> Result<Page<Artist>, RemoteError> {
        self.artists_page(self.http.get(&cursor.0)).await
    }

    async fn next_albums(&self, cursor: &Cursor) -> Result<Page<Album>, RemoteError> {
        self.send_json(self.http.get(&cursor.0)).await
    }

    async fn next_tracks(&self, cursor: &Cursor) -> Result<Page<TrackId>, RemoteError> {
        self.tracks_page(self.http.get(&cursor.0)).await
    }

    async fn current_user(&self) -> Result<Option<UserId>, RemoteError> {
        let response: CurrentUserResponse = self.send_json(self.http.get(self.url("/me"))).await?;
        Ok(response.id.map(UserId))
    }

    async fn create_playlist(
        &self,
        user_id: &UserId,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError> {
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            description: "All albums in release order. Created by sporldisco.".to_string(),
            public,
            collaborative: false,
        };
        let request = self
            .http
            .post(self.url(&format!("/users/{}/playlists", user_id)))
            .json(&body);

        let response: CreatePlaylistResponse = self.send_json(request).await?;
        Ok(Playlist {
            id: response.id.unwrap_or_default(),
            name: response.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn append_items(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<(), RemoteError> {
        if tracks.len() > MAX_APPEND_ITEMS {
            return Err(RemoteError::Rejected(format!(
                "{} tracks exceed the limit of {} per call",
                tracks.len(),
                MAX_APPEND_ITEMS
            )));
        }

        let body = AddTrackToPlaylistRequest {
            uris: tracks.iter().map(|t| t.0.clone()).collect(),
        };
        let request = self
            .http
            .post(self.url(&format!("/playlists/{}/tracks", playlist_id)))
            .json(&body);

        let _: AddTrackToPlaylistResponse = self.send_json(request).await?;
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, retry_after, &body))
}

/// Maps a non-success status onto the catalog failure signals.
pub fn classify_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> RemoteError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body.trim())
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited { retry_after },
        StatusCode::UNAUTHORIZED => RemoteError::Unauthenticated,
        StatusCode::REQUEST_TIMEOUT => RemoteError::Fault(detail),
        s if s.is_server_error() => RemoteError::Fault(detail),
        _ => RemoteError::Rejected(detail),
    }
}

/// Reads a `Retry-After` header given in seconds.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn from_reqwest(e: reqwest::Error) -> RemoteError {
    if e.is_decode() {
        RemoteError::Malformed(e.to_string())
    } else {
        RemoteError::Fault(e.to_string())
    }
}
