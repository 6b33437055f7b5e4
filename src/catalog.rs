//! Capability interface of the remote music catalog.
//!
//! The pipeline only ever talks to the catalog through [`Catalog`]; the Spotify
//! adapter in [`crate::spotify`] is one implementation, the integration tests
//! provide a scripted in-memory one.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::RemoteError,
    types::{Album, AlbumType, Artist, Cursor, Page, Playlist, TrackId, UserId},
};

/// Hard per-call limit of `append_items`.
pub const MAX_APPEND_ITEMS: usize = 100;

pub type CatalogHandle = Arc<dyn Catalog>;

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Page<Artist>, RemoteError>;

    async fn list_albums(
        &self,
        artist_id: &str,
        album_type: AlbumType,
        limit: u32,
    ) -> Result<Page<Album>, RemoteError>;

    async fn list_tracks(&self, album_id: &str) -> Result<Page<TrackId>, RemoteError>;

    async fn next_artists(&self, cursor: &Cursor) -> Result<Page<Artist>, RemoteError>;

    async fn next_albums(&self, cursor: &Cursor) -> Result<Page<Album>, RemoteError>;

    async fn next_tracks(&self, cursor: &Cursor) -> Result<Page<TrackId>, RemoteError>;

    /// Id of the account the session belongs to; `None` when the service
    /// answered without one.
    async fn current_user(&self) -> Result<Option<UserId>, RemoteError>;

    async fn create_playlist(
        &self,
        user_id: &UserId,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError>;

    /// Appends at most [`MAX_APPEND_ITEMS`] tracks to the end of a playlist.
    async fn append_items(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<(), RemoteError>;
}
