use tokio::sync::OnceCell;

use crate::{
    catalog::{CatalogHandle, MAX_APPEND_ITEMS},
    error::{Error, RemoteError},
    observe::{Event, ObserverHandle},
    pipeline::ResilientCaller,
    types::{Playlist, TrackId, UserId},
};

/// Write side of the pipeline: playlist creation and chunked appends.
pub struct PlaylistWriter {
    catalog: CatalogHandle,
    caller: ResilientCaller,
    observer: ObserverHandle,
    user: OnceCell<UserId>,
}

impl PlaylistWriter {
    pub fn new(catalog: CatalogHandle, caller: ResilientCaller, observer: ObserverHandle) -> Self {
        Self {
            catalog,
            caller,
            observer,
            user: OnceCell::new(),
        }
    }

    /// The acting user's id, fetched on first use and remembered afterwards.
    pub async fn ensure_user(&self) -> Result<UserId, Error> {
        let user = self.user.get_or_try_init(|| self.resolve_user()).await?;
        Ok(user.clone())
    }

    async fn resolve_user(&self) -> Result<UserId, Error> {
        let user = self
            .caller
            .call("current_user", || self.catalog.current_user())
            .await
            .map_err(|e| match e.remote() {
                RemoteError::Malformed(reason) => Error::UserResolution(reason.clone()),
                _ => Error::Remote(e),
            })?;

        match user {
            Some(user) if !user.0.trim().is_empty() => Ok(user),
            _ => Err(Error::UserResolution(
                "the service returned no user id".to_string(),
            )),
        }
    }

    pub async fn create(&self, name: &str, public: bool) -> Result<Playlist, Error> {
        let user = self.ensure_user().await?;

        let playlist = self
            .caller
            .call("create_playlist", || {
                self.catalog.create_playlist(&user, name, public)
            })
            .await
            .map_err(|e| match e.remote() {
                RemoteError::Malformed(reason) => Error::PlaylistCreation(reason.clone()),
                _ => Error::Remote(e),
            })?;

        if playlist.id.trim().is_empty() {
            return Err(Error::PlaylistCreation(
                "the response carried no playlist id".to_string(),
            ));
        }

        self.observer.emit(&Event::PlaylistCreated {
            id: playlist.id.clone(),
            name: playlist.name.clone(),
        });
        Ok(playlist)
    }

    /// Appends `tracks` in order, one call per chunk of [`MAX_APPEND_ITEMS`],
    /// and returns the number of calls made.
    ///
    /// Chunks go out strictly one after another. When a chunk fails, the ones
    /// before it stay in the playlist. A chunk whose response got lost after
    /// the service applied it is sent again and shows up twice.
    pub async fn append(&self, playlist_id: &str, tracks: &[TrackId]) -> Result<usize, Error> {
        if tracks.is_empty() {
            self.observer.emit(&Event::NothingToAppend);
            return Ok(0);
        }

        let mut calls = 0;
        for (index, chunk) in tracks.chunks(MAX_APPEND_ITEMS).enumerate() {
            self.caller
                .call("append_items", || {
                    self.catalog.append_items(playlist_id, chunk)
                })
                .await
                .map_err(|source| Error::PlaylistAppend {
                    chunk: index,
                    source,
                })?;

            self.observer.emit(&Event::ChunkAppended {
                index,
                size: chunk.len(),
            });
            calls += 1;
        }

        Ok(calls)
    }
}
