use futures::FutureExt;

use crate::{
    catalog::CatalogHandle,
    error::CallError,
    observe::{Event, ObserverHandle},
    pipeline::{Paginator, ResilientCaller},
    types::{Album, AlbumType, Artist, TrackId},
    utils,
};

/// Read side of the pipeline: artist search, discography and track listings.
pub struct Retriever {
    catalog: CatalogHandle,
    caller: ResilientCaller,
    observer: ObserverHandle,
    search_page_size: u32,
    album_page_size: u32,
}

impl Retriever {
    pub fn new(
        catalog: CatalogHandle,
        caller: ResilientCaller,
        observer: ObserverHandle,
        search_page_size: u32,
        album_page_size: u32,
    ) -> Self {
        Self {
            catalog,
            caller,
            observer,
            search_page_size,
            album_page_size,
        }
    }

    /// Every artist matching `query`, across all result pages.
    pub async fn search_artists(&self, query: &str) -> Result<Vec<Artist>, CallError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let first = self
            .caller
            .call("search_artists", || {
                self.catalog.search_artists(query, self.search_page_size)
            })
            .await?;

        let artists = Paginator::new(
            first,
            move |cursor| {
                async move {
                    self.caller
                        .call("next_artists", || self.catalog.next_artists(&cursor))
                        .await
                }
                .boxed()
            },
            self.observer.clone(),
        )
        .collect_all()
        .await;

        self.observer.emit(&Event::ArtistsFound {
            count: artists.len(),
        });
        Ok(artists)
    }

    /// All full-length albums of an artist that carry a release date, oldest
    /// first. Failing to get the first page is an error; later page faults
    /// only shorten the list.
    pub async fn fetch_albums(&self, artist_id: &str) -> Result<Vec<Album>, CallError> {
        if artist_id.trim().is_empty() {
            return Ok(Vec::new());
        }

        let first = self
            .caller
            .call("list_albums", || {
                self.catalog
                    .list_albums(artist_id, AlbumType::Album, self.album_page_size)
            })
            .await?;

        let albums = Paginator::new(
            first,
            move |cursor| {
                async move {
                    self.caller
                        .call("next_albums", || self.catalog.next_albums(&cursor))
                        .await
                }
                .boxed()
            },
            self.observer.clone(),
        )
        .collect_all()
        .await;

        let fetched = albums.len();
        let albums = utils::sort_albums_by_release_date(albums);
        self.observer.emit(&Event::AlbumsFetched {
            fetched,
            kept: albums.len(),
        });

        Ok(albums)
    }

    /// Track ids of one album in listing order. Only a failure on the first
    /// page is reported; later faults truncate the list. The fan-out turns a
    /// reported failure into an empty contribution for the album.
    pub async fn fetch_tracks(&self, album: &Album) -> Result<Vec<TrackId>, CallError> {
        let first = self
            .caller
            .call("list_tracks", || self.catalog.list_tracks(&album.id))
            .await?;

        let tracks = Paginator::new(
            first,
            move |cursor| {
                async move {
                    self.caller
                        .call("next_tracks", || self.catalog.next_tracks(&cursor))
                        .await
                }
                .boxed()
            },
            self.observer.clone(),
        )
        .collect_all()
        .await;

        Ok(tracks)
    }
}
