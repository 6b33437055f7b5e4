#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use sporldisco::{
    catalog::Catalog,
    error::RemoteError,
    observe::{Event, Observer, ObserverHandle},
    pipeline::{ArtistSelector, Selection},
    types::{Album, AlbumType, Artist, Cursor, Page, Playlist, TrackId, UserId},
};

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: vec!["rock".to_string()],
    }
}

pub fn album(id: &str, name: &str, release_date: Option<&str>) -> Album {
    Album {
        id: id.to_string(),
        uri: format!("spotify:album:{}", id),
        name: name.to_string(),
        release_date: release_date.map(str::to_string),
    }
}

pub fn tracks(prefix: &str, count: usize) -> Vec<TrackId> {
    (0..count)
        .map(|i| TrackId(format!("spotify:track:{}-{}", prefix, i)))
        .collect()
}

pub fn cursor(kind: &str, key: &str, page: usize) -> Cursor {
    Cursor(format!("{}/{}/{}", kind, key, page))
}

/// Splits items into pages chained with mock cursors.
pub fn paged<T>(kind: &str, key: &str, pages: Vec<Vec<T>>) -> Vec<Page<T>> {
    let count = pages.len();
    pages
        .into_iter()
        .enumerate()
        .map(|(i, items)| {
            let next = (i + 1 < count).then(|| cursor(kind, key, i + 1));
            Page::new(items, next)
        })
        .collect()
}

fn page_index(cursor: &Cursor) -> (String, usize) {
    let (rest, n) = cursor.0.rsplit_once('/').unwrap_or(("", "0"));
    let key = rest.split_once('/').map(|(_, k)| k).unwrap_or("").to_string();
    (key, n.parse().unwrap_or(usize::MAX))
}

fn pick<T: Clone>(pages: Option<&Vec<Page<T>>>, index: usize) -> Result<Page<T>, RemoteError> {
    match pages {
        None if index == 0 => Ok(Page::new(Vec::new(), None)),
        None => Err(RemoteError::Rejected("no such listing".to_string())),
        Some(pages) => pages
            .get(index)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected(format!("no page {}", index))),
    }
}

/// In-memory catalog answering from scripted pages and recording every call.
pub struct MockCatalog {
    artist_pages: Vec<Page<Artist>>,
    album_pages: HashMap<String, Vec<Page<Album>>>,
    track_pages: HashMap<String, Vec<Page<TrackId>>>,
    track_delays: HashMap<String, Duration>,
    broken_albums: HashMap<String, RemoteError>,
    user: Option<UserId>,
    playlist_id: String,
    failures: Mutex<HashMap<&'static str, VecDeque<Option<RemoteError>>>>,
    calls: Mutex<Vec<&'static str>>,
    appended: Mutex<Vec<Vec<TrackId>>>,
    created: Mutex<Vec<(String, String, bool)>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self {
            artist_pages: Vec::new(),
            album_pages: HashMap::new(),
            track_pages: HashMap::new(),
            track_delays: HashMap::new(),
            broken_albums: HashMap::new(),
            user: Some(UserId("listener".to_string())),
            playlist_id: "pl-1".to_string(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            appended: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artists(mut self, pages: Vec<Vec<Artist>>) -> Self {
        self.artist_pages = paged("artists", "search", pages);
        self
    }

    pub fn with_albums(mut self, artist_id: &str, pages: Vec<Vec<Album>>) -> Self {
        self.album_pages
            .insert(artist_id.to_string(), paged("albums", artist_id, pages));
        self
    }

    pub fn with_tracks(mut self, album_id: &str, pages: Vec<Vec<TrackId>>) -> Self {
        self.track_pages
            .insert(album_id.to_string(), paged("tracks", album_id, pages));
        self
    }

    pub fn with_raw_tracks(mut self, album_id: &str, pages: Vec<Page<TrackId>>) -> Self {
        self.track_pages.insert(album_id.to_string(), pages);
        self
    }

    pub fn with_track_delay(mut self, album_id: &str, delay: Duration) -> Self {
        self.track_delays.insert(album_id.to_string(), delay);
        self
    }

    pub fn with_broken_album(mut self, album_id: &str, error: RemoteError) -> Self {
        self.broken_albums.insert(album_id.to_string(), error);
        self
    }

    pub fn with_user(mut self, user: Option<&str>) -> Self {
        self.user = user.map(|u| UserId(u.to_string()));
        self
    }

    pub fn with_playlist_id(mut self, id: &str) -> Self {
        self.playlist_id = id.to_string();
        self
    }

    /// Makes the next calls of `operation` fail with `errors`, in order.
    pub fn fail_next(self, operation: &'static str, errors: Vec<RemoteError>) -> Self {
        self.fail_after(operation, 0, errors)
    }

    /// Lets `successes` calls of `operation` through, then fails the
    /// following ones with `errors`.
    pub fn fail_after(
        self,
        operation: &'static str,
        successes: usize,
        errors: Vec<RemoteError>,
    ) -> Self {
        self.failures
            .lock()
            .unwrap()
            .entry(operation)
            .or_default()
            .extend((0..successes).map(|_| None).chain(errors.into_iter().map(Some)));
        self
    }

    pub fn handle(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn appended(&self) -> Vec<Vec<TrackId>> {
        self.appended.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<(String, String, bool)> {
        self.created.lock().unwrap().clone()
    }

    fn enter(&self, operation: &'static str) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(operation);
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(|queue| queue.pop_front())
            .flatten()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn album_tracks(&self, album_id: &str, index: usize) -> Result<Page<TrackId>, RemoteError> {
        if let Some(delay) = self.track_delays.get(album_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(error) = self.broken_albums.get(album_id) {
            return Err(error.clone());
        }
        pick(self.track_pages.get(album_id), index)
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    async fn search_artists(&self, _query: &str, _limit: u32) -> Result<Page<Artist>, RemoteError> {
        self.enter("search_artists")?;
        match self.artist_pages.first() {
            Some(page) => Ok(page.clone()),
            None => Ok(Page::new(Vec::new(), None)),
        }
    }

    async fn list_albums(
        &self,
        artist_id: &str,
        _album_type: AlbumType,
        _limit: u32,
    ) -> Result<Page<Album>, RemoteError> {
        self.enter("list_albums")?;
        pick(self.album_pages.get(artist_id), 0)
    }

    async fn list_tracks(&self, album_id: &str) -> Result<Page<TrackId>, RemoteError> {
        self.enter("list_tracks")?;
        self.album_tracks(album_id, 0).await
    }

    async fn next_artists(&self, cursor: &Cursor) -> Result<Page<Artist>, RemoteError> {
        self.enter("next_artists")?;
        let (_, index) = page_index(cursor);
        pick(Some(&self.artist_pages), index)
    }

    async fn next_albums(&self, cursor: &Cursor) -> Result<Page<Album>, RemoteError> {
        self.enter("next_albums")?;
        let (artist_id, index) = page_index(cursor);
        pick(self.album_pages.get(&artist_id), index)
    }

    async fn next_tracks(&self, cursor: &Cursor) -> Result<Page<TrackId>, RemoteError> {
        self.enter("next_tracks")?;
        let (album_id, index) = page_index(cursor);
        self.album_tracks(&album_id, index).await
    }

    async fn current_user(&self) -> Result<Option<UserId>, RemoteError> {
        self.enter("current_user")?;
        Ok(self.user.clone())
    }

    async fn create_playlist(
        &self,
        user_id: &UserId,
        name: &str,
        public: bool,
    ) -> Result<Playlist, RemoteError> {
        self.enter("create_playlist")?;
        self.created
            .lock()
            .unwrap()
            .push((user_id.0.clone(), name.to_string(), public));
        Ok(Playlist {
            id: self.playlist_id.clone(),
            name: name.to_string(),
        })
    }

    async fn append_items(&self, _playlist_id: &str, tracks: &[TrackId]) -> Result<(), RemoteError> {
        self.enter("append_items")?;
        self.appended.lock().unwrap().push(tracks.to_vec());
        Ok(())
    }
}

/// Keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn handle() -> (Arc<Self>, ObserverHandle) {
        let recorder = Arc::new(Self::default());
        let handle: ObserverHandle = recorder.clone();
        (recorder, handle)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn retry_delays(&self) -> Vec<Duration> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Retry { delay, .. } => Some(delay),
                _ => None,
            })
            .collect()
    }

    /// Album indices in the order their track fetches finished.
    pub fn completion_order(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::TracksFetched { index, .. } | Event::TracksDegraded { index, .. } => {
                    Some(index)
                }
                _ => None,
            })
            .collect()
    }
}

impl Observer for RecordingObserver {
    fn emit(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Selector answering with a fixed choice and remembering what it was shown.
pub struct FixedSelector {
    pub answer: Selection,
    pub shown: Vec<Artist>,
}

impl FixedSelector {
    pub fn choose(index: usize) -> Self {
        Self {
            answer: Selection::Chosen(index),
            shown: Vec::new(),
        }
    }

    pub fn cancel() -> Self {
        Self {
            answer: Selection::Cancelled,
            shown: Vec::new(),
        }
    }
}

impl ArtistSelector for FixedSelector {
    fn select(&mut self, candidates: &[Artist]) -> Selection {
        self.shown = candidates.to_vec();
        self.answer.clone()
    }
}
