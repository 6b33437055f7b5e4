use std::sync::Arc;

use crate::{
    catalog::CatalogHandle,
    config::PipelineConfig,
    error::Error,
    observe::{Event, ObserverHandle},
    pipeline::{FanOut, PlaylistWriter, ResilientCaller, Retriever},
    types::{Artist, FetchJob, Playlist},
    utils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Searching,
    Selecting,
    FetchingAlbums,
    CreatingPlaylist,
    FetchingTracks,
    WritingPlaylist,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Zero based index into the candidates.
    Chosen(usize),
    Cancelled,
}

/// Picks one artist out of the search results.
pub trait ArtistSelector {
    fn select(&mut self, candidates: &[Artist]) -> Selection;
}

#[derive(Debug)]
pub enum AbortReason {
    NoArtists,
    NoAlbums,
    /// The playlist was created but none of the albums produced tracks.
    NoTracks { playlist: Playlist },
    Cancelled,
    Failed(Error),
}

#[derive(Debug)]
pub enum Outcome {
    Done {
        artist: Artist,
        playlist: Playlist,
        tracks: usize,
        chunks: usize,
    },
    Aborted {
        /// State the run was in when it stopped.
        at: PipelineState,
        reason: AbortReason,
    },
}

/// Result of a run plus the states it went through.
#[derive(Debug)]
pub struct Report {
    pub outcome: Outcome,
    pub states: Vec<PipelineState>,
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            Outcome::Aborted {
                reason: AbortReason::Failed(_),
                ..
            } => 1,
            _ => 0,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.outcome, Outcome::Done { .. })
    }
}

/// Drives one discography run from artist query to filled playlist.
pub struct Controller {
    retriever: Arc<Retriever>,
    writer: PlaylistWriter,
    fanout: FanOut,
    observer: ObserverHandle,
    public: bool,
    playlist_name: Option<String>,
    state: PipelineState,
    states: Vec<PipelineState>,
}

impl Controller {
    pub fn new(catalog: CatalogHandle, config: &PipelineConfig, observer: ObserverHandle) -> Self {
        let caller = ResilientCaller::new(config.retry, observer.clone());

        Self {
            retriever: Arc::new(Retriever::new(
                Arc::clone(&catalog),
                caller.clone(),
                observer.clone(),
                config.search_page_size,
                config.album_page_size,
            )),
            writer: PlaylistWriter::new(catalog, caller, observer.clone()),
            fanout: FanOut::new(config.workers, config.track_timeout, observer.clone()),
            observer,
            public: config.public,
            playlist_name: None,
            state: PipelineState::Idle,
            states: vec![PipelineState::Idle],
        }
    }

    /// Overrides the default `"<artist> discography"` playlist name.
    pub fn with_playlist_name(mut self, name: Option<String>) -> Self {
        self.playlist_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    /// Runs the pipeline once. The controller is consumed so no state is
    /// ever entered twice.
    pub async fn run(mut self, query: &str, selector: &mut dyn ArtistSelector) -> Report {
        let outcome = self.drive(query, selector).await;
        Report {
            outcome,
            states: self.states,
        }
    }

    async fn drive(&mut self, query: &str, selector: &mut dyn ArtistSelector) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return self.abort(AbortReason::Failed(Error::Validation(
                "artist name must not be blank".to_string(),
            )));
        }

        self.enter(PipelineState::Searching);
        let artists = match self.retriever.search_artists(query).await {
            Ok(artists) => artists,
            Err(e) => return self.abort(AbortReason::Failed(e.into())),
        };
        if artists.is_empty() {
            return self.abort(AbortReason::NoArtists);
        }

        self.enter(PipelineState::Selecting);
        let artist = match selector.select(&artists) {
            Selection::Chosen(index) => match artists.get(index) {
                Some(artist) => artist.clone(),
                None => {
                    return self.abort(AbortReason::Failed(Error::Validation(format!(
                        "selection {} is outside 1..={}",
                        index + 1,
                        artists.len()
                    ))));
                }
            },
            Selection::Cancelled => return self.abort(AbortReason::Cancelled),
        };

        self.enter(PipelineState::FetchingAlbums);
        let albums = match self.retriever.fetch_albums(&artist.id).await {
            Ok(albums) => albums,
            Err(e) => return self.abort(AbortReason::Failed(e.into())),
        };
        if albums.is_empty() {
            return self.abort(AbortReason::NoAlbums);
        }

        self.enter(PipelineState::CreatingPlaylist);
        let name = self
            .playlist_name
            .clone()
            .unwrap_or_else(|| utils::default_playlist_name(&artist.name));
        let playlist = match self.writer.create(&name, self.public).await {
            Ok(playlist) => playlist,
            Err(e) => return self.abort(AbortReason::Failed(e)),
        };

        self.enter(PipelineState::FetchingTracks);
        let retriever = Arc::clone(&self.retriever);
        let tracks = self
            .fanout
            .run(&albums, move |job: FetchJob| {
                let retriever = Arc::clone(&retriever);
                async move { retriever.fetch_tracks(&job.album).await }
            })
            .await;
        if tracks.is_empty() {
            return self.abort(AbortReason::NoTracks { playlist });
        }

        self.enter(PipelineState::WritingPlaylist);
        let chunks = match self.writer.append(&playlist.id, &tracks).await {
            Ok(chunks) => chunks,
            Err(e) => return self.abort(AbortReason::Failed(e)),
        };

        self.enter(PipelineState::Done);
        Outcome::Done {
            artist,
            playlist,
            tracks: tracks.len(),
            chunks,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        self.observer.emit(&Event::StateChanged {
            from: self.state,
            to: next,
        });
        self.state = next;
        self.states.push(next);
    }

    fn abort(&mut self, reason: AbortReason) -> Outcome {
        let at = self.state;
        self.enter(PipelineState::Aborted);
        Outcome::Aborted { at, reason }
    }
}
