use std::{
    io::{self, BufRead, Write},
    sync::{Arc, Mutex},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    catalog::CatalogHandle,
    config::PipelineConfig,
    error, info,
    management::TokenManager,
    observe::{Event, Observer, TracingObserver},
    pipeline::{
        AbortReason, ArtistSelector, Controller, Outcome, PipelineState, Report, RetryPolicy,
        Selection,
    },
    spotify::SpotifyClient,
    success,
    types::Artist,
    utils::{self, SelectionInput},
    warning,
};

/// Command line overrides for a discography run.
#[derive(Debug, Clone, Default)]
pub struct DiscographyArgs {
    pub artist: Option<String>,
    pub name: Option<String>,
    pub workers: Option<usize>,
    pub timeout: Option<u64>,
    pub max_attempts: Option<u32>,
    pub private: bool,
}

impl DiscographyArgs {
    pub fn apply(&self, mut config: PipelineConfig) -> PipelineConfig {
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(secs) = self.timeout {
            config.track_timeout = Duration::from_secs(secs);
        }
        if let Some(max_attempts) = self.max_attempts {
            let base_delay = config.retry.base_delay;
            config = config.with_retry(RetryPolicy::new(max_attempts, base_delay));
        }
        if self.private {
            config.public = false;
        }
        config
    }
}

/// Searches an artist, lets the user pick one and writes their albums, oldest
/// first, into a new playlist. Returns the process exit code.
pub async fn discography(args: DiscographyArgs) -> i32 {
    let config = match PipelineConfig::from_env() {
        Ok(config) => args.apply(config),
        Err(e) => error!("{}", e),
    };

    let query = match args.artist.clone().filter(|a| !a.trim().is_empty()) {
        Some(artist) => artist,
        None => match prompt_artist() {
            Some(artist) => artist,
            None => {
                info!("Cancelled.");
                return 0;
            }
        },
    };

    let token_mgr = match TokenManager::load().await {
        Ok(t) => t,
        Err(e) => error!(
            "Failed to load token. Please run sporldisco auth\n Error: {}",
            e
        ),
    };

    let catalog: CatalogHandle = Arc::new(SpotifyClient::new(Arc::new(token_mgr)));
    let observer = Arc::new(ConsoleObserver::default());
    let controller =
        Controller::new(catalog, &config, observer.clone()).with_playlist_name(args.name.clone());

    let report = controller.run(&query, &mut ConsoleSelector).await;
    observer.finish();

    print_report(&report);
    report.exit_code()
}

fn print_report(report: &Report) {
    match &report.outcome {
        Outcome::Done {
            artist,
            playlist,
            tracks,
            ..
        } => {
            info!("Added {} tracks by {}.", tracks, artist.name);
            success!("'{}' playlist created successfully!", playlist.name);
        }
        Outcome::Aborted { at, reason } => match reason {
            AbortReason::NoArtists => info!("No artists found with that name."),
            AbortReason::NoAlbums => info!("No albums found for that artist."),
            AbortReason::NoTracks { playlist } => warning!(
                "No tracks found. Playlist '{}' was created but left empty.",
                playlist.name
            ),
            AbortReason::Cancelled => info!("Cancelled."),
            AbortReason::Failed(e) => {
                tracing::error!(error = %e, state = ?at, "discography run failed");
                error!(
                    "Something went wrong while {}. Run with RUST_LOG=debug for details.",
                    describe(*at)
                )
            }
        },
    }
}

fn describe(state: PipelineState) -> &'static str {
    match state {
        PipelineState::Idle => "checking the input",
        PipelineState::Searching => "searching for artists",
        PipelineState::Selecting => "selecting the artist",
        PipelineState::FetchingAlbums => "fetching albums",
        PipelineState::CreatingPlaylist => "creating the playlist",
        PipelineState::FetchingTracks => "fetching tracks",
        PipelineState::WritingPlaylist => "adding tracks to the playlist",
        PipelineState::Done | PipelineState::Aborted => "finishing up",
    }
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}

/// Asks for an artist name until a non-blank one is given; `None` on EOF.
fn prompt_artist() -> Option<String> {
    loop {
        let name = read_line("Enter artist name: ")?;
        if !name.is_empty() {
            return Some(name);
        }
        warning!("Artist name must not be empty.");
    }
}

/// Interactive artist choice on stdin.
pub struct ConsoleSelector;

impl ArtistSelector for ConsoleSelector {
    fn select(&mut self, candidates: &[Artist]) -> Selection {
        println!("\nFound {} artists:", candidates.len());
        println!("{}", Table::new(utils::artist_table_rows(candidates)));

        let prompt = format!(
            "\nSelect artist number (1-{}, q to cancel): ",
            candidates.len()
        );
        loop {
            let Some(input) = read_line(&prompt) else {
                return Selection::Cancelled;
            };

            match utils::parse_selection(&input, candidates.len()) {
                Ok(SelectionInput::Index(index)) => return Selection::Chosen(index),
                Ok(SelectionInput::Quit) => return Selection::Cancelled,
                Err(message) => warning!("{}", message),
            }
        }
    }
}

/// Drives a progress bar during track discovery and forwards everything to
/// `tracing`.
#[derive(Default)]
struct ConsoleObserver {
    albums: Mutex<u64>,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleObserver {
    fn start_bar(&self) {
        let total = self.albums.lock().map(|n| *n).unwrap_or(0);
        let pb = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} [{pos}/{len}] {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        pb.set_message("Fetching album tracks...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn tick(&self, album: &str) {
        if let Ok(bar) = self.bar.lock() {
            if let Some(pb) = bar.as_ref() {
                pb.set_message(format!("Album: {}", album));
                pb.inc(1);
            }
        }
    }

    fn finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Observer for ConsoleObserver {
    fn emit(&self, event: &Event) {
        match event {
            Event::AlbumsFetched { kept, .. } => {
                if let Ok(mut albums) = self.albums.lock() {
                    *albums = *kept as u64;
                }
            }
            Event::StateChanged {
                to: PipelineState::FetchingTracks,
                ..
            } => self.start_bar(),
            Event::StateChanged {
                from: PipelineState::FetchingTracks,
                ..
            } => self.finish(),
            Event::TracksFetched { album, .. } | Event::TracksDegraded { album, .. } => {
                self.tick(album)
            }
            Event::PlaylistCreated { name, .. } => info!("Playlist '{}' created.", name),
            _ => {}
        }

        TracingObserver.emit(event);
    }
}
