//! # Discography Pipeline
//!
//! The core of Sporldisco: everything between "the user typed an artist name"
//! and "the playlist holds the discography in release order".
//!
//! ```text
//! query ─▶ Retriever::search_artists ─▶ ArtistSelector
//!            ─▶ Retriever::fetch_albums (filtered, sorted by release date)
//!            ─▶ PlaylistWriter::create
//!            ─▶ FanOut (Retriever::fetch_tracks per album, W workers)
//!            ─▶ PlaylistWriter::append (chunks of 100)
//! ```
//!
//! Every remote call goes through a [`ResilientCaller`]; every listing is
//! walked with a [`Paginator`]. The [`Controller`] owns the run and is the only
//! place that turns errors into an [`Outcome`].
//!
//! ## Failure policy
//!
//! - Search, album discovery, playlist creation and appends are critical: a
//!   failure aborts the run.
//! - A single album's tracks are not: a failed or timed-out album contributes
//!   no tracks and the run goes on.
//! - Pagination faults after the first page truncate the listing.

mod controller;
mod fanout;
mod paginator;
mod retriever;
mod retry;
mod writer;

pub use controller::{AbortReason, ArtistSelector, Controller, Outcome, PipelineState, Report, Selection};
pub use fanout::{DEFAULT_JOB_TIMEOUT, DEFAULT_WORKERS, FanOut};
pub use paginator::Paginator;
pub use retriever::Retriever;
pub use retry::{
    DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, MAX_RETRY_AFTER, ResilientCaller, RetryPolicy,
};
pub use writer::PlaylistWriter;
