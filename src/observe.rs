//! Structured events emitted by the pipeline.
//!
//! Every core component receives an [`ObserverHandle`] at construction time and
//! reports what it is doing through it. Nothing the pipeline returns depends on
//! what the observer does with those events.

use std::{sync::Arc, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{error::RemoteError, pipeline::PipelineState};

pub type ObserverHandle = Arc<dyn Observer>;

#[derive(Debug, Clone)]
pub enum Event {
    Attempt {
        operation: &'static str,
        attempt: u32,
    },
    Retry {
        operation: &'static str,
        attempt: u32,
        delay: Duration,
        error: RemoteError,
    },
    Exhausted {
        operation: &'static str,
        attempts: u32,
        error: RemoteError,
    },
    Rejected {
        operation: &'static str,
        error: RemoteError,
    },
    PageTruncated {
        reason: String,
    },
    ArtistsFound {
        count: usize,
    },
    AlbumsFetched {
        fetched: usize,
        kept: usize,
    },
    TracksFetched {
        index: usize,
        album: String,
        count: usize,
    },
    TracksDegraded {
        index: usize,
        album: String,
        reason: String,
    },
    PlaylistCreated {
        id: String,
        name: String,
    },
    ChunkAppended {
        index: usize,
        size: usize,
    },
    NothingToAppend,
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },
}

pub trait Observer: Send + Sync {
    fn emit(&self, event: &Event);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn emit(&self, event: &Event) {
        match event {
            Event::Attempt { operation, attempt } => {
                debug!(operation, attempt, "calling remote operation")
            }
            Event::Retry {
                operation,
                attempt,
                delay,
                error,
            } => warn!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                %error,
                "remote call failed, retrying"
            ),
            Event::Exhausted {
                operation,
                attempts,
                error,
            } => error!(operation, attempts, %error, "remote call exhausted its attempts"),
            Event::Rejected { operation, error } => {
                error!(operation, %error, "remote call rejected")
            }
            Event::PageTruncated { reason } => warn!(%reason, "pagination stopped early"),
            Event::ArtistsFound { count } => info!(count, "artist search finished"),
            Event::AlbumsFetched { fetched, kept } => {
                info!(fetched, kept, "albums fetched and sorted")
            }
            Event::TracksFetched {
                index,
                album,
                count,
            } => debug!(index, %album, count, "album tracks fetched"),
            Event::TracksDegraded {
                index,
                album,
                reason,
            } => warn!(index, %album, %reason, "album contributes no tracks"),
            Event::PlaylistCreated { id, name } => info!(%id, %name, "playlist created"),
            Event::ChunkAppended { index, size } => debug!(index, size, "chunk appended"),
            Event::NothingToAppend => info!("no tracks to append"),
            Event::StateChanged { from, to } => debug!(?from, ?to, "pipeline state changed"),
        }
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn emit(&self, _event: &Event) {}
}
