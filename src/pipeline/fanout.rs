use std::{
    collections::VecDeque,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{Arc, OnceLock},
    time::Duration,
};

use futures::FutureExt;
use tokio::{sync::Mutex, task::JoinSet, time::timeout};

use crate::{
    error::CallError,
    observe::{Event, ObserverHandle},
    types::{Album, FetchJob, TrackId},
};

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30);

type Slots = Arc<Vec<OnceLock<Vec<TrackId>>>>;

/// Fixed-size worker pool fetching the tracks of many albums at once.
///
/// Workers pull indexed jobs from a shared queue and write each result into
/// the slot matching the job's index, so the flattened output follows album
/// order no matter which fetch finishes first.
pub struct FanOut {
    workers: usize,
    job_timeout: Duration,
    observer: ObserverHandle,
}

impl FanOut {
    /// `workers` is clamped to at least one.
    pub fn new(workers: usize, job_timeout: Duration, observer: ObserverHandle) -> Self {
        Self {
            workers: workers.max(1),
            job_timeout,
            observer,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fetches the tracks of every album with `fetch` and concatenates them in
    /// album order. A job that fails, times out or panics contributes no
    /// tracks; the worker moves on to the next job.
    pub async fn run<F, Fut>(&self, albums: &[Album], fetch: F) -> Vec<TrackId>
    where
        F: Fn(FetchJob) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<TrackId>, CallError>> + Send + 'static,
    {
        if albums.is_empty() {
            return Vec::new();
        }

        let jobs: VecDeque<FetchJob> = albums
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, album)| FetchJob { index, album })
            .collect();

        let queue = Arc::new(Mutex::new(jobs));
        let slots: Slots = Arc::new((0..albums.len()).map(|_| OnceLock::new()).collect());
        let fetch = Arc::new(fetch);

        let mut workers = JoinSet::new();
        for _ in 0..self.workers.min(albums.len()) {
            workers.spawn(work(
                Arc::clone(&queue),
                Arc::clone(&slots),
                Arc::clone(&fetch),
                self.job_timeout,
                self.observer.clone(),
            ));
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "track fetch worker stopped unexpectedly");
            }
        }

        let mut tracks = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            match slot.get() {
                Some(album_tracks) => tracks.extend(album_tracks.iter().cloned()),
                None => self.observer.emit(&Event::TracksDegraded {
                    index,
                    album: albums[index].name.clone(),
                    reason: "worker stopped before the job finished".to_string(),
                }),
            }
        }

        tracks
    }
}

async fn work<F, Fut>(
    queue: Arc<Mutex<VecDeque<FetchJob>>>,
    slots: Slots,
    fetch: Arc<F>,
    job_timeout: Duration,
    observer: ObserverHandle,
) where
    F: Fn(FetchJob) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<TrackId>, CallError>> + Send + 'static,
{
    loop {
        let Some(job) = queue.lock().await.pop_front() else {
            return;
        };

        let index = job.index;
        let album = job.album.name.clone();

        let fetch_job = Arc::clone(&fetch);
        let outcome = AssertUnwindSafe(async move { timeout(job_timeout, fetch_job(job)).await })
            .catch_unwind()
            .await;

        let tracks = match outcome {
            Ok(Ok(Ok(tracks))) => {
                observer.emit(&Event::TracksFetched {
                    index,
                    album,
                    count: tracks.len(),
                });
                tracks
            }
            Ok(Ok(Err(e))) => {
                observer.emit(&Event::TracksDegraded {
                    index,
                    album,
                    reason: e.to_string(),
                });
                Vec::new()
            }
            Ok(Err(_)) => {
                observer.emit(&Event::TracksDegraded {
                    index,
                    album,
                    reason: format!("timed out after {:?}", job_timeout),
                });
                Vec::new()
            }
            Err(_) => {
                observer.emit(&Event::TracksDegraded {
                    index,
                    album,
                    reason: "fetch panicked".to_string(),
                });
                Vec::new()
            }
        };

        // Each index is queued exactly once, so the slot is still empty.
        let _ = slots[index].set(tracks);
    }
}
