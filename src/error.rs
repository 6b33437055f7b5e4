use std::time::Duration;

use thiserror::Error;

/// Failure signals a [`Catalog`](crate::catalog::Catalog) operation can raise.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("not authenticated with the catalog service")]
    Unauthenticated,

    #[error("rate limited by the catalog service (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Transient failure: 5xx responses, dropped connections, timeouts.
    #[error("remote fault: {0}")]
    Fault(String),

    /// The service refused the request itself; repeating it will not help.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Fault(_))
    }
}

/// Outcome of a remote call after the retry policy has been applied.
#[derive(Debug, Clone, Error)]
pub enum CallError {
    #[error("{operation} failed: {source}")]
    Rejected {
        operation: &'static str,
        #[source]
        source: RemoteError,
    },

    #[error("{operation} gave up after {attempts} attempts: {last}")]
    Exhausted {
        operation: &'static str,
        attempts: u32,
        #[source]
        last: RemoteError,
    },
}

impl CallError {
    /// The underlying remote error, whichever way the call ended.
    pub fn remote(&self) -> &RemoteError {
        match self {
            Self::Rejected { source, .. } => source,
            Self::Exhausted { last, .. } => last,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}

/// Everything that can end a discography run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Remote(#[from] CallError),

    #[error("could not resolve the current user: {0}")]
    UserResolution(String),

    #[error("could not create playlist: {0}")]
    PlaylistCreation(String),

    #[error("appending chunk {chunk} to playlist failed: {source}")]
    PlaylistAppend {
        chunk: usize,
        #[source]
        source: CallError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("session error: {0}")]
    Session(String),
}
