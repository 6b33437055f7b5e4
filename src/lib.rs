//! Spotify Discography Playlist CLI Library
//!
//! This library builds a playlist holding every album of an artist, oldest
//! release first. Around that sits a resilient API-orchestration pipeline:
//! paginated retrieval, retry with backoff that honours rate-limit hints, a
//! bounded worker pool for per-album track fetches and chunked playlist writes.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local OAuth callback server
//! - `catalog` - Capability interface of the remote music catalog
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy of remote calls and pipeline runs
//! - `management` - Token persistence and session provider
//! - `observe` - Structured pipeline events and their sinks
//! - `pipeline` - Paginator, retry, retriever, fan-out, writer and controller
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporldisco::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sporldisco::error::Error> {
//!     config::load_env().await?;
//!     let code = cli::discography(cli::DiscographyArgs::default()).await;
//!     std::process::exit(code);
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod observe;
pub mod pipeline;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints a status line prefixed with a blue `o`.
///
/// ```
/// info!("Found {} artists", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a status line prefixed with a green check mark.
///
/// ```
/// success!("'{}' playlist created successfully!", name);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line and terminates the process with exit code 1.
///
/// Evaluates to `!`, so it can stand in any match arm. Only for failures the
/// command cannot recover from; the pipeline itself never calls it.
///
/// ```
/// error!("Failed to load token. Please run sporldisco auth");
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a yellow `!` line for problems the user should see but that do not
/// stop the command.
///
/// ```
/// warning!("Artist name must not be empty.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
