//! # CLI Module
//!
//! User-facing commands of Sporldisco. Each command wires configuration, the
//! session, the Spotify client and the pipeline together and turns the result
//! into console output.
//!
//! ## Commands
//!
//! - [`auth`] - Spotify OAuth authentication with PKCE
//! - [`discography`] - search an artist and build their discography playlist
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (prompts, tables, progress)
//!     ↓
//! Pipeline (Controller, FanOut, Retriever, PlaylistWriter)
//!     ↓
//! Catalog (SpotifyClient)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Interaction
//!
//! The artist name can be passed as an argument or typed at the prompt; blank
//! names are asked for again. Candidates are listed in a table and picked by
//! number, `q` or end of input cancels without touching the account.
//!
//! ## Exit Status
//!
//! - `0` - playlist written, nothing found, or cancelled
//! - `1` - the run failed; details go to the log (`RUST_LOG`)
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporldisco auth                              # Authenticate with Spotify
//! sporldisco discography "Massive Attack"      # Build the playlist
//! sporldisco discography --workers 8 --private # Prompt for the artist
//! ```

mod auth;
mod discography;

pub use auth::auth;
pub use discography::ConsoleSelector;
pub use discography::DiscographyArgs;
pub use discography::discography;
