//! # Spotify Integration Module
//!
//! The concrete side of the catalog: HTTP communication with the Spotify Web
//! API and the OAuth flow that produces the tokens it needs.
//!
//! ## Architecture
//!
//! ```text
//! Pipeline (Controller, Retriever, PlaylistWriter)
//!          ↓  Catalog trait
//! SpotifyClient (reqwest, JSON)
//!          ↓  SessionProvider trait
//! TokenManager (persisted token, refresh)
//!          ↓
//! Spotify Web API / Accounts service
//! ```
//!
//! ## Core Modules
//!
//! ### Authentication Module
//!
//! [`auth`] - OAuth 2.0 PKCE flow:
//! - **PKCE Security**: code verifier and S256 challenge, no client secret
//! - **Browser Integration**: opens the authorization page, falls back to printing the URL
//! - **Local Callback Server**: temporary Axum server receiving the authorization code
//! - **Token Refresh**: refresh-token grant used by [`crate::management::TokenManager`]
//!
//! ### Client Module
//!
//! [`client`] - [`SpotifyClient`], the [`crate::catalog::Catalog`] implementation:
//! - `GET /search` - artist search, wrapped in an `artists` object
//! - `GET /artists/{id}/albums` - discography, filtered by `include_groups`
//! - `GET /albums/{id}/tracks` - track listing of one album
//! - `GET /me` - id of the authenticated user
//! - `POST /users/{user_id}/playlists` - playlist creation
//! - `POST /playlists/{playlist_id}/tracks` - append up to 100 URIs
//!
//! Continuation pages are fetched by following the absolute `next` URL the API
//! returns with every page.
//!
//! ## Error Mapping
//!
//! - `429 Too Many Requests` → `RateLimited`, with the `Retry-After` seconds when present
//! - `401 Unauthorized` → `Unauthenticated`
//! - `5xx`, `408` and transport failures → `Fault` (retried)
//! - any other non-success status → `Rejected` (not retried)
//! - undecodable bodies → `Malformed`
//!
//! Retrying itself is not done here; the pipeline's
//! [`crate::pipeline::ResilientCaller`] decides what to repeat.

pub mod auth;
pub mod client;

pub use client::SpotifyClient;
