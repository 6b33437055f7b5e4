//! # API Module
//!
//! HTTP endpoints of the short-lived local server started by `sporldisco auth`.
//!
//! - [`callback`] - receives the authorization code from Spotify and exchanges
//!   it, together with the PKCE verifier, for an access token
//! - [`health`] - reports status and version
//!
//! Both are plain Axum handlers; see [`crate::server`] for the router.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
