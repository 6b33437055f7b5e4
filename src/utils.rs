use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Album, Artist, ArtistTableRow};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Drops albums without a release date and orders the rest by it, oldest first.
///
/// The sort is stable: albums sharing a date keep their fetch order. Spotify
/// dates come as `YYYY`, `YYYY-MM` or `YYYY-MM-DD`, which order correctly as
/// plain strings.
pub fn sort_albums_by_release_date(albums: Vec<Album>) -> Vec<Album> {
    let mut dated: Vec<Album> = albums
        .into_iter()
        .filter(|album| {
            album
                .release_date
                .as_deref()
                .is_some_and(|date| !date.trim().is_empty())
        })
        .collect();

    dated.sort_by(|a, b| a.release_date.cmp(&b.release_date));
    dated
}

/// Number of calls needed to push `total` items through an API that accepts
/// `chunk_size` items per call.
pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    total.div_ceil(chunk_size)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionInput {
    /// Zero based index into the candidate list.
    Index(usize),
    Quit,
}

/// Parses a one based artist choice typed by the user.
pub fn parse_selection(input: &str, candidates: usize) -> Result<SelectionInput, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Ok(SelectionInput::Quit);
    }

    let number: usize = input
        .parse()
        .map_err(|_| "Please enter a valid number.".to_string())?;

    if number == 0 || number > candidates {
        return Err("Please select a valid number.".to_string());
    }

    Ok(SelectionInput::Index(number - 1))
}

pub fn artist_table_rows(artists: &[Artist]) -> Vec<ArtistTableRow> {
    artists
        .iter()
        .enumerate()
        .map(|(i, a)| ArtistTableRow {
            index: i + 1,
            name: a.name.clone(),
            genres: a.genres.iter().take(3).cloned().collect::<Vec<_>>().join(","),
        })
        .collect()
}

pub fn default_playlist_name(artist_name: &str) -> String {
    format!("{} discography", artist_name)
}
