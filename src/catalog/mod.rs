//! The external catalogs the pipeline reads from.
//!
//! Each catalog sits behind a trait so the pipeline stages can be driven by
//! the real HTTP clients in `main` and by in-memory fakes in tests.

use json::JsonValue;

use crate::error::{Error, Result};
use crate::user::User;

pub mod hltb;
pub mod igdb;
pub mod steam;
pub mod steamspy;

#[cfg(test)]
pub mod fake;

/// An entry from the user's owned-games list.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedGame {
    pub id: u32,
    pub name: String,
}

/// An IGDB external-game record: `uid` is the Steam app id as a string.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRef {
    pub uid: String,
    pub game: u64,
}

/// The subset of an IGDB game record the scorer uses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameRecord {
    pub id: u64,
    pub name: String,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub aggregated_rating: Option<f64>,
    pub aggregated_rating_count: Option<u64>,
    pub parent_game: Option<u64>,
    pub category: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameMatch {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionEstimate {
    pub title: String,
    /// 0.0 to 1.0, higher is closer to the query.
    pub similarity: f64,
    pub completionist_hours: f64,
}

/// Where the owned-games list comes from.
pub trait PrimaryCatalog {
    /// Accepts either a SteamID64 or a vanity name.
    fn resolve_user(&self, user: &str) -> Result<User>;
    fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>>;
}

/// Cross references, parent titles and ratings.
pub trait MetadataCatalog {
    fn external_refs(&self, primary_ids: &[u32]) -> Result<Vec<ExternalRef>>;
    fn games(&self, ids: &[u64]) -> Result<Vec<GameRecord>>;
    /// Exact-title search, in the catalog's own order.
    fn search_by_name(&self, name: &str) -> Result<Vec<NameMatch>>;
    fn game_name(&self, id: u64) -> Result<Option<String>>;
}

pub trait CompletionTimeService {
    fn search(&self, query: &str) -> Result<Vec<CompletionEstimate>>;
}

pub trait ReviewAggregator {
    /// Percentage of positive reviews, `None` when the title has none.
    fn review_score(&self, primary_id: u32) -> Result<Option<f64>>;
}

/// Turns a blocking response into parsed JSON, mapping non-2xx statuses to [`Error::Api`].
pub(crate) fn read_json(
    service: &'static str,
    response: reqwest::blocking::Response,
) -> Result<JsonValue> {
    let status = response.status();
    let text = response.text()?;
    if !status.is_success() {
        return Err(Error::Api {
            service,
            status: status.as_u16(),
            message: excerpt(&text),
        });
    }
    Ok(json::parse(&text)?)
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn excerpt(text: &str) -> String {
    text.chars().take(200).collect()
}

pub(crate) fn http_client() -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(300);
        assert_eq!(excerpt(&long).chars().count(), 200);
        assert_eq!(excerpt("short"), "short");
    }
}
