use json::{object, JsonValue};
use reqwest::header::{CONTENT_TYPE, ORIGIN, REFERER};
use strsim::normalized_levenshtein;

use super::{http_client, read_json, CompletionEstimate, CompletionTimeService};
use crate::error::Result;
use crate::game::round2;

const SITE_URL: &str = "https://howlongtobeat.com";
/// Unofficial endpoint. The site periodically appends a rotating key segment
/// to this path and rejects the bare form until it is updated here.
const SEARCH_PATH: &str = "/api/search";

/// Results scoring below this are dropped before they reach the caller.
pub const MIN_SIMILARITY: f64 = 0.4;

/// Client for HowLongToBeat's site search.
///
/// There is no public API; this posts the same body the site's own search
/// page sends. When the site changes that contract every search returns an
/// error, which callers record per title as a lookup warning while the rest
/// of the run carries on.
pub struct HowLongToBeat {
    http: reqwest::blocking::Client,
    case_insensitive: bool,
}

impl HowLongToBeat {
    pub fn new(case_insensitive: bool) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            case_insensitive,
        })
    }
}

impl CompletionTimeService for HowLongToBeat {
    fn search(&self, query: &str) -> Result<Vec<CompletionEstimate>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .http
            .post(format!("{SITE_URL}{SEARCH_PATH}"))
            .header(CONTENT_TYPE, "application/json")
            .header(ORIGIN, SITE_URL)
            .header(REFERER, format!("{SITE_URL}/"))
            .body(search_body(query).dump())
            .send()?;
        let parsed = read_json("HowLongToBeat", response)?;

        Ok(parse_results(&parsed, query, self.case_insensitive))
    }
}

fn search_body(query: &str) -> JsonValue {
    let terms: Vec<&str> = query.split_whitespace().collect();
    object! {
        searchType: "games",
        searchTerms: terms,
        searchPage: 1,
        size: 20,
        searchOptions: {
            games: {
                userId: 0,
                platform: "",
                sortCategory: "popular",
                rangeCategory: "main",
                rangeTime: { min: 0, max: 0 },
                gameplay: { perspective: "", flow: "", genre: "" },
                modifier: ""
            },
            users: { sortCategory: "postcount" },
            filter: "",
            sort: 0,
            randomizer: 0
        }
    }
}

fn parse_results(
    parsed: &JsonValue,
    query: &str,
    case_insensitive: bool,
) -> Vec<CompletionEstimate> {
    parsed["data"]
        .members()
        .filter_map(|entry| {
            let title = entry["game_name"].as_str()?;
            let seconds = entry["comp_100"].as_f64().unwrap_or(0.0);
            Some(CompletionEstimate {
                title: title.to_string(),
                similarity: similarity(query, title, case_insensitive),
                completionist_hours: round2(seconds / 3600.0),
            })
        })
        .filter(|estimate| estimate.similarity >= MIN_SIMILARITY)
        .collect()
}

/// Normalized Levenshtein similarity between the query and a result title.
pub fn similarity(query: &str, title: &str, case_insensitive: bool) -> f64 {
    if case_insensitive {
        normalized_levenshtein(&query.to_lowercase(), &title.to_lowercase())
    } else {
        normalized_levenshtein(query, title)
    }
}
