use super::{http_client, read_json, ReviewAggregator};
use crate::error::Result;
use crate::game::round2;

const API_URL: &str = "https://steamspy.com/api.php";

pub struct SteamSpy {
    http: reqwest::blocking::Client,
}

impl SteamSpy {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: http_client()?,
        })
    }
}

impl ReviewAggregator for SteamSpy {
    fn review_score(&self, primary_id: u32) -> Result<Option<f64>> {
        let appid = primary_id.to_string();
        let response = self
            .http
            .get(API_URL)
            .query(&[("request", "appdetails"), ("appid", appid.as_str())])
            .send()?;
        let parsed = read_json("SteamSpy", response)?;

        Ok(positive_share(
            parsed["positive"].as_u64().unwrap_or(0),
            parsed["negative"].as_u64().unwrap_or(0),
        ))
    }
}

/// Percentage of positive reviews, rounded to two places.
pub fn positive_share(positive: u64, negative: u64) -> Option<f64> {
    let total = positive + negative;
    (total > 0).then(|| round2(positive as f64 / total as f64 * 100.0))
}
