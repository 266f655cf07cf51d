use std::thread;
use std::time::Duration;

use json::JsonValue;
use log::{debug, warn};
use reqwest::StatusCode;

use super::{excerpt, http_client, OwnedGame, PrimaryCatalog};
use crate::error::{Error, Result};
use crate::user::{is_steam_id64, User};

const BASE_URL: &str = "https://api.steampowered.com";

/// Fixed-delay retry on throttling statuses. Sleeping blocks the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_delay: Duration,
    pub forbidden_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            rate_limit_delay: Duration::from_secs(60),
            forbidden_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// How long to wait before retrying `status`, or `None` if it is not retried.
    pub fn delay_for(&self, status: StatusCode) -> Option<Duration> {
        match status {
            StatusCode::TOO_MANY_REQUESTS => Some(self.rate_limit_delay),
            StatusCode::FORBIDDEN => Some(self.forbidden_delay),
            _ => None,
        }
    }
}

pub struct Steam {
    http: reqwest::blocking::Client,
    api_key: String,
    retry: RetryPolicy,
}

impl Steam {
    pub fn new(api_key: &str, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            api_key: api_key.trim().to_string(),
            retry,
        })
    }

    fn get(&self, method: &str, params: &[(&str, &str)]) -> Result<JsonValue> {
        let url = format!("{BASE_URL}/{method}");
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = self
                .http
                .get(&url)
                .query(&[("key", self.api_key.as_str()), ("format", "json")])
                .query(params)
                .send()?;
            let status = response.status();

            if let Some(delay) = self.retry.delay_for(status) {
                if attempt >= self.retry.max_attempts {
                    return Err(Error::RetriesExhausted {
                        service: "Steam",
                        attempts: attempt,
                    });
                }
                warn!(
                    "Steam returned {status} for {method}; retrying in {}s",
                    delay.as_secs()
                );
                thread::sleep(delay);
                continue;
            }

            let text = response.text()?;
            if !status.is_success() {
                return Err(Error::Api {
                    service: "Steam",
                    status: status.as_u16(),
                    message: excerpt(&text),
                });
            }
            return Ok(json::parse(&text)?);
        }
    }

    fn vanity_to_steam_id(&self, vanity: &str) -> Result<String> {
        let parsed = self.get(
            "ISteamUser/ResolveVanityURL/v0001/",
            &[("vanityurl", vanity.trim())],
        )?;

        let Some(steam_id) = parsed["response"]["steamid"].as_str() else {
            return Err(Error::Config(format!(
                "Steam user '{}' could not be resolved",
                vanity.trim()
            )));
        };
        Ok(steam_id.to_string())
    }
}

impl PrimaryCatalog for Steam {
    fn resolve_user(&self, user: &str) -> Result<User> {
        let steam_id = if is_steam_id64(user) {
            user.trim().to_string()
        } else {
            self.vanity_to_steam_id(user)?
        };

        let parsed = self.get(
            "ISteamUser/GetPlayerSummaries/v0002/",
            &[("steamids", steam_id.as_str())],
        )?;
        let display_name = parsed["response"]["players"][0]["personaname"]
            .as_str()
            .unwrap_or(&steam_id)
            .to_string();

        Ok(User::new(&steam_id, &display_name))
    }

    fn owned_games(&self, steam_id: &str) -> Result<Vec<OwnedGame>> {
        let parsed = self.get(
            "IPlayerService/GetOwnedGames/v0001/",
            &[
                ("steamid", steam_id.trim()),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
            ],
        )?;
        Ok(parse_owned_games(&parsed))
    }
}

fn parse_owned_games(parsed: &JsonValue) -> Vec<OwnedGame> {
    parsed["response"]["games"]
        .members()
        .filter_map(|g| {
            let Some(id) = g["appid"].as_u32() else {
                debug!("skipping owned game without appid: {}", g.dump());
                return None;
            };
            Some(OwnedGame {
                id,
                name: g["name"].as_str().unwrap_or_default().to_string(),
            })
        })
        .collect()
}
