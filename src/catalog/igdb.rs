use json::JsonValue;
use log::{debug, info};

use super::{
    excerpt, http_client, read_json, ExternalRef, GameRecord, MetadataCatalog, NameMatch,
};
use crate::error::{Error, Result};

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";
const BASE_URL: &str = "https://api.igdb.com/v4";

/// IGDB refuses result pages larger than this.
pub const MAX_BATCH: usize = 500;

/// IGDB's external-game category for Steam.
const STEAM_CATEGORY: u32 = 1;

const GAME_FIELDS: &str =
    "name,rating,rating_count,aggregated_rating,aggregated_rating_count,parent_game,category";

pub struct Igdb {
    http: reqwest::blocking::Client,
    client_id: String,
    access_token: String,
    batch_size: usize,
}

impl Igdb {
    /// Exchanges the Twitch client credentials for an access token.
    ///
    /// A rejected exchange is an [`Error::Auth`]; nothing has been fetched yet
    /// at that point so the run stops.
    pub fn connect(client_id: &str, client_secret: &str, batch_size: usize) -> Result<Self> {
        let http = http_client()?;
        let response = http
            .post(TOKEN_URL)
            .query(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "client_credentials"),
            ])
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "Twitch token exchange returned HTTP {}: {}",
                status.as_u16(),
                excerpt(&text)
            )));
        }

        let parsed = json::parse(&text)?;
        let Some(access_token) = parsed["access_token"].as_str() else {
            return Err(Error::Auth(
                "Twitch token response had no access_token".to_string(),
            ));
        };
        info!("IGDB connection initialized.");

        Ok(Self {
            http,
            client_id: client_id.to_string(),
            access_token: access_token.to_string(),
            batch_size: batch_size.clamp(1, MAX_BATCH),
        })
    }

    fn query(&self, endpoint: &str, body: String) -> Result<JsonValue> {
        debug!("IGDB {endpoint}: {body}");
        let response = self
            .http
            .post(format!("{BASE_URL}/{endpoint}"))
            .header("Client-ID", &self.client_id)
            .bearer_auth(&self.access_token)
            .body(body)
            .send()?;
        read_json("IGDB", response)
    }

    /// Runs one query per chunk of `ids` and concatenates the results.
    fn query_batched<I, T>(
        &self,
        endpoint: &str,
        ids: &[I],
        build: impl Fn(&[I]) -> String,
        parse: impl Fn(&JsonValue) -> Option<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for chunk in ids.chunks(self.batch_size) {
            let parsed = self.query(endpoint, build(chunk))?;
            out.extend(parsed.members().filter_map(&parse));
        }
        Ok(out)
    }
}

impl MetadataCatalog for Igdb {
    fn external_refs(&self, primary_ids: &[u32]) -> Result<Vec<ExternalRef>> {
        self.query_batched(
            "external_games",
            primary_ids,
            |chunk| external_refs_query(chunk, self.batch_size),
            parse_external_ref,
        )
    }

    fn games(&self, ids: &[u64]) -> Result<Vec<GameRecord>> {
        self.query_batched(
            "games",
            ids,
            |chunk| games_query(chunk, self.batch_size),
            parse_game_record,
        )
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<NameMatch>> {
        let body = format!(
            "fields id,name; limit {}; where name = \"{}\";",
            self.batch_size,
            escape(name)
        );
        let parsed = self.query("games", body)?;
        Ok(parsed
            .members()
            .filter_map(|m| {
                Some(NameMatch {
                    id: m["id"].as_u64()?,
                    name: m["name"].as_str().unwrap_or_default().to_string(),
                })
            })
            .collect())
    }

    fn game_name(&self, id: u64) -> Result<Option<String>> {
        let parsed = self.query("games", format!("fields name; where id = {id};"))?;
        Ok(parsed[0]["name"].as_str().map(str::to_string))
    }
}

fn external_refs_query(steam_ids: &[u32], limit: usize) -> String {
    let uids: Vec<String> = steam_ids.iter().map(|id| format!("\"{id}\"")).collect();
    format!(
        "fields game,uid; limit {limit}; where uid = ({}) & category = {STEAM_CATEGORY}; \
         sort uid asc;",
        uids.join(",")
    )
}

fn games_query(ids: &[u64], limit: usize) -> String {
    let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
    format!(
        "fields {GAME_FIELDS}; limit {limit}; where id = ({}); sort id asc;",
        ids.join(",")
    )
}

/// Escapes a title for use inside an Apicalypse string literal.
fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

fn parse_external_ref(value: &JsonValue) -> Option<ExternalRef> {
    Some(ExternalRef {
        uid: value["uid"].as_str()?.to_string(),
        game: value["game"].as_u64()?,
    })
}

fn parse_game_record(value: &JsonValue) -> Option<GameRecord> {
    // parent_game is a bare id unless the query expanded it.
    let parent = &value["parent_game"];
    let parent_game = if parent.is_object() {
        parent["id"].as_u64()
    } else {
        parent.as_u64()
    };

    Some(GameRecord {
        id: value["id"].as_u64()?,
        name: value["name"].as_str().unwrap_or_default().to_string(),
        rating: value["rating"].as_f64(),
        rating_count: value["rating_count"].as_u64(),
        aggregated_rating: value["aggregated_rating"].as_f64(),
        aggregated_rating_count: value["aggregated_rating_count"].as_u64(),
        parent_game,
        category: value["category"].as_i64(),
    })
}
