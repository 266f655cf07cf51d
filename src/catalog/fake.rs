use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{
    CompletionEstimate, CompletionTimeService, ExternalRef, GameRecord, MetadataCatalog,
    NameMatch, OwnedGame, PrimaryCatalog, ReviewAggregator,
};
use crate::error::{Error, Result};
use crate::user::User;

fn outage(service: &'static str) -> Error {
    Error::Api {
        service,
        status: 503,
        message: "unavailable".to_string(),
    }
}

pub fn record(id: u64, name: &str) -> GameRecord {
    GameRecord {
        id,
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn estimate(title: &str, similarity: f64, hours: f64) -> CompletionEstimate {
    CompletionEstimate {
        title: title.to_string(),
        similarity,
        completionist_hours: hours,
    }
}

#[derive(Default)]
pub struct FakeSteam {
    pub games: Vec<OwnedGame>,
}

impl FakeSteam {
    pub fn with_games(games: &[(u32, &str)]) -> Self {
        Self {
            games: games
                .iter()
                .map(|&(id, name)| OwnedGame {
                    id,
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl PrimaryCatalog for FakeSteam {
    fn resolve_user(&self, user: &str) -> Result<User> {
        Ok(User::new("76561197990222251", user))
    }

    fn owned_games(&self, _steam_id: &str) -> Result<Vec<OwnedGame>> {
        Ok(self.games.clone())
    }
}

/// In-memory IGDB that records every per-title request it receives.
#[derive(Default)]
pub struct FakeMetadata {
    pub refs: Vec<ExternalRef>,
    pub records: Vec<GameRecord>,
    pub by_name: HashMap<String, Vec<NameMatch>>,
    pub failing_names: HashSet<String>,
    pub searched: RefCell<Vec<String>>,
    pub name_lookups: RefCell<Vec<u64>>,
}

impl FakeMetadata {
    pub fn with_ref(mut self, uid: &str, game: u64) -> Self {
        self.refs.push(ExternalRef {
            uid: uid.to_string(),
            game,
        });
        self
    }

    pub fn with_record(mut self, record: GameRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_title(mut self, title: &str, matches: &[(u64, &str)]) -> Self {
        self.by_name.insert(
            title.to_string(),
            matches
                .iter()
                .map(|&(id, name)| NameMatch {
                    id,
                    name: name.to_string(),
                })
                .collect(),
        );
        self
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.failing_names.insert(title.to_string());
        self
    }
}

impl MetadataCatalog for FakeMetadata {
    fn external_refs(&self, primary_ids: &[u32]) -> Result<Vec<ExternalRef>> {
        let wanted: HashSet<String> = primary_ids.iter().map(u32::to_string).collect();
        Ok(self
            .refs
            .iter()
            .filter(|r| wanted.contains(&r.uid))
            .cloned()
            .collect())
    }

    fn games(&self, ids: &[u64]) -> Result<Vec<GameRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    fn search_by_name(&self, name: &str) -> Result<Vec<NameMatch>> {
        self.searched.borrow_mut().push(name.to_string());
        if self.failing_names.contains(name) {
            return Err(outage("IGDB"));
        }
        Ok(self.by_name.get(name).cloned().unwrap_or_default())
    }

    fn game_name(&self, id: u64) -> Result<Option<String>> {
        self.name_lookups.borrow_mut().push(id);
        Ok(self
            .records
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone()))
    }
}

#[derive(Default)]
pub struct FakeCompletion {
    pub results: HashMap<String, Vec<CompletionEstimate>>,
    pub failing: HashSet<String>,
    pub queries: RefCell<Vec<String>>,
}

impl FakeCompletion {
    pub fn with(mut self, query: &str, results: Vec<CompletionEstimate>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }
}

impl CompletionTimeService for FakeCompletion {
    fn search(&self, query: &str) -> Result<Vec<CompletionEstimate>> {
        self.queries.borrow_mut().push(query.to_string());
        if self.failing.contains(query) {
            return Err(outage("HowLongToBeat"));
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeReviews {
    pub scores: HashMap<u32, f64>,
}

impl ReviewAggregator for FakeReviews {
    fn review_score(&self, primary_id: u32) -> Result<Option<f64>> {
        Ok(self.scores.get(&primary_id).copied())
    }
}
