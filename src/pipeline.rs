use std::collections::BTreeMap;

use log::{info, warn};

use crate::catalog::{CompletionTimeService, MetadataCatalog, PrimaryCatalog, ReviewAggregator};
use crate::completion::fill_completion_times;
use crate::error::Result;
use crate::game::{GameEntity, Warning};
use crate::lists::{Overrides, SupplementalEntry};
use crate::rating::apply_ratings;
use crate::report::sort_by_weighted_rating;
use crate::resolve::{resolve_identifiers, supplemental_entities};
use crate::user::User;

/// The clients a run reads from, built once in `main`.
pub struct Sources<'a> {
    pub primary: &'a dyn PrimaryCatalog,
    pub metadata: &'a dyn MetadataCatalog,
    pub completion: &'a dyn CompletionTimeService,
    pub reviews: Option<&'a dyn ReviewAggregator>,
}

pub struct Outcome {
    /// Sorted ascending by weighted rating.
    pub games: Vec<GameEntity>,
    pub warnings: Vec<Warning>,
}

/// Runs every stage in order over the user's library.
///
/// Per-title misses become warnings. Only failures of the bulk queries
/// (owned games, external references, game records) abort the run.
pub fn run(
    user: &User,
    sources: &Sources,
    overrides: &Overrides,
    supplemental: &[SupplementalEntry],
) -> Result<Outcome> {
    let owned = sources.primary.owned_games(&user.steam_id)?;
    info!("Steam game count: {}", owned.len());

    let mut games: Vec<GameEntity> = owned
        .into_iter()
        .map(|g| GameEntity::new(g.name, g.id))
        .collect();

    let primary_ids: Vec<u32> = games.iter().filter_map(|g| g.primary_id).collect();
    let refs = sources.metadata.external_refs(&primary_ids)?;
    info!("IGDB external references: {}", refs.len());

    let mut warnings = resolve_identifiers(&mut games, &refs, sources.metadata, overrides);

    let extra = supplemental_entities(supplemental, sources.metadata)?;
    info!("Supplemental game count: {}", extra.len());
    games.extend(extra);

    let ids: Vec<u64> = games.iter().filter_map(|g| g.secondary_id).collect();
    let records = sources.metadata.games(&ids)?;
    warnings.extend(apply_ratings(&mut games, &records));
    log_categories(&games);

    if let Some(reviews) = sources.reviews {
        warnings.extend(apply_review_scores(&mut games, reviews));
    }

    warnings.extend(fill_completion_times(
        &mut games,
        sources.completion,
        sources.metadata,
    ));

    sort_by_weighted_rating(&mut games);
    Ok(Outcome { games, warnings })
}

/// Fetches the SteamSpy score of every Steam entity.
pub fn apply_review_scores(
    games: &mut [GameEntity],
    reviews: &dyn ReviewAggregator,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for game in games.iter_mut() {
        let Some(primary_id) = game.primary_id else {
            continue;
        };
        match reviews.review_score(primary_id) {
            Ok(score) => game.review_score = score,
            Err(e) => Warning::LookupFailed {
                name: game.name.clone(),
                stage: "SteamSpy",
                reason: e.to_string(),
            }
            .record(&mut warnings),
        }
    }
    warnings
}

/// Counts per IGDB category, for the log.
pub fn category_counts(games: &[GameEntity]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for game in games {
        let label = game
            .category
            .map_or_else(|| "uncategorized".to_string(), |c| c.to_string());
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

fn log_categories(games: &[GameEntity]) {
    for (category, count) in category_counts(games) {
        info!("{category}: {count}");
    }
    let unresolved = games.iter().filter(|g| g.secondary_id.is_none()).count();
    if unresolved > 0 {
        warn!("{unresolved} game(s) have no IGDB match");
    }
}
