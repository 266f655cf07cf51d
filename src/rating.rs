use crate::catalog::GameRecord;
use crate::game::{round2, GameCategory, GameEntity, Warning};

/// A rating and, when its vote count is known, rating × count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub rating: f64,
    pub weighted: Option<f64>,
}

/// Picks the rating to rank a record by.
///
/// Complete pairs win over bare ratings, and the user rating wins over the
/// critic (aggregated) rating. A pair is complete only with a positive count.
pub fn score(record: &GameRecord) -> Option<Score> {
    let pair = |rating: Option<f64>, count: Option<u64>| match (rating, count) {
        (Some(rating), Some(count)) if count > 0 => Some((rating, count)),
        _ => None,
    };

    if let Some((rating, count)) = pair(record.rating, record.rating_count)
        .or_else(|| pair(record.aggregated_rating, record.aggregated_rating_count))
    {
        return Some(Score {
            rating: round2(rating),
            weighted: Some(round2(rating * count as f64)),
        });
    }

    record
        .rating
        .or(record.aggregated_rating)
        .map(|rating| Score {
            rating: round2(rating),
            weighted: None,
        })
}

/// Copies parent, category and score from each entity's IGDB record.
///
/// Entities without an IGDB id were already reported by the resolver and
/// are skipped silently.
pub fn apply_ratings(games: &mut [GameEntity], records: &[GameRecord]) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for game in games.iter_mut() {
        let Some(id) = game.secondary_id else {
            continue;
        };
        let Some(record) = records.iter().find(|r| r.id == id) else {
            Warning::MetadataMissing {
                name: game.name.clone(),
                id,
            }
            .record(&mut warnings);
            continue;
        };

        if let Some(parent) = record.parent_game {
            game.parent_id = Some(parent);
        }
        game.category = record.category.map(GameCategory::from);

        match score(record) {
            Some(score) => {
                game.rating = Some(score.rating);
                game.weighted_rating = score.weighted;
            }
            None => Warning::RatingMissing {
                name: game.name.clone(),
            }
            .record(&mut warnings),
        }
    }

    warnings
}
