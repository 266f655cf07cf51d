use std::cmp::Ordering;
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::game::{decimal, sentinel, GameEntity};

pub const HEADER: [&str; 6] = [
    "Name",
    "Secondary ID",
    "Parent ID",
    "Rating",
    "Weighted Rating",
    "Completion Time",
];

const REVIEW_HEADER: &str = "Review Score";

/// Stable ascending sort on weighted rating; unset ratings come first.
pub fn sort_by_weighted_rating(games: &mut [GameEntity]) {
    games.sort_by(|a, b| {
        a.weighted_rating
            .partial_cmp(&b.weighted_rating)
            .unwrap_or(Ordering::Equal)
    });
}

pub fn write_report<W: Write>(writer: W, games: &[GameEntity], with_reviews: bool) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = HEADER.to_vec();
    if with_reviews {
        header.push(REVIEW_HEADER);
    }
    csv.write_record(&header)?;

    for game in games {
        let mut row = vec![
            game.name.clone(),
            sentinel(game.secondary_id),
            sentinel(game.parent_id),
            decimal(game.rating),
            decimal(game.weighted_rating),
            game.completion.to_string(),
        ];
        if with_reviews {
            row.push(decimal(game.review_score));
        }
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_report_file(path: &Path, games: &[GameEntity], with_reviews: bool) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_report(file, games, with_reviews)
}
