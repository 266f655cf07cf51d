//! Completion-time lookup with a parent-title retry.

use log::{debug, info};

use crate::catalog::{CompletionEstimate, CompletionTimeService, MetadataCatalog};
use crate::error::Result;
use crate::game::{CompletionTime, GameEntity, Warning};

/// Keeps printable ASCII only, then trims.
pub fn sanitize(name: &str) -> String {
    let printable: String = name.chars().filter(|c| (' '..='~').contains(c)).collect();
    printable.trim().to_string()
}

/// The estimate with the highest similarity. Ties go to the earlier result.
pub fn best_match(results: &[CompletionEstimate]) -> Option<&CompletionEstimate> {
    results.iter().fold(None, |best, candidate| match best {
        Some(best) if best.similarity >= candidate.similarity => Some(best),
        _ => Some(candidate),
    })
}

/// Sanitizes `name`, searches, and returns the best match's hours.
pub fn lookup(service: &dyn CompletionTimeService, name: &str) -> Result<Option<f64>> {
    let query = sanitize(name);
    if query.is_empty() {
        return Ok(None);
    }
    let results = service.search(&query)?;
    Ok(best_match(&results).map(|best| {
        debug!("'{query}' matched '{}' ({:.2})", best.title, best.similarity);
        best.completionist_hours
    }))
}

/// Finds the completion time for one entity.
///
/// The parent title is only tried when the entity has a parent and the
/// lookup by its own name came back empty (or failed).
pub fn completion_time(
    game: &GameEntity,
    service: &dyn CompletionTimeService,
    catalog: &dyn MetadataCatalog,
    warnings: &mut Vec<Warning>,
) -> CompletionTime {
    match lookup(service, &game.name) {
        Ok(Some(hours)) => return CompletionTime::Hours(hours),
        Ok(None) => {}
        Err(e) => Warning::LookupFailed {
            name: game.name.clone(),
            stage: "HowLongToBeat",
            reason: e.to_string(),
        }
        .record(warnings),
    }

    let Some(parent_id) = game.parent_id else {
        return CompletionTime::NotFound;
    };

    info!("Retrying {} with parent game ID {parent_id}", game.name);
    let parent_name = match catalog.game_name(parent_id) {
        Ok(Some(parent_name)) => parent_name,
        Ok(None) => return CompletionTime::NotFound,
        Err(e) => {
            Warning::LookupFailed {
                name: game.name.clone(),
                stage: "IGDB parent",
                reason: e.to_string(),
            }
            .record(warnings);
            return CompletionTime::NotFound;
        }
    };
    info!("Matched {} to parent game {parent_name}", game.name);

    match lookup(service, &parent_name) {
        Ok(Some(hours)) => CompletionTime::Hours(hours),
        Ok(None) => CompletionTime::NotFound,
        Err(e) => {
            Warning::LookupFailed {
                name: game.name.clone(),
                stage: "HowLongToBeat",
                reason: e.to_string(),
            }
            .record(warnings);
            CompletionTime::NotFound
        }
    }
}

/// Fills `completion` for every entity, one sequential lookup each.
pub fn fill_completion_times(
    games: &mut [GameEntity],
    service: &dyn CompletionTimeService,
    catalog: &dyn MetadataCatalog,
) -> Vec<Warning> {
    let mut warnings = Vec::new();
    for game in games.iter_mut() {
        game.completion = completion_time(game, service, catalog, &mut warnings);
        if game.completion == CompletionTime::NotFound {
            Warning::CompletionNotFound {
                name: game.name.clone(),
            }
            .record(&mut warnings);
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::{estimate, record, FakeCompletion, FakeMetadata};

    fn with_parent(name: &str, parent: Option<u64>) -> GameEntity {
        let mut game = GameEntity::new(name.to_string(), 1);
        game.parent_id = parent;
        game
    }

    #[test]
    fn sanitize_drops_non_printable_and_trims() {
        assert_eq!(sanitize("  Foo Bar\t"), "Foo Bar");
        assert_eq!(sanitize("Portal™"), "Portal");
        assert_eq!(sanitize("Pokémon ™ "), "Pokmon");
        assert_eq!(sanitize("™"), "");
    }

    #[test]
    fn best_match_prefers_highest_similarity() {
        let results = vec![
            estimate("A", 0.5, 1.0),
            estimate("B", 0.9, 2.0),
            estimate("C", 0.7, 3.0),
        ];
        assert_eq!(best_match(&results).unwrap().title, "B");
    }

    #[test]
    fn best_match_ties_keep_service_order() {
        let results = vec![
            estimate("First", 0.8, 1.0),
            estimate("Second", 0.8, 2.0),
        ];
        assert_eq!(best_match(&results).unwrap().title, "First");
        assert!(best_match(&[]).is_none());
    }

    #[test]
    fn lookup_searches_sanitized_name() {
        let service =
            FakeCompletion::default().with("Foo Bar", vec![estimate("Foo Bar", 1.0, 7.25)]);
        assert_eq!(lookup(&service, " Foo Bar™ ").unwrap(), Some(7.25));
        assert_eq!(*service.queries.borrow(), vec!["Foo Bar".to_string()]);
    }

    #[test]
    fn blank_name_is_never_searched() {
        let service = FakeCompletion::default();
        assert_eq!(lookup(&service, "™™").unwrap(), None);
        assert!(service.queries.borrow().is_empty());
    }

    #[test]
    fn direct_hit_never_touches_parent() {
        let service =
            FakeCompletion::default().with("Foo Bar", vec![estimate("Foo Bar", 1.0, 3.0)]);
        let catalog = FakeMetadata::default().with_record(record(10, "Base"));
        let mut warnings = Vec::new();

        let game = with_parent("Foo Bar", Some(10));
        let time = completion_time(&game, &service, &catalog, &mut warnings);

        assert_eq!(time, CompletionTime::Hours(3.0));
        assert!(catalog.name_lookups.borrow().is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn empty_result_retries_with_parent_title() {
        let service = FakeCompletion::default().with("Base", vec![estimate("Base", 1.0, 12.5)]);
        let catalog = FakeMetadata::default().with_record(record(10, "Base"));
        let mut games = vec![with_parent("Foo Bar", Some(10))];

        let warnings = fill_completion_times(&mut games, &service, &catalog);

        assert_eq!(games[0].completion, CompletionTime::Hours(12.5));
        assert_eq!(*catalog.name_lookups.borrow(), vec![10]);
        assert_eq!(
            *service.queries.borrow(),
            vec!["Foo Bar".to_string(), "Base".to_string()]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn no_parent_means_not_found() {
        let service = FakeCompletion::default();
        let catalog = FakeMetadata::default();
        let mut games = vec![with_parent("Obscure", None)];

        let warnings = fill_completion_times(&mut games, &service, &catalog);

        assert_eq!(games[0].completion, CompletionTime::NotFound);
        assert!(catalog.name_lookups.borrow().is_empty());
        assert_eq!(
            warnings,
            vec![Warning::CompletionNotFound {
                name: "Obscure".to_string()
            }]
        );
    }

    #[test]
    fn parent_miss_is_not_found() {
        let service = FakeCompletion::default();
        let catalog = FakeMetadata::default().with_record(record(10, "Base"));
        let mut games = vec![with_parent("Foo Bar", Some(10))];

        fill_completion_times(&mut games, &service, &catalog);

        assert_eq!(games[0].completion, CompletionTime::NotFound);
        assert_eq!(service.queries.borrow().len(), 2);
    }

    #[test]
    fn unknown_parent_id_is_not_found() {
        let service = FakeCompletion::default();
        let catalog = FakeMetadata::default();
        let mut games = vec![with_parent("Foo Bar", Some(99))];

        fill_completion_times(&mut games, &service, &catalog);

        assert_eq!(games[0].completion, CompletionTime::NotFound);
        assert_eq!(service.queries.borrow().len(), 1);
    }

    #[test]
    fn failed_search_still_tries_parent() {
        let service = FakeCompletion::default()
            .failing_on("Foo Bar")
            .with("Base", vec![estimate("Base", 0.9, 4.0)]);
        let catalog = FakeMetadata::default().with_record(record(10, "Base"));
        let mut games = vec![with_parent("Foo Bar", Some(10))];

        let warnings = fill_completion_times(&mut games, &service, &catalog);

        assert_eq!(games[0].completion, CompletionTime::Hours(4.0));
        assert!(matches!(
            warnings.as_slice(),
            [Warning::LookupFailed { stage: "HowLongToBeat", .. }]
        ));
    }

    #[test]
    fn unavailable_service_leaves_every_title_not_found() {
        let service = FakeCompletion::default()
            .failing_on("Foo Bar")
            .failing_on("Base")
            .failing_on("Portal");
        let catalog = FakeMetadata::default().with_record(record(10, "Base"));
        let mut games = vec![
            with_parent("Foo Bar", Some(10)),
            with_parent("Portal", None),
        ];

        let warnings = fill_completion_times(&mut games, &service, &catalog);

        assert!(games.iter().all(|g| g.completion == CompletionTime::NotFound));
        let failed = warnings
            .iter()
            .filter(|w| matches!(w, Warning::LookupFailed { stage: "HowLongToBeat", .. }))
            .count();
        assert_eq!(failed, 3);
        assert_eq!(
            *service.queries.borrow(),
            vec!["Foo Bar".to_string(), "Base".to_string(), "Portal".to_string()]
        );
    }
}
