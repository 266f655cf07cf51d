//! Steam to IGDB identifier resolution.
//!
//! Direct external references are tried first, then an exact title search
//! (after applying the override table). The first hit wins in both cases;
//! no similarity scoring happens here.

use log::debug;

use crate::catalog::{ExternalRef, MetadataCatalog};
use crate::error::Result;
use crate::game::{GameEntity, Warning};
use crate::lists::{Overrides, SupplementalEntry};

/// Assigns `secondary_id` to every Steam entity that can be matched.
///
/// Supplemental entities are left alone. Entities that match neither way
/// keep `secondary_id == None` and produce a [`Warning::Unresolved`].
pub fn resolve_identifiers(
    games: &mut [GameEntity],
    refs: &[ExternalRef],
    catalog: &dyn MetadataCatalog,
    overrides: &Overrides,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    for game in games.iter_mut() {
        let Some(primary_id) = game.primary_id else {
            continue;
        };
        if game.secondary_id.is_some() {
            continue;
        }

        if let Some(igdb_id) = direct_match(primary_id, refs) {
            game.secondary_id = Some(igdb_id);
            continue;
        }

        let title = overrides.lookup_name(&game.name);
        match catalog.search_by_name(title) {
            Ok(matches) => match matches.first() {
                Some(found) => {
                    debug!("matched {} to igdb {} ({}) by name", game.name, found.id, found.name);
                    game.secondary_id = Some(found.id);
                }
                None => Warning::Unresolved {
                    name: game.name.clone(),
                }
                .record(&mut warnings),
            },
            Err(e) => Warning::LookupFailed {
                name: game.name.clone(),
                stage: "IGDB name",
                reason: e.to_string(),
            }
            .record(&mut warnings),
        }
    }

    warnings
}

/// The first external reference whose uid is this Steam app id.
fn direct_match(primary_id: u32, refs: &[ExternalRef]) -> Option<u64> {
    let uid = primary_id.to_string();
    refs.iter().find(|r| r.uid == uid).map(|r| r.game)
}

/// Builds entities for the supplemental list, taking IGDB's canonical name
/// where it has one.
pub fn supplemental_entities(
    entries: &[SupplementalEntry],
    catalog: &dyn MetadataCatalog,
) -> Result<Vec<GameEntity>> {
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<u64> = entries.iter().map(|e| e.secondary_id).collect();
    let records = catalog.games(&ids)?;

    Ok(entries
        .iter()
        .map(|entry| {
            let name = records
                .iter()
                .find(|r| r.id == entry.secondary_id && !r.name.is_empty())
                .map_or_else(|| entry.name.clone(), |r| r.name.clone());
            GameEntity::supplemental(name, entry.secondary_id)
        })
        .collect())
}
