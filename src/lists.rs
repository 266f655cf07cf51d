//! Hand-maintained title overrides and supplemental (non-Steam) entries.
//!
//! Both files are headerless CSV: `originalName,alternateName` and
//! `name,igdbId`. Every line is data; titles may legitimately start with `#`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use log::{info, warn};

use crate::error::Result;

/// Steam title to IGDB title corrections, applied before a name lookup.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides(HashMap<String, String>);

impl Overrides {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut map = HashMap::new();
        for (line, fields) in rows(reader)? {
            let [original, alternate] = fields;
            if map.contains_key(&original) {
                warn!("override line {line}: '{original}' already overridden; keeping the first");
                continue;
            }
            map.insert(original, alternate);
        }
        Ok(Self(map))
    }

    /// A missing file is an empty override table.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::from_reader(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no override file at {}", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The name to search IGDB with: the override if there is one, else `name` itself.
    ///
    /// Keys are stored trimmed, so `name` is trimmed before the lookup too.
    pub fn lookup_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.0.get(name.trim()).map_or(name, String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A game owned outside Steam, pinned to an IGDB id by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct SupplementalEntry {
    pub name: String,
    pub secondary_id: u64,
}

pub fn read_supplemental<R: Read>(reader: R) -> Result<Vec<SupplementalEntry>> {
    let mut entries = Vec::new();
    for (line, [name, id]) in rows(reader)? {
        let Ok(secondary_id) = id.parse::<u64>() else {
            warn!("supplemental line {line}: '{id}' is not an IGDB id; skipping {name}");
            continue;
        };
        entries.push(SupplementalEntry { name, secondary_id });
    }
    Ok(entries)
}

/// A missing file means no supplemental entries.
pub fn load_supplemental(path: &Path) -> Result<Vec<SupplementalEntry>> {
    match File::open(path) {
        Ok(file) => read_supplemental(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("no supplemental file at {}", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// First two fields of every usable row, with its 1-based line number.
fn rows<R: Read>(reader: R) -> Result<Vec<(u64, [String; 2])>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        match (record.get(0), record.get(1)) {
            (Some(first), Some(second)) if !first.is_empty() && !second.is_empty() => {
                rows.push((line, [first.to_string(), second.to_string()]));
            }
            _ => warn!("line {line}: expected two fields, skipping"),
        }
    }
    Ok(rows)
}
