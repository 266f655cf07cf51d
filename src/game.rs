use std::fmt;

/// One title in the aggregated library.
///
/// Fields start out unset and are filled in place by the pipeline stages.
/// A stage that finds nothing leaves its fields unset; nothing is ever removed.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEntity {
    pub name: String,
    /// Steam app id. `None` for entries that came from the supplemental list.
    pub primary_id: Option<u32>,
    pub secondary_id: Option<u64>,
    pub parent_id: Option<u64>,
    pub category: Option<GameCategory>,
    pub rating: Option<f64>,
    pub weighted_rating: Option<f64>,
    pub completion: CompletionTime,
    pub review_score: Option<f64>,
}

impl GameEntity {
    pub const fn new(name: String, primary_id: u32) -> Self {
        Self {
            name,
            primary_id: Some(primary_id),
            secondary_id: None,
            parent_id: None,
            category: None,
            rating: None,
            weighted_rating: None,
            completion: CompletionTime::Pending,
            review_score: None,
        }
    }

    /// An entry with no Steam presence, already pinned to an IGDB id.
    pub const fn supplemental(name: String, secondary_id: u64) -> Self {
        Self {
            name,
            primary_id: None,
            secondary_id: Some(secondary_id),
            parent_id: None,
            category: None,
            rating: None,
            weighted_rating: None,
            completion: CompletionTime::Pending,
            review_score: None,
        }
    }

    pub const fn is_supplemental(&self) -> bool {
        self.primary_id.is_none()
    }
}

impl fmt::Display for GameEntity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (steam {} / igdb {}) :: {} :: {} :: {} :: {}",
            self.name,
            self.primary_id.unwrap_or(0),
            sentinel(self.secondary_id),
            sentinel(self.parent_id),
            decimal(self.rating),
            decimal(self.weighted_rating),
            self.completion,
        )
    }
}

/// Renders an unset field as `-1`.
pub fn sentinel<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| v.to_string())
}

/// Two-decimal rendering, `-1` when unset.
pub fn decimal(value: Option<f64>) -> String {
    value.map_or_else(|| "-1".to_string(), |v| format!("{v:.2}"))
}

/// Completionist estimate in hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionTime {
    /// Not looked up yet.
    Pending,
    Hours(f64),
    NotFound,
}

impl fmt::Display for CompletionTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "-1"),
            Self::Hours(hours) => write!(f, "{hours:.2}"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// IGDB's classification of a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameCategory {
    MainGame,
    DlcAddon,
    Expansion,
    Bundle,
    StandaloneExpansion,
    Mod,
    Episode,
    Season,
    Remake,
    Remaster,
    ExpandedGame,
    Port,
    Fork,
    Pack,
    Update,
    Unknown(i64),
}

impl From<i64> for GameCategory {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::MainGame,
            1 => Self::DlcAddon,
            2 => Self::Expansion,
            3 => Self::Bundle,
            4 => Self::StandaloneExpansion,
            5 => Self::Mod,
            6 => Self::Episode,
            7 => Self::Season,
            8 => Self::Remake,
            9 => Self::Remaster,
            10 => Self::ExpandedGame,
            11 => Self::Port,
            12 => Self::Fork,
            13 => Self::Pack,
            14 => Self::Update,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::MainGame => "main_game",
            Self::DlcAddon => "dlc_addon",
            Self::Expansion => "expansion",
            Self::Bundle => "bundle",
            Self::StandaloneExpansion => "standalone_expansion",
            Self::Mod => "mod",
            Self::Episode => "episode",
            Self::Season => "season",
            Self::Remake => "remake",
            Self::Remaster => "remaster",
            Self::ExpandedGame => "expanded_game",
            Self::Port => "port",
            Self::Fork => "fork",
            Self::Pack => "pack",
            Self::Update => "update",
            Self::Unknown(code) => return write!(f, "unknown({code})"),
        };
        f.write_str(label)
    }
}

/// A recoverable miss, recorded per entity. The run always continues.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Neither the external reference nor the title matched an IGDB game.
    Unresolved { name: String },
    /// An IGDB id is known but the bulk metadata had no record for it.
    MetadataMissing { name: String, id: u64 },
    RatingMissing { name: String },
    CompletionNotFound { name: String },
    /// A per-entity request failed outright.
    LookupFailed {
        name: String,
        stage: &'static str,
        reason: String,
    },
}

impl Warning {
    /// Logs the warning and appends it to `warnings`.
    pub fn record(self, warnings: &mut Vec<Warning>) {
        log::warn!("{self}");
        warnings.push(self);
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Unresolved { name } => {
                write!(f, "could not cross-reference Steam ID or name for: {name}")
            }
            Self::MetadataMissing { name, id } => {
                write!(f, "no IGDB record returned for {name} (igdb {id})")
            }
            Self::RatingMissing { name } => write!(f, "no rating data for {name}"),
            Self::CompletionNotFound { name } => {
                write!(f, "no completion time found for {name}")
            }
            Self::LookupFailed {
                name,
                stage,
                reason,
            } => write!(f, "{stage} lookup failed for {name}: {reason}"),
        }
    }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
