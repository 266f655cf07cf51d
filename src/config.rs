//! Run configuration: YAML file, then environment, then command-line flags.
//!
//! ```yaml
//! steam:
//!   user: gschive
//!   api_key_file: steam_api_key.secret
//!   retry:
//!     max_attempts: 3
//!     rate_limit_delay_secs: 60
//!     forbidden_delay_secs: 10
//! igdb:
//!   client_id: abc
//!   client_secret: def
//!   batch_size: 500
//! hltb:
//!   case_insensitive: false
//! files:
//!   overrides: override.csv
//!   supplemental: supplemental.csv
//!   output: output.csv
//!   log: backlog-ranker.log
//! ```

use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ArgMatches;
use log::LevelFilter;
use yaml_rust2::{Yaml, YamlLoader};

use crate::catalog::igdb::MAX_BATCH;
use crate::catalog::steam::RetryPolicy;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG: &str = "backlog-ranker.yaml";

#[derive(Debug, Clone, PartialEq)]
pub struct Files {
    pub overrides: PathBuf,
    pub supplemental: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            overrides: PathBuf::from("override.csv"),
            supplemental: PathBuf::from("supplemental.csv"),
            output: PathBuf::from("output.csv"),
            log: PathBuf::from("backlog-ranker.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub steam_user: Option<String>,
    pub steam_api_key_file: Option<PathBuf>,
    /// Set from `STEAM_API_KEY`; the key file wins when both are present.
    pub steam_api_key: Option<String>,
    pub retry: RetryPolicy,
    pub igdb_client_id: Option<String>,
    pub igdb_client_secret: Option<String>,
    pub igdb_batch_size: usize,
    pub hltb_case_insensitive: bool,
    pub files: Files,
    pub with_reviews: bool,
    pub quiet: bool,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            steam_user: None,
            steam_api_key_file: None,
            steam_api_key: None,
            retry: RetryPolicy::default(),
            igdb_client_id: None,
            igdb_client_secret: None,
            igdb_batch_size: MAX_BATCH,
            hltb_case_insensitive: false,
            files: Files::default(),
            with_reviews: false,
            quiet: false,
            log_level: LevelFilter::Warn,
        }
    }
}

/// Everything needed to open the catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub steam_user: String,
    pub steam_api_key: String,
    pub igdb_client_id: String,
    pub igdb_client_secret: String,
}

impl Config {
    /// Reads the config file (if any), then layers environment and flags on top.
    ///
    /// A missing default config file is fine; a missing file named on the
    /// command line is not.
    pub fn load(matches: &ArgMatches) -> Result<Self> {
        let explicit = matches.get_one::<String>("config");
        let path = Path::new(explicit.map_or(DEFAULT_CONFIG, String::as_str));

        let mut config = match read_to_string(path) {
            Ok(text) => Self::from_yaml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                Self::default()
            }
            Err(e) => {
                return Err(Error::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_args(matches);
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let docs = YamlLoader::load_from_str(text)?;
        let mut config = Self::default();
        let Some(doc) = docs.first() else {
            return Ok(config);
        };

        let steam = &doc["steam"];
        config.steam_user = string(&steam["user"]);
        config.steam_api_key_file = string(&steam["api_key_file"]).map(PathBuf::from);

        let retry = &steam["retry"];
        if let Some(attempts) = count(&retry["max_attempts"], "steam.retry.max_attempts")? {
            config.retry.max_attempts = u32::try_from(attempts.max(1)).unwrap_or(u32::MAX);
        }
        let rate_limit = count(&retry["rate_limit_delay_secs"], "steam.retry.rate_limit_delay_secs")?;
        if let Some(secs) = rate_limit {
            config.retry.rate_limit_delay = Duration::from_secs(secs);
        }
        let forbidden = count(&retry["forbidden_delay_secs"], "steam.retry.forbidden_delay_secs")?;
        if let Some(secs) = forbidden {
            config.retry.forbidden_delay = Duration::from_secs(secs);
        }

        let igdb = &doc["igdb"];
        config.igdb_client_id = string(&igdb["client_id"]);
        config.igdb_client_secret = string(&igdb["client_secret"]);
        if let Some(size) = count(&igdb["batch_size"], "igdb.batch_size")? {
            config.igdb_batch_size = usize::try_from(size).unwrap_or(MAX_BATCH).clamp(1, MAX_BATCH);
        }

        if let Some(flag) = doc["hltb"]["case_insensitive"].as_bool() {
            config.hltb_case_insensitive = flag;
        }

        let files = &doc["files"];
        for (key, slot) in [
            ("overrides", &mut config.files.overrides),
            ("supplemental", &mut config.files.supplemental),
            ("output", &mut config.files.output),
            ("log", &mut config.files.log),
        ] {
            if let Some(path) = string(&files[key]) {
                *slot = PathBuf::from(path);
            }
        }

        Ok(config)
    }

    /// Fills secrets the file left out from the environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.steam_api_key.is_none() {
            self.steam_api_key = var("STEAM_API_KEY");
        }
        if self.igdb_client_id.is_none() {
            self.igdb_client_id = var("IGDB_CLIENT_ID");
        }
        if self.igdb_client_secret.is_none() {
            self.igdb_client_secret = var("IGDB_CLIENT_SECRET");
        }
    }

    pub fn apply_args(&mut self, matches: &ArgMatches) {
        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from);

        if let Some(key_file) = path("api_key") {
            self.steam_api_key_file = Some(key_file);
        }
        if let Some(user) = matches.get_one::<String>("user") {
            self.steam_user = Some(user.clone());
        }
        if let Some(output) = path("output") {
            self.files.output = output;
        }
        if let Some(overrides) = path("overrides") {
            self.files.overrides = overrides;
        }
        if let Some(supplemental) = path("supplemental") {
            self.files.supplemental = supplemental;
        }
        if let Some(level) = matches
            .get_one::<String>("log_level")
            .and_then(|l| l.parse().ok())
        {
            self.log_level = level;
        }
        self.with_reviews |= matches.get_flag("with_reviews");
        self.quiet |= matches.get_flag("quiet");
    }

    /// Checks that every secret is present, reading the Steam key file if set.
    pub fn credentials(&self) -> Result<Credentials> {
        let steam_api_key = match &self.steam_api_key_file {
            Some(path) => read_to_string(path).map_err(|e| {
                Error::Config(format!("cannot read Steam API key file {}: {e}", path.display()))
            })?,
            None => self.steam_api_key.clone().ok_or_else(|| {
                Error::Config("no Steam API key (use --api-key or STEAM_API_KEY)".to_string())
            })?,
        };
        let steam_api_key = steam_api_key.trim().to_string();
        if steam_api_key.is_empty() {
            return Err(Error::Config("Steam API key is empty".to_string()));
        }

        let required = |value: &Option<String>, what: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("missing {what}")))
        };

        Ok(Credentials {
            steam_user: required(&self.steam_user, "Steam user (steam.user or --user)")?,
            steam_api_key,
            igdb_client_id: required(&self.igdb_client_id, "IGDB client id")?,
            igdb_client_secret: required(&self.igdb_client_secret, "IGDB client secret")?,
        })
    }
}

/// Strings and bare numbers both read as text; a SteamID64 is parsed as an integer by YAML.
fn string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Real(r) => Some(r.clone()),
        _ => None,
    }
}

fn count(value: &Yaml, key: &str) -> Result<Option<u64>> {
    match value {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(i) => u64::try_from(*i)
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must not be negative"))),
        _ => Err(Error::Config(format!("{key} must be a whole number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_command;
    use std::io::Write;

    const SAMPLE: &str = r#"
steam:
  user: 76561197990222251
  api_key_file: key.secret
  retry:
    max_attempts: 5
    rate_limit_delay_secs: 30
igdb:
  client_id: abc
  client_secret: def
  batch_size: 9000
hltb:
  case_insensitive: true
files:
  output: ranked.csv
"#;

    #[test]
    fn reads_yaml_sections() {
        let config = Config::from_yaml_str(SAMPLE).unwrap();

        assert_eq!(config.steam_user.as_deref(), Some("76561197990222251"));
        assert_eq!(config.steam_api_key_file, Some(PathBuf::from("key.secret")));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.rate_limit_delay, Duration::from_secs(30));
        assert_eq!(config.retry.forbidden_delay, Duration::from_secs(10));
        assert_eq!(config.igdb_client_id.as_deref(), Some("abc"));
        assert_eq!(config.igdb_batch_size, MAX_BATCH);
        assert!(config.hltb_case_insensitive);
        assert_eq!(config.files.output, PathBuf::from("ranked.csv"));
        assert_eq!(config.files.overrides, PathBuf::from("override.csv"));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn rejects_negative_delays() {
        let result = Config::from_yaml_str("steam:\n  retry:\n    forbidden_delay_secs: -4\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            Config::from_yaml_str("steam: [unclosed"),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn environment_fills_only_missing_values() {
        let mut config = Config::from_yaml_str(SAMPLE).unwrap();
        config.apply_env(|key| Some(format!("env-{key}")));

        assert_eq!(config.igdb_client_id.as_deref(), Some("abc"));
        assert_eq!(config.steam_api_key.as_deref(), Some("env-STEAM_API_KEY"));
    }

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::from_yaml_str(SAMPLE).unwrap();
        let matches = build_command()
            .try_get_matches_from([
                "backlog-ranker",
                "--user",
                "gschive",
                "-o",
                "elsewhere.csv",
                "--log-level",
                "debug",
                "-q",
            ])
            .unwrap();

        config.apply_args(&matches);

        assert_eq!(config.steam_user.as_deref(), Some("gschive"));
        assert_eq!(config.files.output, PathBuf::from("elsewhere.csv"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(config.quiet);
        assert!(!config.with_reviews);
    }

    #[test]
    fn credentials_read_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let key_path = dir.path().join("key.secret");
        let mut file = std::fs::File::create(&key_path).unwrap();
        writeln!(file, "  SECRETKEY  ").unwrap();

        let mut config = Config::from_yaml_str(SAMPLE).unwrap();
        config.steam_api_key_file = Some(key_path);

        let creds = config.credentials().unwrap();
        assert_eq!(creds.steam_api_key, "SECRETKEY");
        assert_eq!(creds.steam_user, "76561197990222251");
        assert_eq!(creds.igdb_client_secret, "def");
    }

    #[test]
    fn missing_secrets_are_config_errors() {
        let config = Config {
            steam_api_key: Some("key".to_string()),
            steam_user: Some("gschive".to_string()),
            ..Config::default()
        };
        let Err(Error::Config(message)) = config.credentials() else {
            panic!("expected a configuration error");
        };
        assert!(message.contains("IGDB client id"));

        assert!(matches!(
            Config::default().credentials(),
            Err(Error::Config(_))
        ));
    }
}
