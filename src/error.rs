/// Errors that stop a run, or that a pipeline stage downgrades to a [`Warning`].
///
/// [`Warning`]: crate::game::Warning
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("{service} error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service} still failing after {attempts} attempts")]
    RetriesExhausted {
        service: &'static str,
        attempts: u32,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
