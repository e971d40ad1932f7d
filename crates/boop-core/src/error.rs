use std::path::PathBuf;
use thiserror::Error;

/// A convenience `Result` alias using [`BoopError`].
pub type BoopResult<T> = Result<T, BoopError>;

/// Top-level error type for Boop.
///
/// Tracking calls never surface these. Only construction, configuration
/// and explicit waits on a write handle do.
#[derive(Error, Debug)]
pub enum BoopError {
    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),

    /// No configuration file was found at any of the searched locations.
    #[error("No Boop configuration file found (searched: {})", display_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    /// The event sink could not accept or complete a write.
    #[error("Sink error: {0}")]
    Sink(String),

    /// The remote document store rejected a write or was unreachable.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed TOML configuration file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
