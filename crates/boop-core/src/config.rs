use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::environment::Environment;
use crate::error::{BoopError, BoopResult};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "boop.toml";
/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "BOOP_CONFIG";
/// Environment variable overriding [`TrackerConfig::disabled`].
pub const DISABLED_ENV_VAR: &str = "BOOP_DISABLED";
/// Environment variable overriding [`TrackerConfig::environment`].
pub const ENVIRONMENT_ENV_VAR: &str = "BOOP_ENVIRONMENT";

/// Static settings a tracker is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Identifies the event destination.
    pub application_id: String,
    /// Distinguishes instances of the same application.
    #[serde(default = "default_instance_id")]
    pub instance_id: String,
    /// Production writes to `application_id`, development to `application_id-dev`.
    #[serde(default)]
    pub environment: Environment,
    /// Global kill switch. Nothing is ever emitted while set.
    #[serde(default = "default_true")]
    pub disabled: bool,
    /// Turns off every session semantic while ordinary events still flow.
    #[serde(default)]
    pub session_tracking_disabled: bool,
    /// When false, session starts update state but are not written.
    #[serde(default = "default_true")]
    pub send_session_start_events: bool,
    /// When false, flops are classified but not written.
    #[serde(default = "default_true")]
    pub send_session_flop_events: bool,
    /// Inactivity timeout subtracted from every session duration.
    #[serde(default)]
    pub session_timeout_seconds: f64,
    /// Sessions shorter than this are reported as flops.
    #[serde(default)]
    pub minimum_viable_session_duration_seconds: Option<f64>,
}

fn default_instance_id() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

impl TrackerConfig {
    /// Defaults for everything except the application id.
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            instance_id: default_instance_id(),
            environment: Environment::default(),
            disabled: true,
            session_tracking_disabled: false,
            send_session_start_events: true,
            send_session_flop_events: true,
            session_timeout_seconds: 0.0,
            minimum_viable_session_duration_seconds: None,
        }
    }

    /// Sets the instance id.
    pub fn with_instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    /// Sets the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Clears the kill switch. Trackers are disabled by default.
    pub fn enabled(mut self) -> Self {
        self.disabled = false;
        self
    }

    /// Sets the kill switch.
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Turns session semantics off or on.
    pub fn with_session_tracking_disabled(mut self, disabled: bool) -> Self {
        self.session_tracking_disabled = disabled;
        self
    }

    /// Controls whether session starts are written.
    pub fn with_session_start_events(mut self, send: bool) -> Self {
        self.send_session_start_events = send;
        self
    }

    /// Controls whether flops are written.
    pub fn with_session_flop_events(mut self, send: bool) -> Self {
        self.send_session_flop_events = send;
        self
    }

    /// Sets the inactivity timeout in seconds.
    pub fn with_session_timeout(mut self, seconds: f64) -> Self {
        self.session_timeout_seconds = seconds;
        self
    }

    /// Sets the flop threshold in seconds.
    pub fn with_minimum_viable_session_duration(mut self, seconds: f64) -> Self {
        self.minimum_viable_session_duration_seconds = Some(seconds);
        self
    }

    /// The namespace events are written to.
    pub fn namespace(&self) -> String {
        self.environment.namespace(&self.application_id)
    }

    /// Rejects settings no tracker can run with.
    pub fn validate(&self) -> BoopResult<()> {
        if self.application_id.trim().is_empty() {
            return Err(BoopError::Config("application_id must not be empty".into()));
        }
        if !self.session_timeout_seconds.is_finite() || self.session_timeout_seconds < 0.0 {
            return Err(BoopError::Config(format!(
                "session_timeout_seconds must be a finite number >= 0, got {}",
                self.session_timeout_seconds
            )));
        }
        if let Some(min) = self.minimum_viable_session_duration_seconds {
            if !min.is_finite() || min < 0.0 {
                return Err(BoopError::Config(format!(
                    "minimum_viable_session_duration_seconds must be finite and >= 0, got {min}"
                )));
            }
        }
        Ok(())
    }

    /// Applies `BOOP_DISABLED` / `BOOP_ENVIRONMENT` style overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> BoopResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(DISABLED_ENV_VAR) {
            self.disabled = parse_bool(&raw).ok_or_else(|| {
                BoopError::Config(format!("{DISABLED_ENV_VAR} must be true/false/1/0, got '{raw}'"))
            })?;
            debug!(disabled = self.disabled, "Applied disabled override");
        }
        if let Some(raw) = lookup(ENVIRONMENT_ENV_VAR) {
            self.environment = raw.parse()?;
            debug!(environment = ?self.environment, "Applied environment override");
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Where events are persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SinkConfig {
    /// Kept in process memory.
    #[default]
    Memory,
    /// One JSON object per line, one file per namespace.
    Jsonl {
        /// Directory holding `<namespace>.jsonl` files.
        dir: PathBuf,
    },
    /// A remote document store reached over HTTP.
    Http {
        /// Root URL of the document store API.
        base_url: String,
        /// Sent as a bearer token when present.
        #[serde(default)]
        api_key: Option<String>,
        /// Per-request timeout.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    10
}

/// The on-disk configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoopConfig {
    /// Tracker settings.
    pub tracker: TrackerConfig,
    /// Sink settings.
    #[serde(default)]
    pub sink: SinkConfig,
}

impl BoopConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(s: &str) -> BoopResult<Self> {
        let config: BoopConfig = toml::from_str(s)?;
        config.tracker.validate()?;
        Ok(config)
    }

    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> BoopResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BoopError::ConfigNotFound(vec![path.to_path_buf()])
            } else {
                BoopError::Io(e)
            }
        })?;
        let config = Self::from_toml_str(&data)
            .map_err(|e| BoopError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "Loaded Boop configuration");
        Ok(config)
    }

    /// Locates, loads and applies process environment overrides.
    pub fn discover(explicit: Option<&Path>) -> BoopResult<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let path = locate(explicit, &lookup)?;
        let mut config = Self::load(&path)?;
        config.tracker.apply_overrides(lookup)?;
        config.tracker.validate()?;
        Ok(config)
    }
}

/// Candidate configuration paths in lookup order.
pub fn candidate_paths<F>(explicit: Option<&Path>, lookup: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }
    let mut paths = Vec::new();
    if let Some(path) = lookup(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    let config_home = lookup("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".config")));
    if let Some(dir) = config_home {
        paths.push(dir.join("boop").join(CONFIG_FILE_NAME));
    }
    paths
}

/// First existing candidate, or [`BoopError::ConfigNotFound`].
pub fn locate<F>(explicit: Option<&Path>, lookup: &F) -> BoopResult<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let candidates = candidate_paths(explicit, lookup);
    for path in &candidates {
        if path.is_file() {
            return Ok(path.clone());
        }
        debug!(path = %path.display(), "Boop configuration not found here");
    }
    Err(BoopError::ConfigNotFound(candidates))
}
