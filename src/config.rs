//! Client configuration loaded from the process environment.
//!
//! Credentials are read once at startup. A missing API key is not an error here;
//! the gateway reports it as an authentication failure on the first generation.

use std::time::Duration;
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_ENDPOINT_VAR: &str = "OPENAI_API_ENDPOINT";
pub const TIMEOUT_VAR: &str = "OPENAI_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MODEL_VERSION: &str = "2024-11-20";

/// Load variables from a `.env` file into the process environment.
///
/// A missing file is fine. Variables already present in the environment win.
pub fn load_environment() {
    match dotenv::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) => debug!(error = %e, "No environment file loaded"),
    }
}

/// A model identifier with an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Pin this model to a dated release.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The identifier sent to the provider, e.g. `gpt-4o-2024-11-20`.
    pub fn id(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl Default for ModelRef {
    fn default() -> Self {
        ModelRef::new(DEFAULT_MODEL).with_version(DEFAULT_MODEL_VERSION)
    }
}

/// Provider configuration shared by the gateway and the broker.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub model: ModelRef,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            model: ModelRef::default(),
        }
    }
}

impl ClientConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).filter(|key| !key.trim().is_empty());

        let base_url = lookup(API_ENDPOINT_VAR)
            .filter(|url| !url.trim().is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = lookup(TIMEOUT_VAR).and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_VAR);
                None
            }
        });

        Self {
            api_key,
            base_url,
            timeout,
            model: ModelRef::default(),
        }
    }

    pub fn with_model(mut self, model: ModelRef) -> Self {
        self.model = model;
        self
    }
}
