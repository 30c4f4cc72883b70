//! FusBuddy360 user configuration
//!
//! API keys and the preferred LLM provider live in a per-user `config.json`,
//! outside any project directory. Environment variables take precedence over
//! stored keys when resolving the active provider.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::redaction::mask_api_key;

pub const CONFIG_DIR_ENV: &str = "FUSBUDDY360_CONFIG_DIR";
pub const CONFIG_FILE_NAME: &str = "config.json";
const APP_DIR_NAME: &str = "FusBuddy360";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a per-user data directory")]
    NoDataDir,

    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// A hosted model provider the coach can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Gemini,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Gemini => "gemini",
        }
    }

    /// Environment variables checked before the config file, in order.
    pub fn env_vars(&self) -> [&'static str; 2] {
        match self {
            LlmProvider::OpenAi => ["OPENAI_API_KEY", "FUSBUDDY360_OPENAI_API_KEY"],
            LlmProvider::Gemini => ["GEMINI_API_KEY", "FUSBUDDY360_GEMINI_API_KEY"],
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "gemini" => Ok(LlmProvider::Gemini),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Which provider(s) to try when resolving a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    Auto,
    #[serde(rename = "openai")]
    OpenAi,
    #[default]
    Gemini,
}

impl ProviderPreference {
    /// Lenient parse: anything unrecognised falls back to Gemini.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Self::Auto,
            "openai" => Self::OpenAi,
            _ => Self::Gemini,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    /// Providers to try, in order.
    pub fn candidates(&self) -> &'static [LlmProvider] {
        match self {
            Self::Auto => &[LlmProvider::Gemini, LlmProvider::OpenAi],
            Self::OpenAi => &[LlmProvider::OpenAi],
            Self::Gemini => &[LlmProvider::Gemini],
        }
    }
}

/// Per-user settings persisted as `config.json`.
///
/// Fields are read one at a time: a mistyped value is dropped on its own and
/// keys this crate does not know are carried through `extra` on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,

    pub llm_provider: ProviderPreference,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for UserConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Map::<String, Value>::deserialize(deserializer).map(Self::from_map)
    }
}

impl UserConfig {
    fn from_map(mut map: Map<String, Value>) -> Self {
        fn take_string(map: &mut Map<String, Value>, field: &str) -> Option<String> {
            match map.remove(field)? {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => {
                    warn!("Ignoring {} in user config: expected a string, got {}", field, other);
                    None
                }
            }
        }

        let openai_api_key = take_string(&mut map, "openai_api_key");
        let gemini_api_key = take_string(&mut map, "gemini_api_key");
        let llm_provider = take_string(&mut map, "llm_provider")
            .map(|v| ProviderPreference::parse(&v))
            .unwrap_or_default();
        Self {
            openai_api_key,
            gemini_api_key,
            llm_provider,
            extra: map,
        }
    }

    /// Load from `path`. A missing, unreadable or non-object file yields
    /// defaults; individual bad fields are dropped.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No user config at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Self::from_map(map),
            Ok(other) => {
                warn!(
                    "Ignoring user config {}: expected an object, got {}",
                    path.display(),
                    other
                );
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring invalid user config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved user config to {}", path.display());
        Ok(())
    }

    /// Stored key for `provider`, trimmed; blank keys count as absent.
    pub fn api_key(&self, provider: LlmProvider) -> Option<&str> {
        let key = match provider {
            LlmProvider::OpenAi => self.openai_api_key.as_deref(),
            LlmProvider::Gemini => self.gemini_api_key.as_deref(),
        }?;
        let key = key.trim();
        (!key.is_empty()).then_some(key)
    }

    pub fn set_api_key(&mut self, provider: LlmProvider, key: &str) {
        let key = Some(key.trim().to_string());
        match provider {
            LlmProvider::OpenAi => self.openai_api_key = key,
            LlmProvider::Gemini => self.gemini_api_key = key,
        }
    }
}

/// Directory holding `config.json`.
///
/// `FUSBUDDY360_CONFIG_DIR` wins; otherwise the platform data directory
/// (`%APPDATA%`, `~/Library/Application Support`, `~/.local/share`).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::data_dir()
        .map(|base| base.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Where a resolved key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Env(&'static str),
    ConfigFile,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub provider: LlmProvider,
    pub api_key: String,
    pub source: KeySource,
}

impl ResolvedKey {
    pub fn preview(&self) -> String {
        mask_api_key(&self.api_key)
    }
}

// keys never reach Debug output
impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("provider", &self.provider)
            .field("api_key", &self.preview())
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve the active provider and key from the process environment and `cfg`.
pub fn detect_provider(cfg: &UserConfig) -> Option<ResolvedKey> {
    detect_provider_with(cfg, |name| std::env::var(name).ok())
}

/// Resolve the active provider using `env` for variable lookups.
///
/// Candidates follow the preference order (Gemini before OpenAI for `auto`);
/// for each candidate the environment is checked before the config file.
pub fn detect_provider_with<F>(cfg: &UserConfig, env: F) -> Option<ResolvedKey>
where
    F: Fn(&str) -> Option<String>,
{
    for provider in cfg.llm_provider.candidates() {
        for var in provider.env_vars() {
            if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
                return Some(ResolvedKey {
                    provider: *provider,
                    api_key: value.trim().to_string(),
                    source: KeySource::Env(var),
                });
            }
        }
        if let Some(key) = cfg.api_key(*provider) {
            return Some(ResolvedKey {
                provider: *provider,
                api_key: key.to_string(),
                source: KeySource::ConfigFile,
            });
        }
    }
    None
}
