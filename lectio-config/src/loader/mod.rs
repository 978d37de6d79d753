//! Layered configuration loading.
//!
//! Evaluation order, later layers winning:
//! 1) built-in defaults,
//! 2) a config file (`LECTIO_CONFIG_PATH`, an explicit path, or the first of
//!    [`DEFAULT_CONFIG_CANDIDATES`] found under the search root),
//! 3) `LECTIO_*` environment variables (after `.env` has been applied).

pub mod error;

use crate::constants::*;
use crate::models::{Config, ConfigSource};
use crate::validation::{ConfigWarnings, apply_guard_rails};
use error::ConfigLoadError;

use anyhow::anyhow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Result of a successful load: the config plus non-fatal findings.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    /// Merged and validated configuration.
    pub config: Config,
    /// Findings worth logging that did not stop the load.
    pub warnings: ConfigWarnings,
}

/// Builder that resolves a [`Config`] from defaults, a file and the
/// environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file: Option<PathBuf>,
    load_dotenv: bool,
    config_path: Option<PathBuf>,
    search_root: PathBuf,
    vars: Option<HashMap<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader rooted at the working directory that reads `.env` and the
    /// process environment.
    pub fn new() -> Self {
        Self {
            env_file: None,
            load_dotenv: true,
            config_path: None,
            search_root: PathBuf::from("."),
            vars: None,
        }
    }

    /// Load a specific env file instead of searching for `.env`.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Use this config file unless `LECTIO_CONFIG_PATH` names another.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Directory the default config candidates are resolved against.
    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = root.into();
        self
    }

    /// Read variables from the given map instead of the process
    /// environment. Disables `.env` loading.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self.load_dotenv = false;
        self
    }

    /// Apply every layer, then the guard rails.
    pub fn load(self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = if self.load_dotenv {
            self.apply_env_file()?
        } else {
            false
        };

        let vars = match self.vars.clone() {
            Some(vars) => vars,
            None => std::env::vars().collect(),
        };
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let (mut config, source) = self.load_file_layer(&lookup)?;
        config.metadata.env_file_loaded = env_file_loaded;
        config.metadata.source = source;

        apply_env_overrides(&mut config, &lookup)?;

        let mut warnings = apply_guard_rails(&config)?;
        if config.metadata.source == ConfigSource::Default {
            warnings.push_with_hint(
                "no config file found; using built-in defaults",
                format!(
                    "Create lectio.toml or set {ENV_CONFIG_PATH} to customise intervals and fallbacks"
                ),
            );
        }

        Ok(ConfigLoad { config, warnings })
    }

    fn apply_env_file(&self) -> Result<bool, ConfigLoadError> {
        let outcome = match &self.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| ()),
            None => dotenvy::dotenv().map(|_| ()),
        };

        match outcome {
            Ok(()) => Ok(true),
            Err(err) if err.not_found() && self.env_file.is_none() => Ok(false),
            Err(err) => Err(ConfigLoadError::EnvFile(err)),
        }
    }

    fn load_file_layer(
        &self,
        lookup: &impl Fn(&str) -> Option<String>,
    ) -> Result<(Config, ConfigSource), ConfigLoadError> {
        if let Some(path) = lookup(ENV_CONFIG_PATH) {
            let path = PathBuf::from(path);
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(path) = &self.config_path {
            let config = load_from_file(path)?;
            return Ok((config, ConfigSource::ExplicitPath(path.clone())));
        }

        if let Some(path) = self.find_default_file() {
            let config = load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Config::default(), ConfigSource::Default))
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        DEFAULT_CONFIG_CANDIDATES
            .iter()
            .map(|candidate| self.search_root.join(candidate))
            .find(|path| path.exists())
    }
}

/// Parse one config file, picking the format from its extension.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::FileIo {
            path: path.to_path_buf(),
            source,
        })?;

    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|err| anyhow!(err)),
        Some("toml") | Some("tml") => {
            toml::from_str(&contents).map_err(|err| anyhow!(err))
        }
        _ => parse_from_str(&contents),
    };

    debug!(path = %path.display(), "loaded config file");
    parsed.map_err(|source| ConfigLoadError::FileParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse config text of unknown format.
pub fn parse_from_str(contents: &str) -> anyhow::Result<Config> {
    // Try TOML first, then JSON for convenience.
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            anyhow!("toml error: {}; json error: {}", toml_err, json_err)
        })
    })
}

fn apply_env_overrides(
    config: &mut Config,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigLoadError> {
    let mut applied = Vec::new();

    if let Some(url) = lookup(ENV_API_BASE_URL) {
        config.api.base_url = url;
        applied.push(ENV_API_BASE_URL);
    }
    if let Some(raw) = lookup(ENV_API_TIMEOUT) {
        config.api.timeout = parse_duration(ENV_API_TIMEOUT, &raw)?;
        applied.push(ENV_API_TIMEOUT);
    }
    if let Some(user_id) = lookup(ENV_USER_ID) {
        config.session.user_id = Some(user_id);
        applied.push(ENV_USER_ID);
    }
    if let Some(user_name) = lookup(ENV_USER_NAME) {
        config.session.user_name = Some(user_name);
        applied.push(ENV_USER_NAME);
    }
    if let Some(raw) = lookup(ENV_POLL_INTERVAL) {
        config.sampling.poll_interval =
            parse_duration(ENV_POLL_INTERVAL, &raw)?;
        applied.push(ENV_POLL_INTERVAL);
    }
    if let Some(raw) = lookup(ENV_ACTIVITY_INTERVAL) {
        config.activity.report_interval =
            parse_duration(ENV_ACTIVITY_INTERVAL, &raw)?;
        applied.push(ENV_ACTIVITY_INTERVAL);
    }
    if let Some(url) = lookup(ENV_FALLBACK_VIDEO_URL) {
        config.fallback.video_url = url;
        applied.push(ENV_FALLBACK_VIDEO_URL);
    }
    if let Some(duration) = lookup(ENV_FALLBACK_CHAPTER_DURATION) {
        config.fallback.chapter_duration = duration;
        applied.push(ENV_FALLBACK_CHAPTER_DURATION);
    }
    if let Some(raw) = lookup(ENV_BACKFILL_DELAY) {
        config.backfill.delay = parse_duration(ENV_BACKFILL_DELAY, &raw)?;
        applied.push(ENV_BACKFILL_DELAY);
    }

    config.metadata.env_overrides = applied;
    Ok(())
}

fn parse_duration(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    humantime::parse_duration(raw).map_err(|err| ConfigLoadError::InvalidValue {
        key,
        reason: err.to_string(),
    })
}
