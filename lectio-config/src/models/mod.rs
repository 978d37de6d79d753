//! Configuration sections and load metadata.

use crate::constants::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fully resolved client configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Course API endpoint.
    pub api: ApiConfig,
    /// Signed-in learner, if any.
    pub session: SessionConfig,
    /// Embedded player polling.
    pub sampling: SamplingConfig,
    /// Background activity reports.
    pub activity: ActivityConfig,
    /// Placeholder content.
    pub fallback: FallbackConfig,
    /// Chapter backfill tool.
    pub backfill: BackfillConfig,
    /// Provenance of the loaded values; never read from a file.
    #[serde(skip)]
    pub metadata: ConfigMetadata,
}

/// Course API client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the course API, including the `/api` prefix.
    pub base_url: String,
    /// Per-request timeout.
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_API_TIMEOUT,
        }
    }
}

/// Identity of the signed-in learner. Both fields are absent for anonymous
/// viewers, in which case progress and activity calls are skipped.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Learner id sent with progress and activity calls.
    pub user_id: Option<String>,
    /// Display name used as comment author.
    pub user_name: Option<String>,
}

/// Position sampling of the embedded player.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// How often the embedded player is polled for its position.
    #[serde(with = "humantime_duration")]
    pub poll_interval: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Watch-time reporting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Time between two `continued` reports.
    #[serde(with = "humantime_duration")]
    pub report_interval: Duration,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            report_interval: DEFAULT_ACTIVITY_INTERVAL,
        }
    }
}

/// Content substituted when a chapter has no playable video.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Direct video URL played in place of a missing one.
    pub video_url: String,
    /// Duration label of a placeholder chapter, e.g. `"45 min"`.
    pub chapter_duration: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            video_url: DEFAULT_FALLBACK_VIDEO_URL.to_string(),
            chapter_duration: DEFAULT_FALLBACK_CHAPTER_DURATION.to_string(),
        }
    }
}

/// Settings of the chapter backfill planner.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackfillConfig {
    /// Pause between courses so the video host is not hammered.
    #[serde(with = "humantime_duration")]
    pub delay: Duration,
    /// Lower bound of the random chapter count.
    pub min_chapters: u32,
    /// Upper bound (inclusive) of the random chapter count.
    pub max_chapters: u32,
}

impl Default for BackfillConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_BACKFILL_DELAY,
            min_chapters: DEFAULT_BACKFILL_MIN_CHAPTERS,
            max_chapters: DEFAULT_BACKFILL_MAX_CHAPTERS,
        }
    }
}

/// Source that produced the file-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// No file; built-in defaults only.
    #[default]
    Default,
    /// File named by `LECTIO_CONFIG_PATH`.
    EnvPath(PathBuf),
    /// File passed on the command line.
    ExplicitPath(PathBuf),
    /// First candidate found in the search root.
    File(PathBuf),
}

impl ConfigSource {
    /// Path of the file, unless the defaults were used.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Default => None,
            ConfigSource::EnvPath(path)
            | ConfigSource::ExplicitPath(path)
            | ConfigSource::File(path) => Some(path),
        }
    }
}

/// Where the loaded values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    /// A `.env` file was found and applied.
    pub env_file_loaded: bool,
    /// File layer that was applied.
    pub source: ConfigSource,
    /// Environment variables that overrode file or default values.
    pub env_overrides: Vec<&'static str>,
}

pub(crate) mod humantime_duration {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(
        value: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer
            .serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(D::Error::custom)
    }
}
