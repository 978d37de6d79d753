//! Built-in defaults and the `LECTIO_*` environment keys.

use std::time::Duration;

/// Course API root used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
/// Per-request timeout of the course API client.
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Cadence at which the embedded player is asked for its position.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Cadence of `continued` activity reports.
pub const DEFAULT_ACTIVITY_INTERVAL: Duration = Duration::from_secs(2 * 60);

/// Video played when a chapter has no link of its own.
pub const DEFAULT_FALLBACK_VIDEO_URL: &str =
    "https://www.w3schools.com/html/mov_bbb.mp4";
/// Duration label of a placeholder chapter when the course has no length.
pub const DEFAULT_FALLBACK_CHAPTER_DURATION: &str = "45 min";

/// Pause between courses during a backfill run.
pub const DEFAULT_BACKFILL_DELAY: Duration = Duration::from_millis(500);
/// Fewest chapters generated for one course.
pub const DEFAULT_BACKFILL_MIN_CHAPTERS: u32 = 3;
/// Most chapters generated for one course.
pub const DEFAULT_BACKFILL_MAX_CHAPTERS: u32 = 6;

/// Path of a config file that takes precedence over `--config`.
pub const ENV_CONFIG_PATH: &str = "LECTIO_CONFIG_PATH";
/// Overrides `api.base_url`.
pub const ENV_API_BASE_URL: &str = "LECTIO_API_BASE_URL";
/// Overrides `api.timeout`.
pub const ENV_API_TIMEOUT: &str = "LECTIO_API_TIMEOUT";
/// Overrides `session.user_id`.
pub const ENV_USER_ID: &str = "LECTIO_USER_ID";
/// Overrides `session.user_name`.
pub const ENV_USER_NAME: &str = "LECTIO_USER_NAME";
/// Overrides `sampling.poll_interval`.
pub const ENV_POLL_INTERVAL: &str = "LECTIO_POLL_INTERVAL";
/// Overrides `activity.report_interval`.
pub const ENV_ACTIVITY_INTERVAL: &str = "LECTIO_ACTIVITY_INTERVAL";
/// Overrides `fallback.video_url`.
pub const ENV_FALLBACK_VIDEO_URL: &str = "LECTIO_FALLBACK_VIDEO_URL";
/// Overrides `fallback.chapter_duration`.
pub const ENV_FALLBACK_CHAPTER_DURATION: &str =
    "LECTIO_FALLBACK_CHAPTER_DURATION";
/// Overrides `backfill.delay`.
pub const ENV_BACKFILL_DELAY: &str = "LECTIO_BACKFILL_DELAY";

/// Config files probed, in order, when no explicit path is given.
pub const DEFAULT_CONFIG_CANDIDATES: &[&str] = &[
    "lectio.toml",
    "lectio.json",
    "config/lectio.toml",
    "config/lectio.json",
];
