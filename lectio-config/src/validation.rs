//! Guard rails run on the merged configuration.

use thiserror::Error;

use super::base_url::{BaseUrlError, normalize_base_url};
use super::models::Config;

/// A configuration value that makes the client unusable.
#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    /// `api.base_url` does not normalize to a URL with a host.
    #[error("api.base_url '{value}' is not a valid URL")]
    InvalidBaseUrl {
        /// Configured value.
        value: String,
        /// Normalization failure.
        #[source]
        source: BaseUrlError,
    },
    /// A duration that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroInterval {
        /// Config key.
        field: &'static str,
    },
    /// The backfill chapter bounds are empty or inverted.
    #[error(
        "backfill.min_chapters ({min}) must not exceed backfill.max_chapters ({max})"
    )]
    InvalidChapterRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
}

/// Non-fatal finding about the configuration.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// What was found.
    pub message: String,
    /// How to silence it, when there is an obvious fix.
    pub hint: Option<String>,
}

/// Ordered collection of [`ConfigWarning`]s.
#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    /// Warnings in the order they were raised.
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    /// Record a warning without a hint.
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    /// Record a warning with a remediation hint.
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    /// `true` when nothing was raised.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append all warnings of `other`.
    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

/// Reject unusable values and collect warnings about questionable ones.
pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    normalize_base_url(&config.api.base_url).map_err(|source| {
        ConfigGuardRailError::InvalidBaseUrl {
            value: config.api.base_url.clone(),
            source,
        }
    })?;

    if config.sampling.poll_interval.is_zero() {
        return Err(ConfigGuardRailError::ZeroInterval {
            field: "sampling.poll_interval",
        });
    }
    if config.activity.report_interval.is_zero() {
        return Err(ConfigGuardRailError::ZeroInterval {
            field: "activity.report_interval",
        });
    }
    if config.api.timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroInterval {
            field: "api.timeout",
        });
    }

    let backfill = &config.backfill;
    if backfill.min_chapters == 0 || backfill.min_chapters > backfill.max_chapters
    {
        return Err(ConfigGuardRailError::InvalidChapterRange {
            min: backfill.min_chapters,
            max: backfill.max_chapters,
        });
    }

    if config.session.user_id.is_none() {
        warnings.push_with_hint(
            "no signed-in user configured; progress recording and activity reports are disabled",
            "Set LECTIO_USER_ID or add session.user_id to the config file",
        );
    }

    if config.activity.report_interval < config.sampling.poll_interval {
        warnings.push(
            "activity.report_interval is shorter than sampling.poll_interval; activity pings will outnumber position checks",
        );
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults_pass_with_anonymous_warning() {
        let warnings = apply_guard_rails(&Config::default()).unwrap();
        assert_eq!(warnings.items.len(), 1);
        assert!(warnings.items[0].message.contains("no signed-in user"));
    }

    #[test]
    fn base_url_without_host_is_rejected() {
        let mut config = Config::default();
        config.api.base_url = "http://".into();
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = Config::default();
        config.sampling.poll_interval = Duration::ZERO;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::ZeroInterval {
                field: "sampling.poll_interval"
            })
        ));
    }

    #[test]
    fn inverted_chapter_range_is_rejected() {
        let mut config = Config::default();
        config.backfill.min_chapters = 7;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::InvalidChapterRange { min: 7, max: 6 })
        ));
    }
}
