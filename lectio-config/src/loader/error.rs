//! Errors raised while loading configuration.

use crate::validation::ConfigGuardRailError;

use std::path::PathBuf;
use thiserror::Error;

/// Why [`ConfigLoader::load`](super::ConfigLoader::load) failed.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {path}")]
    FileIo {
        /// File that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The config file is neither valid TOML nor valid JSON.
    #[error("invalid config file {path}: {source}")]
    FileParse {
        /// File that was parsed.
        path: PathBuf,
        /// Both parser errors.
        #[source]
        source: anyhow::Error,
    },
    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Parser message.
        reason: String,
    },
    /// The merged config breaks a guard rail.
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    /// The `.env` file could not be applied.
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}
