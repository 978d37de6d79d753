//! Shared configuration library for Lectio.
//!
//! This crate centralizes config defaults, `.env` loading, file and
//! environment overrides, and validation rules. Both `lectio-core` consumers
//! and `lectioctl` load their settings through [`ConfigLoader`] so there is a
//! single source of truth for intervals, endpoints and fallback content.

pub mod base_url;
pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use base_url::{BaseUrlError, normalize_base_url};
pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{
    ActivityConfig, ApiConfig, BackfillConfig, Config, ConfigMetadata,
    ConfigSource, FallbackConfig, SamplingConfig, SessionConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
