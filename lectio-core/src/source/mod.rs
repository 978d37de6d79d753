//! Playback position sources.
//!
//! The gate does not care which player renders the chapter. Each backend is
//! wrapped in an adapter implementing [`PositionSource`]:
//!
//! - [`EmbeddedSource`] drives a third-party player handle that may not be
//!   ready yet. It is polled on a fixed cadence.
//! - [`NativeSource`] mirrors a media element that pushes time updates on
//!   its own, so it is never polled.
//!
//! Both produce [`SourceSignal`]s, the only vocabulary the session driver
//! understands.

mod embedded;
mod native;

pub use embedded::{EmbeddedPlayerHandle, EmbeddedSource};
pub use native::{NativeMediaEvent, NativeSource};

use crate::error::SourceError;
use async_trait::async_trait;
use lectio_model::PlaybackSourceKind;
use std::fmt::Debug;
use std::time::Duration;

/// How the session driver obtains positions from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Ask the source for its position at the given cadence.
    Poll(Duration),
    /// The source delivers [`SourceSignal`]s itself.
    Push,
}

/// A single observation from a playback source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceSignal {
    /// Position and duration read together.
    Sample {
        /// Seconds from the start.
        position: f64,
        /// Total seconds; not positive while unknown.
        duration: f64,
    },
    /// End of stream.
    Ended,
}

/// Player adapter the session driver reads positions from.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PositionSource: Send + Sync + Debug {
    /// Player technology behind the adapter.
    fn kind(&self) -> PlaybackSourceKind;

    /// Whether the driver polls this source or waits for pushed signals.
    fn sampling(&self) -> Sampling;

    /// Current playback position in seconds.
    async fn position(&self) -> Result<f64, SourceError>;

    /// Total duration in seconds. May be `0.0` until metadata loads.
    async fn duration(&self) -> Result<f64, SourceError>;

    /// Detach listeners and destroy the underlying player handle.
    ///
    /// Called synchronously when the session ends, before any successor
    /// session starts.
    fn release(&self);
}

/// Read position and duration as one sample.
pub async fn sample<S>(source: &S) -> Result<SourceSignal, SourceError>
where
    S: PositionSource + ?Sized,
{
    let position = source.position().await?;
    let duration = source.duration().await?;
    Ok(SourceSignal::Sample { position, duration })
}
