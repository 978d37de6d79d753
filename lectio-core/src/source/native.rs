use super::{PositionSource, Sampling, SourceSignal};
use crate::error::SourceError;

use async_trait::async_trait;
use lectio_model::PlaybackSourceKind;
use std::sync::Mutex;
use tracing::debug;

/// Events emitted by a native media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NativeMediaEvent {
    /// `duration` is NaN until metadata has loaded.
    TimeUpdate {
        /// Seconds from the start.
        current_time: f64,
        /// Total seconds.
        duration: f64,
    },
    /// Duration became known.
    LoadedMetadata {
        /// Total seconds.
        duration: f64,
    },
    /// Playback reached the end.
    Ended,
}

#[derive(Debug, Default)]
struct NativeState {
    position: f64,
    duration: Option<f64>,
    released: bool,
}

/// Adapter for a media element that reports time updates on its own.
///
/// The element already rate-limits its time updates, so this source is
/// push-based: every accepted event is forwarded to the session as a
/// [`SourceSignal`].
#[derive(Debug, Default)]
pub struct NativeSource {
    state: Mutex<NativeState>,
}

impl NativeSource {
    /// Source with no position and an unknown duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an element event and return the signal to forward, if any.
    pub fn handle_event(&self, event: NativeMediaEvent) -> Option<SourceSignal> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.released {
            return None;
        }

        match event {
            NativeMediaEvent::TimeUpdate {
                current_time,
                duration,
            } => {
                state.position = current_time;
                if let Some(duration) = known_duration(duration) {
                    state.duration = Some(duration);
                }
                state.duration.map(|duration| SourceSignal::Sample {
                    position: current_time,
                    duration,
                })
            }
            NativeMediaEvent::LoadedMetadata { duration } => {
                debug!(duration, "media metadata loaded");
                state.duration = known_duration(duration);
                None
            }
            NativeMediaEvent::Ended => Some(SourceSignal::Ended),
        }
    }
}

fn known_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

#[async_trait]
impl PositionSource for NativeSource {
    fn kind(&self) -> PlaybackSourceKind {
        PlaybackSourceKind::Native
    }

    fn sampling(&self) -> Sampling {
        Sampling::Push
    }

    async fn position(&self) -> Result<f64, SourceError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.released {
            return Err(SourceError::Released);
        }
        Ok(state.position)
    }

    async fn duration(&self) -> Result<f64, SourceError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.released {
            return Err(SourceError::Released);
        }
        state.duration.ok_or(SourceError::NotReady)
    }

    fn release(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).released = true;
    }
}
