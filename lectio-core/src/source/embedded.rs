use super::{PositionSource, Sampling, SourceSignal};
use crate::error::SourceError;

use async_trait::async_trait;
use lectio_model::{EmbeddedPlayerState, PlaybackSourceKind};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, warn};

/// Script API of an embedded third-party player.
///
/// Calls may fail while the player script is still loading or the iframe is
/// being torn down; such failures surface as [`SourceError`].
#[async_trait]
pub trait EmbeddedPlayerHandle: Send + Sync {
    /// Playback position in seconds.
    async fn current_time(&self) -> Result<f64, SourceError>;

    /// Video length in seconds; `0.0` until known.
    async fn duration(&self) -> Result<f64, SourceError>;

    /// Tear the player down. Called at most once per handle.
    fn destroy(&self);
}

/// Adapter for an embedded player whose handle becomes available
/// asynchronously (after the player's ready event).
pub struct EmbeddedSource<H: EmbeddedPlayerHandle> {
    handle: RwLock<Option<Arc<H>>>,
    poll_interval: Duration,
    released: AtomicBool,
}

impl<H: EmbeddedPlayerHandle> fmt::Debug for EmbeddedSource<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let attached = self
            .handle
            .try_read()
            .map(|guard| guard.is_some())
            .unwrap_or(false);
        f.debug_struct("EmbeddedSource")
            .field("attached", &attached)
            .field("poll_interval", &self.poll_interval)
            .field("released", &self.released.load(Ordering::Acquire))
            .finish()
    }
}

impl<H: EmbeddedPlayerHandle> EmbeddedSource<H> {
    /// Source with no handle yet, polled every `poll_interval`.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            handle: RwLock::new(None),
            poll_interval,
            released: AtomicBool::new(false),
        }
    }

    /// Install the player handle once the player reports ready.
    ///
    /// Ignored after [`PositionSource::release`]; the late handle is
    /// destroyed immediately so it cannot outlive its session.
    pub fn attach(&self, handle: H) {
        if self.released.load(Ordering::Acquire) {
            debug!("embedded player became ready after release; destroying");
            handle.destroy();
            return;
        }
        let previous = self
            .handle
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Arc::new(handle));
        if let Some(previous) = previous {
            previous.destroy();
        }
    }

    /// Drop the current handle without releasing the source, e.g. when the
    /// player iframe is rebuilt. Positions read as not ready until the next
    /// [`attach`](Self::attach).
    pub fn detach(&self) {
        let previous = self
            .handle
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(previous) = previous {
            previous.destroy();
        }
    }

    /// A handle is installed.
    pub fn is_attached(&self) -> bool {
        self.handle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Translate a raw state-change code from the player.
    ///
    /// Only the `ended` state carries meaning for the gate.
    pub fn on_state_change(&self, code: i32) -> Option<SourceSignal> {
        if self.released.load(Ordering::Acquire) {
            return None;
        }
        match EmbeddedPlayerState::try_from(code) {
            Ok(EmbeddedPlayerState::Ended) => {
                debug!("embedded player ended");
                Some(SourceSignal::Ended)
            }
            Ok(state) => {
                debug!(?state, "embedded player state changed");
                None
            }
            Err(err) => {
                warn!(%err, "ignoring embedded player state");
                None
            }
        }
    }

    fn current(&self) -> Result<Arc<H>, SourceError> {
        if self.released.load(Ordering::Acquire) {
            return Err(SourceError::Released);
        }
        self.handle
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(SourceError::NotReady)
    }
}

#[async_trait]
impl<H: EmbeddedPlayerHandle + 'static> PositionSource for EmbeddedSource<H> {
    fn kind(&self) -> PlaybackSourceKind {
        PlaybackSourceKind::Embedded
    }

    fn sampling(&self) -> Sampling {
        Sampling::Poll(self.poll_interval)
    }

    async fn position(&self) -> Result<f64, SourceError> {
        self.current()?.current_time().await
    }

    async fn duration(&self) -> Result<f64, SourceError> {
        self.current()?.duration().await
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        let handle = self
            .handle
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::sample;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct FakeHandle {
        time: f64,
        duration: f64,
        destroyed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EmbeddedPlayerHandle for FakeHandle {
        async fn current_time(&self) -> Result<f64, SourceError> {
            Ok(self.time)
        }

        async fn duration(&self) -> Result<f64, SourceError> {
            Ok(self.duration)
        }

        fn destroy(&self) {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn not_ready_until_attached() {
        let source =
            EmbeddedSource::<FakeHandle>::new(Duration::from_secs(2));
        assert_eq!(source.position().await, Err(SourceError::NotReady));

        source.attach(FakeHandle {
            time: 30.0,
            duration: 60.0,
            ..Default::default()
        });
        assert_eq!(
            sample(&source).await,
            Ok(SourceSignal::Sample {
                position: 30.0,
                duration: 60.0
            })
        );
        assert_eq!(source.sampling(), Sampling::Poll(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn release_destroys_handle_once() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let source = EmbeddedSource::new(Duration::from_secs(2));
        source.attach(FakeHandle {
            destroyed: Arc::clone(&destroyed),
            ..Default::default()
        });

        source.release();
        source.release();

        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(source.duration().await, Err(SourceError::Released));
        assert!(!source.is_attached());
    }

    #[test]
    fn late_attach_after_release_is_destroyed() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let source = EmbeddedSource::new(Duration::from_secs(2));
        source.release();
        source.attach(FakeHandle {
            destroyed: Arc::clone(&destroyed),
            ..Default::default()
        });

        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert!(!source.is_attached());
    }

    #[tokio::test]
    async fn detach_returns_to_not_ready() {
        let destroyed = Arc::new(AtomicUsize::new(0));
        let source = EmbeddedSource::new(Duration::from_secs(2));
        source.attach(FakeHandle {
            destroyed: Arc::clone(&destroyed),
            ..Default::default()
        });

        source.detach();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert_eq!(source.position().await, Err(SourceError::NotReady));
    }

    #[test]
    fn only_ended_state_becomes_a_signal() {
        let source =
            EmbeddedSource::<FakeHandle>::new(Duration::from_secs(2));
        assert_eq!(source.on_state_change(1), None);
        assert_eq!(source.on_state_change(3), None);
        assert_eq!(source.on_state_change(42), None);
        assert_eq!(source.on_state_change(0), Some(SourceSignal::Ended));
    }
}
