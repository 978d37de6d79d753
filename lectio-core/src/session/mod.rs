//! Chapter watch sessions.
//!
//! A [`ChapterGate`] belongs to one chapter view and runs at most one
//! session at a time. Each session is a tokio task that exclusively owns the
//! chapter's [`WatchState`]: position samples, the player's end-of-stream
//! signal, manual overrides and recorded completions all reach it through a
//! command channel, so their effects are applied in arrival order.
//!
//! Opening a new chapter (or closing the view) cancels the running session
//! before the next one starts: the cancellation token fires, the session is
//! no longer current, and the position source is released. A superseded task
//! notices on its next tick and exits without touching the new session.

mod driver;

use crate::activity::ActivityTracker;
use crate::api::ActivitySink;
use crate::error::{GateError, Result};
use crate::gate::{UnlockTrigger, WatchState};
use crate::source::{PositionSource, Sampling, SourceSignal};

use chrono::{DateTime, Utc};
use driver::{SessionDriver, ticker};
use lectio_model::{ChapterId, CourseId, SessionId, UserId};
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 16;

/// Identity of the chapter being watched and the learner watching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Course being watched.
    pub course_id: CourseId,
    /// Chapter being watched.
    pub chapter_id: ChapterId,
    /// Chapter title, as sent in activity reports.
    pub chapter_title: String,
    /// `None` for anonymous visitors; disables activity reporting.
    pub user_id: Option<UserId>,
}

/// One continuous viewing of a chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSession {
    /// Fresh id per session.
    pub id: SessionId,
    /// Course being watched.
    pub course_id: CourseId,
    /// Chapter being watched.
    pub chapter_id: ChapterId,
    /// Wall-clock start of the session.
    pub started_at: DateTime<Utc>,
}

/// Notifications emitted by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// Emitted at most once per session.
    ChapterWatched {
        /// Session that unlocked.
        session: SessionId,
        /// Chapter that was watched.
        chapter_id: ChapterId,
        /// What caused the unlock.
        trigger: UnlockTrigger,
    },
    /// The session task stopped; no further events follow.
    SessionClosed {
        /// Session that stopped.
        session: SessionId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionCommand {
    Signal(SourceSignal),
    ManualOverride,
    RecordCompleted,
}

/// Marker of the session allowed to act, shared by the gate and its tasks.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    inner: Arc<RwLock<Option<SessionId>>>,
}

impl CurrentSession {
    /// `id` is the session allowed to act.
    pub fn is_current(&self, id: SessionId) -> bool {
        *self.inner.read().unwrap_or_else(|e| e.into_inner()) == Some(id)
    }

    /// Session allowed to act, if any.
    pub fn get(&self) -> Option<SessionId> {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn set(&self, id: SessionId) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(id);
    }

    /// Clear the marker if it still names `id`.
    fn clear(&self, id: SessionId) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if *guard == Some(id) {
            *guard = None;
        }
    }
}

/// Cheap, cloneable view of a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session: ChapterSession,
    commands: mpsc::UnboundedSender<SessionCommand>,
    can_advance: watch::Receiver<bool>,
    events: broadcast::Sender<GateEvent>,
}

impl SessionHandle {
    /// Id of the session.
    pub fn id(&self) -> SessionId {
        self.session.id
    }

    /// Identity and start time of the session.
    pub fn session(&self) -> &ChapterSession {
        &self.session
    }

    /// Whether forward navigation is currently allowed.
    pub fn can_advance(&self) -> bool {
        *self.can_advance.borrow()
    }

    /// Receiver that observes every change of [`can_advance`](Self::can_advance).
    pub fn watch_can_advance(&self) -> watch::Receiver<bool> {
        self.can_advance.clone()
    }

    /// Subscribe to events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.events.subscribe()
    }

    /// Forward a signal from a push-based source.
    pub fn signal(&self, signal: SourceSignal) -> Result<()> {
        self.send(SessionCommand::Signal(signal))
    }

    /// Unlock the chapter at the learner's request.
    pub fn manual_override(&self) -> Result<()> {
        self.send(SessionCommand::ManualOverride)
    }

    /// The progress store accepted a completion; unlock without notifying.
    pub fn record_completed(&self) -> Result<()> {
        self.send(SessionCommand::RecordCompleted)
    }

    fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| GateError::SessionClosed(self.session.id))
    }
}

/// Cancels the session task when dropped.
struct SessionGuard {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct ActiveSession {
    handle: SessionHandle,
    source: Arc<dyn PositionSource>,
    guard: SessionGuard,
}

/// Runs the watch session of one chapter view.
pub struct ChapterGate {
    current: CurrentSession,
    activity_sink: Option<Arc<dyn ActivitySink>>,
    activity_interval: Duration,
    active: Option<ActiveSession>,
}

impl fmt::Debug for ChapterGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChapterGate")
            .field("current", &self.current.get())
            .field("activity_interval", &self.activity_interval)
            .field("reports_activity", &self.activity_sink.is_some())
            .finish()
    }
}

impl ChapterGate {
    /// Gate with no session. Activity is reported every
    /// `activity_interval` once a sink is set.
    pub fn new(activity_interval: Duration) -> Self {
        Self {
            current: CurrentSession::default(),
            activity_sink: None,
            activity_interval,
            active: None,
        }
    }

    /// Report watch time of signed-in learners to `sink`.
    pub fn with_activity_sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.activity_sink = Some(sink);
        self
    }

    /// Marker shared with the session tasks.
    pub fn current(&self) -> &CurrentSession {
        &self.current
    }

    /// Handle of the running session, if any.
    pub fn active(&self) -> Option<&SessionHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }

    /// Start a session for a chapter, closing the previous one first.
    ///
    /// `seed` is [`WatchState::already_completed`] when the learner finished
    /// this chapter before. Must be called inside a tokio runtime.
    pub fn open(
        &mut self,
        context: SessionContext,
        source: Arc<dyn PositionSource>,
        seed: WatchState,
    ) -> SessionHandle {
        self.close();

        let session = ChapterSession {
            id: SessionId::new(),
            course_id: context.course_id.clone(),
            chapter_id: context.chapter_id.clone(),
            started_at: Utc::now(),
        };
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (can_advance_tx, can_advance_rx) = watch::channel(seed.can_advance());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let cancel = CancellationToken::new();

        let poll = match source.sampling() {
            Sampling::Poll(period) => Some(ticker(period)),
            Sampling::Push => None,
        };
        let activity = self.activity_sink.as_ref().and_then(|sink| {
            ActivityTracker::for_session(
                Arc::clone(sink),
                &context,
                self.activity_interval,
            )
            .map(|tracker| (tracker, ticker(self.activity_interval)))
        });

        debug!(
            session = %session.id,
            course_id = %session.course_id,
            chapter_id = %session.chapter_id,
            source = %source.kind(),
            already_watched = seed.can_advance(),
            "opening chapter session"
        );

        self.current.set(session.id);
        let driver = SessionDriver {
            id: session.id,
            context,
            state: seed,
            source: Arc::clone(&source),
            commands: command_rx,
            can_advance: can_advance_tx,
            events: events_tx.clone(),
            current: self.current.clone(),
            cancel: cancel.clone(),
            poll,
            activity,
        };
        let task = tokio::spawn(driver.run());

        let handle = SessionHandle {
            session,
            commands: command_tx,
            can_advance: can_advance_rx,
            events: events_tx,
        };
        self.active = Some(ActiveSession {
            handle: handle.clone(),
            source,
            guard: SessionGuard {
                cancel,
                task: Some(task),
            },
        });
        handle
    }

    /// End the running session, if any.
    ///
    /// Cancellation and source release happen before this returns; the
    /// task reports residual activity on its way out.
    pub fn close(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        let id = active.handle.id();
        active.guard.cancel.cancel();
        self.current.clear(id);
        active.source.release();
        debug!(session = %id, "chapter session closed");
    }

    /// Close the running session and wait for its task to finish.
    pub async fn shutdown(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        let id = active.handle.id();
        active.guard.cancel.cancel();
        self.current.clear(id);
        active.source.release();

        if let Some(task) = active.guard.task.take() {
            if let Err(err) = task.await {
                warn!(session = %id, error = %err, "session task failed");
            }
        }
    }
}

impl Drop for ChapterGate {
    fn drop(&mut self) {
        self.close();
    }
}
