//! Chapter watch gate
//!
//! Decides when a chapter video counts as "watched" and therefore unlocks
//! forward navigation and completion recording. The decision is independent
//! of the player technology: both the polled embedded player and the native
//! media element feed the same [`WatchState`].
//!
//! ## Key Concepts
//!
//! - **Threshold**: a chapter is watched once `position / duration` reaches
//!   [`WATCH_THRESHOLD`].
//! - **Ended**: the player reporting end-of-stream is an alternate, definite
//!   signal, regardless of the last sampled fraction.
//! - **Manual override**: the learner may unlock the chapter explicitly when
//!   automatic detection never fires.
//!
//! The unlock is reported exactly once per session: the first successful
//! trigger returns [`GateDecision::Unlocked`], every later call returns
//! [`GateDecision::AlreadyUnlocked`].
//!
//! ## Example
//!
//! ```
//! use lectio_core::gate::{GateDecision, UnlockTrigger, WatchState};
//!
//! let mut state = WatchState::new();
//! assert!(matches!(
//!     state.evaluate_progress(300.0, 600.0),
//!     GateDecision::Pending { .. }
//! ));
//! assert!(matches!(
//!     state.evaluate_progress(510.0, 600.0),
//!     GateDecision::Unlocked(UnlockTrigger::Threshold { .. })
//! ));
//! assert_eq!(state.on_playback_ended(), GateDecision::AlreadyUnlocked);
//! ```

/// Fraction of the video duration past which a chapter counts as watched.
pub const WATCH_THRESHOLD: f64 = 0.85;

/// What caused a chapter to unlock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnlockTrigger {
    /// A sample reached [`WATCH_THRESHOLD`].
    Threshold {
        /// Watched fraction of the sample that crossed the threshold.
        fraction: f64,
    },
    /// The player reported end of stream.
    Ended,
    /// The learner unlocked the chapter.
    ManualOverride,
}

impl UnlockTrigger {
    /// Stable name used in logs and JSON output.
    pub fn label(&self) -> &'static str {
        match self {
            UnlockTrigger::Threshold { .. } => "threshold",
            UnlockTrigger::Ended => "ended",
            UnlockTrigger::ManualOverride => "manual_override",
        }
    }
}

/// Outcome of feeding one signal into the gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Duration unknown or zero; nothing can be decided yet.
    NotMeasurable,
    /// Measured but below the threshold.
    Pending {
        /// `position / duration` of the sample.
        fraction: f64,
    },
    /// First trigger of this session. The caller emits the notification.
    Unlocked(UnlockTrigger),
    /// The unlock was already acknowledged earlier.
    AlreadyUnlocked,
}

impl GateDecision {
    /// `true` only for the first unlock of a session.
    pub fn is_unlock(&self) -> bool {
        matches!(self, GateDecision::Unlocked(_))
    }

    /// Trigger of a first unlock.
    pub fn trigger(&self) -> Option<UnlockTrigger> {
        match self {
            GateDecision::Unlocked(trigger) => Some(*trigger),
            _ => None,
        }
    }
}

/// Per-session watch flags.
///
/// `watched` drives the "can advance" signal. `completed_acknowledged`
/// guards the one-shot notification. Both only ever move from `false` to
/// `true`; a new chapter gets a new `WatchState`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchState {
    watched: bool,
    completed_acknowledged: bool,
}

impl WatchState {
    /// Locked state for a chapter not yet completed.
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a chapter the progress store already lists as complete.
    ///
    /// Revisiting such a chapter is unlocked from the start and never
    /// produces a "chapter watched" notification.
    pub fn already_completed() -> Self {
        Self {
            watched: true,
            completed_acknowledged: true,
        }
    }

    /// [`WatchState::already_completed`] or [`WatchState::new`].
    pub fn seeded(completed: bool) -> Self {
        if completed {
            Self::already_completed()
        } else {
            Self::new()
        }
    }

    /// The chapter has been watched in this session or earlier.
    pub fn watched(&self) -> bool {
        self.watched
    }

    /// The one-shot notification has been spent.
    pub fn completed_acknowledged(&self) -> bool {
        self.completed_acknowledged
    }

    /// Forward navigation is allowed.
    pub fn can_advance(&self) -> bool {
        self.watched
    }

    /// Feed one position sample.
    ///
    /// Non-positive, NaN or infinite durations are "not yet measurable".
    pub fn evaluate_progress(
        &mut self,
        position: f64,
        duration: f64,
    ) -> GateDecision {
        if self.completed_acknowledged {
            return GateDecision::AlreadyUnlocked;
        }
        if !duration.is_finite() || duration <= 0.0 {
            return GateDecision::NotMeasurable;
        }

        let fraction = position / duration;
        if fraction.is_nan() {
            return GateDecision::NotMeasurable;
        }

        if fraction >= WATCH_THRESHOLD {
            self.acknowledge(UnlockTrigger::Threshold { fraction })
        } else {
            GateDecision::Pending { fraction }
        }
    }

    /// The player reported end-of-stream.
    pub fn on_playback_ended(&mut self) -> GateDecision {
        self.acknowledge(UnlockTrigger::Ended)
    }

    /// The learner unlocked the chapter explicitly.
    pub fn manual_override(&mut self) -> GateDecision {
        self.acknowledge(UnlockTrigger::ManualOverride)
    }

    /// The progress store accepted a completion for this chapter.
    ///
    /// Unlocks silently; returns whether anything changed.
    pub fn record_completed(&mut self) -> bool {
        let changed = !(self.watched && self.completed_acknowledged);
        self.watched = true;
        self.completed_acknowledged = true;
        changed
    }

    fn acknowledge(&mut self, trigger: UnlockTrigger) -> GateDecision {
        self.watched = true;
        if self.completed_acknowledged {
            return GateDecision::AlreadyUnlocked;
        }
        self.completed_acknowledged = true;
        GateDecision::Unlocked(trigger)
    }
}
