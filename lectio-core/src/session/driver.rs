use super::{CurrentSession, GateEvent, SessionCommand, SessionContext};
use crate::activity::ActivityTracker;
use crate::gate::{GateDecision, WatchState};
use crate::source::{PositionSource, SourceSignal, sample};

use lectio_model::SessionId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Exclusive owner of one session's [`WatchState`].
pub(super) struct SessionDriver {
    pub(super) id: SessionId,
    pub(super) context: SessionContext,
    pub(super) state: WatchState,
    pub(super) source: Arc<dyn PositionSource>,
    pub(super) commands: mpsc::UnboundedReceiver<SessionCommand>,
    pub(super) can_advance: watch::Sender<bool>,
    pub(super) events: broadcast::Sender<GateEvent>,
    pub(super) current: CurrentSession,
    pub(super) cancel: CancellationToken,
    pub(super) poll: Option<Interval>,
    pub(super) activity: Option<(ActivityTracker, Interval)>,
}

/// First tick one period from now; `tokio::time::interval` would fire
/// immediately.
pub(super) fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

impl SessionDriver {
    pub(super) async fn run(mut self) {
        debug!(session = %self.id, chapter_id = %self.context.chapter_id, "session started");

        loop {
            if !self.current.is_current(self.id) {
                debug!(session = %self.id, "session superseded; stopping");
                break;
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!(session = %self.id, "session cancelled");
                    break;
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                _ = next_tick(self.poll.as_mut()) => self.poll_source().await,
                _ = next_tick(self.activity.as_mut().map(|(_, interval)| interval)) => {
                    if let Some((tracker, _)) = self.activity.as_mut() {
                        tracker.report_interval().await;
                    }
                }
            }
        }

        self.poll = None;
        if let Some((mut tracker, _)) = self.activity.take() {
            tracker.report_residual().await;
        }
        let _ = self.events.send(GateEvent::SessionClosed { session: self.id });
        debug!(session = %self.id, "session stopped");
    }

    /// Take one sample. A player call still pending at cancellation is
    /// abandoned.
    async fn poll_source(&mut self) {
        let sampled = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            sampled = sample(self.source.as_ref()) => sampled,
        };
        match sampled {
            Ok(signal) => self.apply_signal(signal),
            Err(err) => {
                debug!(session = %self.id, error = %err, "skipping sampling tick");
            }
        }
    }

    fn apply(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Signal(signal) => self.apply_signal(signal),
            SessionCommand::ManualOverride => {
                let decision = self.state.manual_override();
                self.publish(decision);
            }
            SessionCommand::RecordCompleted => {
                if self.state.record_completed() {
                    debug!(session = %self.id, "completion recorded; chapter unlocked");
                }
                self.sync_can_advance();
            }
        }
    }

    fn apply_signal(&mut self, signal: SourceSignal) {
        let decision = match signal {
            SourceSignal::Sample { position, duration } => {
                self.state.evaluate_progress(position, duration)
            }
            SourceSignal::Ended => self.state.on_playback_ended(),
        };
        self.publish(decision);
    }

    fn publish(&mut self, decision: GateDecision) {
        match decision {
            GateDecision::Unlocked(trigger) => {
                info!(
                    session = %self.id,
                    course_id = %self.context.course_id,
                    chapter_id = %self.context.chapter_id,
                    trigger = trigger.label(),
                    "chapter watched"
                );
                self.sync_can_advance();
                let _ = self.events.send(GateEvent::ChapterWatched {
                    session: self.id,
                    chapter_id: self.context.chapter_id.clone(),
                    trigger,
                });
            }
            GateDecision::Pending { fraction } => {
                trace!(session = %self.id, fraction, "watch progress");
            }
            GateDecision::NotMeasurable => {
                debug!(session = %self.id, "duration unknown; sample ignored");
            }
            GateDecision::AlreadyUnlocked => {
                self.sync_can_advance();
            }
        }
    }

    fn sync_can_advance(&self) {
        let can_advance = self.state.can_advance();
        self.can_advance.send_if_modified(|current| {
            if *current == can_advance {
                false
            } else {
                *current = can_advance;
                true
            }
        });
    }
}
