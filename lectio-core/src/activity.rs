//! Background watch-time reporting.

use crate::api::ActivitySink;
use crate::session::SessionContext;

use lectio_model::{
    ActivityAction, ChapterId, CourseId, TrackActivityRequest, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Reports time spent on one chapter session.
///
/// Only exists for signed-in learners; anonymous sessions are not tracked.
#[derive(Debug)]
pub struct ActivityTracker {
    sink: Arc<dyn ActivitySink>,
    user_id: UserId,
    course_id: CourseId,
    chapter_id: ChapterId,
    chapter_title: String,
    interval: Duration,
    last_report: Instant,
}

impl ActivityTracker {
    /// Start tracking at the current instant. Returns `None` when nobody is
    /// signed in.
    pub fn for_session(
        sink: Arc<dyn ActivitySink>,
        context: &SessionContext,
        interval: Duration,
    ) -> Option<Self> {
        let Some(user_id) = context.user_id.clone() else {
            debug!(
                chapter_id = %context.chapter_id,
                "no signed-in user; activity tracking disabled"
            );
            return None;
        };

        Some(Self {
            sink,
            user_id,
            course_id: context.course_id.clone(),
            chapter_id: context.chapter_id.clone(),
            chapter_title: context.chapter_title.clone(),
            interval,
            last_report: Instant::now(),
        })
    }

    /// Time between two `continued` reports.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Minutes credited for one full reporting interval, at least one.
    pub fn interval_minutes(&self) -> u64 {
        (self.interval.as_secs() / 60).max(1)
    }

    /// Periodic report while the chapter stays open.
    pub async fn report_interval(&mut self) {
        self.last_report = Instant::now();
        self.send(ActivityAction::Continued, self.interval_minutes())
            .await;
    }

    /// Final report when the session closes, covering the whole minutes
    /// since the last periodic report. Nothing is sent below one minute.
    pub async fn report_residual(&mut self) {
        let minutes = self.last_report.elapsed().as_secs() / 60;
        self.last_report = Instant::now();
        if minutes == 0 {
            debug!(chapter_id = %self.chapter_id, "no residual activity to report");
            return;
        }
        self.send(ActivityAction::Paused, minutes).await;
    }

    async fn send(&self, action: ActivityAction, time_spent: u64) {
        let request = TrackActivityRequest {
            user_id: self.user_id.clone(),
            course_id: self.course_id.clone(),
            chapter_id: self.chapter_id.clone(),
            chapter_title: self.chapter_title.clone(),
            time_spent,
            action,
        };

        match self.sink.track_activity(request).await {
            Ok(()) => debug!(
                chapter_id = %self.chapter_id,
                action = action.as_str(),
                time_spent,
                "activity reported"
            ),
            Err(err) => warn!(
                chapter_id = %self.chapter_id,
                action = action.as_str(),
                error = %err,
                "failed to report activity"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockActivitySink;
    use crate::error::ApiError;

    fn context(user: Option<&str>) -> SessionContext {
        SessionContext {
            course_id: CourseId::new("course-1").unwrap(),
            chapter_id: ChapterId::from_ordinal(2),
            chapter_title: "Chapitre 2".into(),
            user_id: user.map(|id| UserId::new(id).unwrap()),
        }
    }

    #[test]
    fn anonymous_sessions_are_not_tracked() {
        let sink = Arc::new(MockActivitySink::new());
        assert!(
            ActivityTracker::for_session(
                sink,
                &context(None),
                Duration::from_secs(120)
            )
            .is_none()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn interval_reports_two_minutes() {
        let mut sink = MockActivitySink::new();
        sink.expect_track_activity()
            .withf(|request| {
                request.action == ActivityAction::Continued
                    && request.time_spent == 2
                    && request.user_id.as_str() == "user-1"
                    && request.chapter_title == "Chapitre 2"
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut tracker = ActivityTracker::for_session(
            Arc::new(sink),
            &context(Some("user-1")),
            Duration::from_secs(120),
        )
        .unwrap();
        tracker.report_interval().await;
    }

    #[tokio::test(start_paused = true)]
    async fn residual_counts_whole_minutes_since_last_report() {
        let mut sink = MockActivitySink::new();
        sink.expect_track_activity()
            .withf(|request| {
                request.action == ActivityAction::Paused && request.time_spent == 1
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut tracker = ActivityTracker::for_session(
            Arc::new(sink),
            &context(Some("user-1")),
            Duration::from_secs(120),
        )
        .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        tracker.report_residual().await;

        tokio::time::advance(Duration::from_secs(65)).await;
        tracker.report_residual().await;
    }

    #[tokio::test(start_paused = true)]
    async fn sink_failures_are_swallowed() {
        let mut sink = MockActivitySink::new();
        sink.expect_track_activity().times(1).returning(|_| {
            Err(ApiError::Status {
                path: "/userdata/track-activity".into(),
                status: 503,
                body: "unavailable".into(),
            })
        });

        let mut tracker = ActivityTracker::for_session(
            Arc::new(sink),
            &context(Some("user-1")),
            Duration::from_secs(30),
        )
        .unwrap();
        assert_eq!(tracker.interval_minutes(), 1);
        tracker.report_interval().await;
    }
}
