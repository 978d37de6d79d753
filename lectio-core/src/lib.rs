//! Lectio core: chapter progress gating for course videos.
//!
//! A learner may only move past a chapter once its video has been watched.
//! This crate decides when that happens and wires the decision to the
//! course backend:
//!
//! - [`gate`] holds the pure watch rules ([`WatchState`]).
//! - [`source`] adapts the embedded (polled) and native (push) players.
//! - [`session`] runs one cancellable task per chapter view.
//! - [`activity`] reports watch time in the background.
//! - [`chapter`] and [`video`] load the chapter page and guard navigation.
//! - [`api`] is the HTTP client of the course API.
//! - [`backfill`] plans generated chapters for single-video courses.

pub mod activity;
pub mod api;
pub mod backfill;
pub mod chapter;
pub mod error;
pub mod gate;
pub mod session;
pub mod source;
pub mod video;

pub use activity::ActivityTracker;
pub use api::{ActivitySink, CourseApi, HttpCourseApi};
pub use backfill::{BackfillPlanner, BackfillReport, CoursePlan, VideoProbe, YoutubeProbe};
pub use chapter::{ChapterController, ChapterNavigation, ChapterView, Learner};
pub use error::{ApiError, GateError, Result, SourceError};
pub use gate::{GateDecision, UnlockTrigger, WATCH_THRESHOLD, WatchState};
pub use session::{
    ChapterGate, ChapterSession, CurrentSession, GateEvent, SessionContext,
    SessionHandle,
};
pub use source::{
    EmbeddedPlayerHandle, EmbeddedSource, NativeMediaEvent, NativeSource,
    PositionSource, Sampling, SourceSignal,
};
pub use video::ResolvedVideo;
