//! Core data model definitions shared across Lectio crates.
#![allow(missing_docs)]

pub mod activity;
pub mod comments;
pub mod course;
pub mod enrollment;
pub mod error;
pub mod ids;
pub mod playback;
pub mod prelude;

// Intentionally curated re-exports for downstream consumers.
pub use activity::{ActivityAction, TrackActivityRequest};
pub use comments::{ChapterComment, CommentsResponse, NewCommentRequest};
pub use course::{Chapter, Course};
pub use enrollment::{
    Certificate, EnrolledCourse, EnrollmentStatus,
    UpdateProgressRequest, UpdateProgressResponse,
};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ChapterId, CourseId, SessionId, UserId};
pub use playback::{EmbeddedPlayerState, PlaybackSourceKind};
