//! Convenience glob import for downstream crates.

pub use crate::activity::{ActivityAction, TrackActivityRequest};
pub use crate::comments::{
    ChapterComment, CommentsResponse, NewCommentRequest,
};
pub use crate::course::{Chapter, Course};
pub use crate::enrollment::{
    Certificate, EnrolledCourse, EnrollmentStatus,
    UpdateProgressRequest, UpdateProgressResponse,
};
pub use crate::ids::{ChapterId, CourseId, SessionId, UserId};
pub use crate::playback::{EmbeddedPlayerState, PlaybackSourceKind};
