//! Course API service traits and the HTTP implementation.
//!
//! The chapter view only talks to the backend through [`CourseApi`] and
//! [`ActivitySink`], so tests and alternative transports can stand in for
//! [`HttpCourseApi`].

mod client;
pub mod routes;

pub use client::HttpCourseApi;

use crate::error::ApiResult;
use async_trait::async_trait;
use lectio_model::prelude::*;
use std::fmt::Debug;

/// Read and write operations the chapter view needs from the backend.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CourseApi: Send + Sync + Debug {
    /// Fetch a course document including its chapters.
    async fn fetch_course(&self, course_id: &CourseId) -> ApiResult<Course>;

    /// Fetch every enrollment of a learner.
    async fn fetch_enrollments(
        &self,
        user_id: &UserId,
    ) -> ApiResult<Vec<EnrolledCourse>>;

    /// Record a chapter as completed. May issue a certificate.
    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> ApiResult<UpdateProgressResponse>;

    /// Fetch the comment thread of a chapter.
    async fn fetch_comments(
        &self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
    ) -> ApiResult<Vec<ChapterComment>>;

    /// Post a comment and return the refreshed thread.
    async fn post_comment(
        &self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
        comment: NewCommentRequest,
    ) -> ApiResult<Vec<ChapterComment>>;
}

/// Destination for background watch-time reports.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActivitySink: Send + Sync + Debug {
    /// Send one activity entry.
    async fn track_activity(&self, request: TrackActivityRequest)
    -> ApiResult<()>;
}
