//! Enrollment records and the progress-recording exchange.

use crate::ids::{ChapterId, CourseId, UserId};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnrollmentStatus {
    NotStarted,
    #[default]
    InProgress,
    Completed,
    Paused,
}

/// A learner's progress record against one course.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct EnrolledCourse {
    pub course_id: String,
    pub title: String,
    /// Percentage in `0..=100`.
    pub progress: f64,
    pub completed_chapters: u32,
    pub total_chapters: u32,
    pub completed_chapter_ids: Vec<String>,
    pub status: EnrollmentStatus,
    pub enrolled_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl EnrolledCourse {
    pub fn is_for(&self, course_id: &CourseId) -> bool {
        self.course_id == course_id.as_str()
    }

    pub fn has_completed(&self, chapter_id: &ChapterId) -> bool {
        self.completed_chapter_ids
            .iter()
            .any(|id| id.trim() == chapter_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Certificate {
    pub certificate_id: String,
    pub course_id: String,
    pub course_title: String,
    pub issued_date: Option<DateTime<Utc>>,
    pub verification_token: String,
    pub completion_date: Option<DateTime<Utc>>,
    pub total_hours: f64,
    pub grade: String,
}

/// Body of `POST /userdata/update-progress`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct UpdateProgressRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub chapter_id: ChapterId,
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct UpdateProgressResponse {
    pub enrollment: Option<EnrolledCourse>,
    pub certificate_generated: bool,
    pub certificate: Option<Certificate>,
}

impl UpdateProgressResponse {
    /// Certificate issued by this update, if any.
    pub fn issued_certificate(&self) -> Option<&Certificate> {
        self.certificate
            .as_ref()
            .filter(|_| self.certificate_generated)
    }
}
