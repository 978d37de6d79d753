use crate::ids::{ChapterId, CourseId, UserId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of activity entry appended to the learner's log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ActivityAction {
    Started,
    Continued,
    Completed,
    Paused,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Started => "started",
            ActivityAction::Continued => "continued",
            ActivityAction::Completed => "completed",
            ActivityAction::Paused => "paused",
        }
    }
}

/// Body of `POST /userdata/track-activity`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TrackActivityRequest {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub chapter_id: ChapterId,
    pub chapter_title: String,
    /// Whole minutes spent since the previous report.
    pub time_spent: u64,
    pub action: ActivityAction,
}
