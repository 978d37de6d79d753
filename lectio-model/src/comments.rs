use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ChapterComment {
    pub course_id: String,
    pub chapter_id: String,
    pub user_id: Option<String>,
    pub user_name: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /courses/{courseId}/chapters/{chapterId}/comments`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NewCommentRequest {
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub user_id: Option<String>,
    pub user_name: String,
    pub content: String,
}

/// Both comment endpoints answer with the full, refreshed thread.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CommentsResponse {
    pub comments: Vec<ChapterComment>,
}
