//! Course documents as served by `GET /courses/{courseId}`.
//!
//! The course store is schemaless, so every field is optional and both the
//! snake_case and camelCase spellings of the video link are accepted.

use crate::ids::ChapterId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Course {
    #[cfg_attr(feature = "serde", serde(rename = "_id", alias = "id"))]
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_hours: Option<f64>,
    pub youtube_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "youtubeUrl"))]
    pub youtube_url_alt: Option<String>,
    pub video_url: Option<String>,
    pub chapters: Vec<Chapter>,
}

impl Course {
    pub fn chapter_count(&self) -> u32 {
        u32::try_from(self.chapters.len()).unwrap_or(u32::MAX)
    }

    /// Course-level video link used by the backfill tool.
    pub fn primary_video_url(&self) -> Option<&str> {
        non_empty(&self.youtube_url)
            .or_else(|| non_empty(&self.youtube_url_alt))
            .or_else(|| non_empty(&self.video_url))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Chapter {
    pub id: Option<ChapterId>,
    pub title: String,
    /// Human readable length such as `"1h 20min"` or `"45 min"`.
    pub duration: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "videoUrl"))]
    pub video_url: Option<String>,
    pub youtube_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(rename = "youtubeUrl"))]
    pub youtube_url_alt: Option<String>,
    pub transcription: Option<String>,
}

impl Chapter {
    pub fn video_url(&self) -> Option<&str> {
        non_empty(&self.video_url)
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
