//! Chapter video resolution.
//!
//! A chapter may point at a hosted YouTube video (played through the
//! embedded player), a direct media URL (played natively), or nothing at all,
//! in which case the configured placeholder video is used instead of failing
//! the view.

use crate::backfill::extract_video_id;

use lectio_model::{Chapter, Course, PlaybackSourceKind};
use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Playable video for a chapter view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVideo {
    /// Embed link or direct media URL.
    pub url: String,
    /// Player that renders `url`.
    pub kind: PlaybackSourceKind,
    /// `true` when the placeholder was substituted.
    pub is_placeholder: bool,
}

impl ResolvedVideo {
    /// `true` when the video plays in the embedded (polled) player.
    pub fn is_embedded(&self) -> bool {
        self.kind == PlaybackSourceKind::Embedded
    }

    /// Video id for the embedded player, when the URL is an embed link.
    pub fn embedded_video_id(&self) -> Option<String> {
        if self.is_embedded() {
            extract_video_id(&self.url)
        } else {
            None
        }
    }
}

/// Pick the chapter's video, falling back to `placeholder_url`.
///
/// Lookup order: chapter `youtube_url`, course `youtube_url`, chapter
/// `youtubeUrl`, course `youtubeUrl`, then the chapter's direct `videoUrl`.
pub fn resolve_video(
    chapter: &Chapter,
    course: &Course,
    placeholder_url: &str,
) -> ResolvedVideo {
    let hosted = [
        &chapter.youtube_url,
        &course.youtube_url,
        &chapter.youtube_url_alt,
        &course.youtube_url_alt,
    ]
    .into_iter()
    .find_map(|candidate| {
        candidate
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    });

    if let Some(raw) = hosted {
        return ResolvedVideo {
            url: to_embed_url(raw),
            kind: PlaybackSourceKind::Embedded,
            is_placeholder: false,
        };
    }

    match chapter.video_url() {
        Some(url) => ResolvedVideo {
            url: url.to_string(),
            kind: PlaybackSourceKind::Native,
            is_placeholder: false,
        },
        None => ResolvedVideo {
            url: placeholder_url.to_string(),
            kind: PlaybackSourceKind::Native,
            is_placeholder: true,
        },
    }
}

/// Rewrite watch and short links into embed links. Anything else is
/// returned unchanged.
pub fn to_embed_url(raw: &str) -> String {
    if raw.contains("youtube.com/watch") {
        let id = Url::parse(raw).ok().and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        });
        return match id {
            Some(id) if !id.is_empty() => format!("{EMBED_BASE}{id}"),
            _ => raw.to_string(),
        };
    }

    if let Some((_, rest)) = raw.split_once("youtu.be/") {
        let id = rest.split(['?', '#']).next().unwrap_or_default();
        if !id.is_empty() {
            return format!("{EMBED_BASE}{id}");
        }
    }

    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "https://cdn.example.com/placeholder.mp4";

    #[test]
    fn watch_and_short_links_become_embeds() {
        assert_eq!(
            to_embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            to_embed_url("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            to_embed_url("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn embedded_video_id_uses_the_backfill_patterns() {
        for url in [
            "https://www.youtube.com/embed/abc123?rel=0",
            "https://www.youtube.com/embed/abc123#t=5",
        ] {
            let video = ResolvedVideo {
                url: url.to_string(),
                kind: PlaybackSourceKind::Embedded,
                is_placeholder: false,
            };
            assert_eq!(video.embedded_video_id().as_deref(), Some("abc123"), "{url}");
        }

        let empty = ResolvedVideo {
            url: "https://youtu.be/".to_string(),
            kind: PlaybackSourceKind::Embedded,
            is_placeholder: false,
        };
        assert_eq!(empty.embedded_video_id(), None);
    }

    #[test]
    fn chapter_link_wins_over_course_link() {
        let chapter = Chapter {
            youtube_url: Some("https://youtu.be/chapter".into()),
            ..Default::default()
        };
        let course = Course {
            youtube_url: Some("https://youtu.be/course".into()),
            ..Default::default()
        };

        let video = resolve_video(&chapter, &course, PLACEHOLDER);
        assert_eq!(video.url, "https://www.youtube.com/embed/chapter");
        assert!(video.is_embedded());
        assert_eq!(video.embedded_video_id().as_deref(), Some("chapter"));
    }

    #[test]
    fn course_snake_case_link_precedes_chapter_camel_case() {
        let chapter = Chapter {
            youtube_url_alt: Some("https://youtu.be/camel".into()),
            ..Default::default()
        };
        let course = Course {
            youtube_url: Some("https://youtu.be/snake".into()),
            ..Default::default()
        };

        let video = resolve_video(&chapter, &course, PLACEHOLDER);
        assert_eq!(video.url, "https://www.youtube.com/embed/snake");
    }

    #[test]
    fn direct_video_plays_natively() {
        let chapter = Chapter {
            video_url: Some("https://cdn.example.com/ch1.mp4".into()),
            ..Default::default()
        };
        let video = resolve_video(&chapter, &Course::default(), PLACEHOLDER);
        assert_eq!(video.kind, PlaybackSourceKind::Native);
        assert!(!video.is_placeholder);
        assert_eq!(video.embedded_video_id(), None);
    }

    #[test]
    fn missing_video_falls_back_to_placeholder() {
        let video =
            resolve_video(&Chapter::default(), &Course::default(), PLACEHOLDER);
        assert_eq!(video.url, PLACEHOLDER);
        assert!(video.is_placeholder);
        assert_eq!(video.kind, PlaybackSourceKind::Native);
    }
}
