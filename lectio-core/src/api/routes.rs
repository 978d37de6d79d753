//! Route templates of the course API, relative to the configured base URL.

/// Course documents and their chapter threads.
pub mod courses {
    /// One course with its chapters.
    pub const ITEM: &str = "/courses/{course_id}";
    /// Comment thread of one chapter (GET and POST).
    pub const CHAPTER_COMMENTS: &str =
        "/courses/{course_id}/chapters/{chapter_id}/comments";
}

/// Per-learner progress and activity.
pub mod userdata {
    /// Enrollments of one learner.
    pub const ENROLLED_COURSES: &str = "/userdata/enrolled-courses/{user_id}";
    /// Record a completed chapter.
    pub const UPDATE_PROGRESS: &str = "/userdata/update-progress";
    /// Append an activity entry.
    pub const TRACK_ACTIVITY: &str = "/userdata/track-activity";
}

/// Helper utilities for working with route templates
pub mod utils {
    /// Split a template into path segments, substituting `{param}`
    /// placeholders. Values are kept raw; the caller encodes segments.
    pub fn expand(route: &str, params: &[(&str, &str)]) -> Vec<String> {
        route
            .trim_matches('/')
            .split('/')
            .map(|segment| {
                params
                    .iter()
                    .find(|(param, _)| *param == segment)
                    .map(|(_, value)| value.to_string())
                    .unwrap_or_else(|| segment.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_become_segments() {
        let segments = utils::expand(
            courses::CHAPTER_COMMENTS,
            &[("{course_id}", "abc/1"), ("{chapter_id}", "2")],
        );
        assert_eq!(
            segments,
            vec!["courses", "abc/1", "chapters", "2", "comments"]
        );
    }

    #[test]
    fn static_routes_pass_through() {
        assert_eq!(
            utils::expand(userdata::UPDATE_PROGRESS, &[]),
            vec!["userdata", "update-progress"]
        );
    }
}
