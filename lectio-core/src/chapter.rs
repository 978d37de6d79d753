//! Chapter loading and navigation.
//!
//! [`ChapterController`] is the backend of one chapter page: it loads the
//! course document, resolves the chapter and its video, seeds the watch gate
//! from the learner's enrollment and then guards navigation with it.

use crate::api::CourseApi;
use crate::error::{GateError, Result};
use crate::gate::WatchState;
use crate::session::{ChapterGate, SessionContext, SessionHandle};
use crate::source::PositionSource;
use crate::video::{ResolvedVideo, resolve_video};

use lectio_config::{Config, FallbackConfig};
use lectio_model::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DEFAULT_COMMENT_AUTHOR: &str = "Utilisateur";

/// The signed-in learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Learner {
    /// Id sent with progress and activity calls.
    pub id: UserId,
    /// Display name used for comments.
    pub name: Option<String>,
}

impl Learner {
    /// Learner configured in `session.*`, if any.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        let Some(raw) = config.session.user_id.as_deref() else {
            return Ok(None);
        };
        Ok(Some(Self {
            id: UserId::new(raw)?,
            name: config.session.user_name.clone(),
        }))
    }
}

/// Position of a chapter within its course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterNavigation {
    /// 1-based number, `None` for non-numeric ids.
    pub position: Option<u32>,
    /// Number of chapters in the course.
    pub total: u32,
    /// Preceding chapter.
    pub previous: Option<ChapterId>,
    /// Following chapter.
    pub next: Option<ChapterId>,
    /// This is the final chapter.
    pub is_last: bool,
}

impl ChapterNavigation {
    /// Chapters are addressed by 1-based number; non-numeric ids have no
    /// neighbours.
    pub fn for_chapter(chapter_id: &ChapterId, total: u32) -> Self {
        let position = chapter_id.ordinal();
        let (previous, next, is_last) = match position {
            Some(n) => (
                (n > 1).then(|| ChapterId::from_ordinal(n - 1)),
                (n < total).then(|| ChapterId::from_ordinal(n + 1)),
                n == total,
            ),
            None => (None, None, false),
        };
        Self {
            position,
            total,
            previous,
            next,
            is_last,
        }
    }
}

/// Everything the chapter page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterView {
    /// Course the chapter belongs to.
    pub course_id: CourseId,
    /// Course title.
    pub course_title: String,
    /// Requested chapter id.
    pub chapter_id: ChapterId,
    /// Chapter document, possibly synthesized.
    pub chapter: Chapter,
    /// The course had no matching chapter; `chapter` was synthesized.
    pub is_placeholder: bool,
    /// Video to play.
    pub video: ResolvedVideo,
    /// Previous and next chapters.
    pub navigation: ChapterNavigation,
    /// The enrollment lists this chapter as completed.
    pub already_completed: bool,
    /// Comment thread; empty when it could not be loaded.
    pub comments: Vec<ChapterComment>,
}

impl ChapterView {
    /// Initial gate state of a session on this chapter.
    pub fn seed(&self) -> WatchState {
        WatchState::seeded(self.already_completed)
    }

    /// Session identity for `user_id` watching this chapter.
    pub fn session_context(&self, user_id: Option<&UserId>) -> SessionContext {
        SessionContext {
            course_id: self.course_id.clone(),
            chapter_id: self.chapter_id.clone(),
            chapter_title: self.chapter.title.clone(),
            user_id: user_id.cloned(),
        }
    }
}

/// Locate a chapter by id, then by 1-based index, else synthesize one
/// named after the course. The flag is `true` for a synthesized chapter.
pub fn find_chapter(
    course: &Course,
    chapter_id: &ChapterId,
    fallback_duration: &str,
) -> (Chapter, bool) {
    if let Some(chapter) = course
        .chapters
        .iter()
        .find(|chapter| chapter.id.as_ref() == Some(chapter_id))
    {
        return (chapter.clone(), false);
    }

    let by_index = chapter_id
        .ordinal()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| course.chapters.get(index as usize));
    if let Some(chapter) = by_index {
        return (chapter.clone(), false);
    }

    let duration = match course.duration_hours {
        Some(hours) => format!("{hours}h"),
        None => fallback_duration.to_string(),
    };
    let placeholder = Chapter {
        id: Some(chapter_id.clone()),
        title: course.title.clone(),
        duration: Some(duration),
        ..Default::default()
    };
    (placeholder, true)
}

/// Drives one chapter page.
#[derive(Debug)]
pub struct ChapterController {
    api: Arc<dyn CourseApi>,
    learner: Option<Learner>,
    fallback: FallbackConfig,
    gate: ChapterGate,
    view: Option<ChapterView>,
}

impl ChapterController {
    /// Controller with no chapter loaded.
    pub fn new(
        api: Arc<dyn CourseApi>,
        learner: Option<Learner>,
        fallback: FallbackConfig,
        gate: ChapterGate,
    ) -> Self {
        Self {
            api,
            learner,
            fallback,
            gate,
            view: None,
        }
    }

    /// Signed-in learner, if any.
    pub fn learner(&self) -> Option<&Learner> {
        self.learner.as_ref()
    }

    /// Chapter currently shown.
    pub fn view(&self) -> Option<&ChapterView> {
        self.view.as_ref()
    }

    /// Session of the chapter currently shown.
    pub fn session(&self) -> Option<&SessionHandle> {
        self.gate.active()
    }

    /// Fetch the course and build the view of one chapter.
    ///
    /// Only the course fetch is fatal. Comments and enrollment lookups that
    /// fail are logged and treated as empty.
    pub async fn load(
        &self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
    ) -> Result<ChapterView> {
        let course = self.api.fetch_course(course_id).await.map_err(|err| {
            warn!(%course_id, error = %err, "failed to load course");
            err
        })?;

        let (chapter, is_placeholder) =
            find_chapter(&course, chapter_id, &self.fallback.chapter_duration);
        if is_placeholder {
            debug!(%course_id, %chapter_id, "chapter not found; using placeholder");
        }
        let video = resolve_video(&chapter, &course, &self.fallback.video_url);
        let navigation =
            ChapterNavigation::for_chapter(chapter_id, course.chapter_count());

        let comments = match self.api.fetch_comments(course_id, chapter_id).await {
            Ok(comments) => comments,
            Err(err) => {
                warn!(%course_id, %chapter_id, error = %err, "failed to load chapter comments");
                Vec::new()
            }
        };
        let already_completed = self.is_completed(course_id, chapter_id).await;

        Ok(ChapterView {
            course_id: course_id.clone(),
            course_title: course.title,
            chapter_id: chapter_id.clone(),
            chapter,
            is_placeholder,
            video,
            navigation,
            already_completed,
            comments,
        })
    }

    async fn is_completed(&self, course_id: &CourseId, chapter_id: &ChapterId) -> bool {
        let Some(learner) = &self.learner else {
            return false;
        };
        match self.api.fetch_enrollments(&learner.id).await {
            Ok(enrollments) => enrollments
                .iter()
                .find(|enrollment| enrollment.is_for(course_id))
                .is_some_and(|enrollment| enrollment.has_completed(chapter_id)),
            Err(err) => {
                warn!(user_id = %learner.id, error = %err, "failed to load enrollments");
                false
            }
        }
    }

    /// Show `view` and start watching it with `source`, replacing the
    /// previous chapter's session.
    pub fn start(
        &mut self,
        view: ChapterView,
        source: Arc<dyn PositionSource>,
    ) -> SessionHandle {
        let context =
            view.session_context(self.learner.as_ref().map(|learner| &learner.id));
        let handle = self.gate.open(context, source, view.seed());
        if view.already_completed {
            info!(chapter_id = %view.chapter_id, "chapter already completed; unlocked");
        }
        self.view = Some(view);
        handle
    }

    /// Load a chapter and start its session in one step.
    pub async fn open(
        &mut self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
        source: Arc<dyn PositionSource>,
    ) -> Result<SessionHandle> {
        let view = self.load(course_id, chapter_id).await?;
        Ok(self.start(view, source))
    }

    /// The learner may move to the next chapter.
    pub fn can_advance(&self) -> bool {
        let completed = self.view.as_ref().is_some_and(|view| view.already_completed);
        completed || self.gate.active().is_some_and(SessionHandle::can_advance)
    }

    /// Unlock the current chapter on the learner's request.
    pub fn manual_override(&self) -> Result<()> {
        self.gate.active().ok_or(GateError::NoSession)?.manual_override()
    }

    /// Record the current chapter as completed for the signed-in learner.
    pub async fn mark_complete(&mut self) -> Result<UpdateProgressResponse> {
        let learner = self.learner.as_ref().ok_or(GateError::NotSignedIn)?;
        let view = self.view.as_mut().ok_or(GateError::NoSession)?;

        let request = UpdateProgressRequest {
            user_id: learner.id.clone(),
            course_id: view.course_id.clone(),
            chapter_id: view.chapter_id.clone(),
            completed: true,
        };
        let response = self.api.update_progress(request).await.map_err(|err| {
            warn!(chapter_id = %view.chapter_id, error = %err, "failed to mark chapter complete");
            err
        })?;

        view.already_completed = true;
        if let Some(handle) = self.gate.active() {
            handle.record_completed()?;
        }

        match response.issued_certificate() {
            Some(certificate) => info!(
                course_id = %view.course_id,
                certificate_id = %certificate.certificate_id,
                "certificate issued"
            ),
            None => debug!(chapter_id = %view.chapter_id, "chapter marked complete"),
        }
        Ok(response)
    }

    /// Move on to the next chapter.
    ///
    /// Fails with [`GateError::Locked`] until the chapter is watched. The
    /// completion is recorded on the way out; failures there are logged
    /// only. Returns `None` after the last chapter.
    pub async fn advance(&mut self) -> Result<Option<ChapterId>> {
        if self.view.is_none() {
            return Err(GateError::NoSession);
        }
        if !self.can_advance() {
            return Err(GateError::Locked);
        }

        if self.learner.is_some() {
            if let Err(err) = self.mark_complete().await {
                warn!(error = %err, "could not record completion before advancing");
            }
        }

        Ok(self.view.as_ref().and_then(|view| view.navigation.next.clone()))
    }

    /// Post a comment on the current chapter and refresh the thread.
    pub async fn post_comment(&mut self, content: &str) -> Result<&[ChapterComment]> {
        let content = content.trim();
        if content.is_empty() {
            return Err(GateError::EmptyComment);
        }
        let view = self.view.as_mut().ok_or(GateError::NoSession)?;

        let comment = NewCommentRequest {
            user_id: self.learner.as_ref().map(|learner| learner.id.to_string()),
            user_name: self
                .learner
                .as_ref()
                .and_then(|learner| learner.name.clone())
                .unwrap_or_else(|| DEFAULT_COMMENT_AUTHOR.to_string()),
            content: content.to_string(),
        };
        view.comments = self
            .api
            .post_comment(&view.course_id, &view.chapter_id, comment)
            .await?;
        Ok(&view.comments)
    }

    /// Leave the chapter page.
    pub fn close(&mut self) {
        self.gate.close();
        self.view = None;
    }
}
