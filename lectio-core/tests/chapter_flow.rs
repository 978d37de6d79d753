use async_trait::async_trait;
use lectio_config::FallbackConfig;
use lectio_core::api::CourseApi;
use lectio_core::error::ApiResult;
use lectio_core::{
    ChapterController, ChapterGate, GateError, GateEvent, Learner, NativeMediaEvent,
    NativeSource, UnlockTrigger,
};
use lectio_model::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory course backend.
#[derive(Debug, Default)]
struct FakeBackend {
    completed: Mutex<Vec<String>>,
}

fn course() -> Course {
    Course {
        id: Some("rust-101".into()),
        title: "Rust 101".into(),
        chapters: (1..=2)
            .map(|n| Chapter {
                id: Some(ChapterId::from_ordinal(n)),
                title: format!("Chapitre {n}"),
                video_url: Some(format!("https://cdn.example.com/{n}.mp4")),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

#[async_trait]
impl CourseApi for FakeBackend {
    async fn fetch_course(&self, _course_id: &CourseId) -> ApiResult<Course> {
        Ok(course())
    }

    async fn fetch_enrollments(&self, _user_id: &UserId) -> ApiResult<Vec<EnrolledCourse>> {
        Ok(vec![EnrolledCourse {
            course_id: "rust-101".into(),
            completed_chapter_ids: self.completed.lock().unwrap().clone(),
            ..Default::default()
        }])
    }

    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> ApiResult<UpdateProgressResponse> {
        self.completed
            .lock()
            .unwrap()
            .push(request.chapter_id.to_string());
        Ok(UpdateProgressResponse::default())
    }

    async fn fetch_comments(
        &self,
        _course_id: &CourseId,
        _chapter_id: &ChapterId,
    ) -> ApiResult<Vec<ChapterComment>> {
        Ok(Vec::new())
    }

    async fn post_comment(
        &self,
        _course_id: &CourseId,
        _chapter_id: &ChapterId,
        _comment: NewCommentRequest,
    ) -> ApiResult<Vec<ChapterComment>> {
        Ok(Vec::new())
    }
}

fn controller(backend: Arc<FakeBackend>) -> ChapterController {
    ChapterController::new(
        backend,
        Some(Learner {
            id: UserId::new("learner").unwrap(),
            name: None,
        }),
        FallbackConfig {
            video_url: "https://cdn.example.com/placeholder.mp4".into(),
            chapter_duration: "45 min".into(),
        },
        ChapterGate::new(Duration::from_secs(120)),
    )
}

#[tokio::test(start_paused = true)]
async fn watching_a_chapter_unlocks_the_next_one() {
    let backend = Arc::new(FakeBackend::default());
    let mut controller = controller(Arc::clone(&backend));
    let course_id = CourseId::new("rust-101").unwrap();

    let source = Arc::new(NativeSource::new());
    let handle = controller
        .open(&course_id, &ChapterId::from_ordinal(1), source.clone())
        .await
        .unwrap();
    let mut events = handle.subscribe();
    assert!(matches!(controller.advance().await, Err(GateError::Locked)));

    for (current_time, duration) in [(10.0, 200.0), (100.0, 200.0), (171.0, 200.0)] {
        let signal = source
            .handle_event(NativeMediaEvent::TimeUpdate {
                current_time,
                duration,
            })
            .unwrap();
        handle.signal(signal).unwrap();
    }

    match events.recv().await.unwrap() {
        GateEvent::ChapterWatched { trigger, .. } => {
            assert!(matches!(trigger, UnlockTrigger::Threshold { .. }));
        }
        other => panic!("unexpected event {other:?}"),
    }

    let next = controller.advance().await.unwrap();
    assert_eq!(next, Some(ChapterId::from_ordinal(2)));
    assert_eq!(*backend.completed.lock().unwrap(), vec!["1".to_string()]);

    // The next chapter starts locked with a fresh session.
    let second = controller
        .open(&course_id, &ChapterId::from_ordinal(2), Arc::new(NativeSource::new()))
        .await
        .unwrap();
    assert_ne!(second.id(), handle.id());
    assert!(!controller.can_advance());
    assert_eq!(controller.session().map(|s| s.id()), Some(second.id()));

    // Revisiting a completed chapter is unlocked from the start.
    controller
        .open(&course_id, &ChapterId::from_ordinal(1), Arc::new(NativeSource::new()))
        .await
        .unwrap();
    assert!(controller.can_advance());
    controller.close();
}
