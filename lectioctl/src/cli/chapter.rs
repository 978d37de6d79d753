use super::print_json;

use anyhow::{Context, Result};
use clap::Subcommand;
use lectio_config::Config;
use lectio_core::{
    ChapterController, ChapterGate, ChapterView, GateDecision, HttpCourseApi,
    Learner, NativeSource, WatchState,
};
use lectio_model::{ChapterId, CourseId};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ChapterAction {
    /// Load a chapter and print what its page shows
    Show {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        chapter: ChapterId,
    },
    /// Record a chapter as completed for the configured learner
    Complete {
        #[arg(long)]
        course: CourseId,
        #[arg(long)]
        chapter: ChapterId,
    },
    /// Feed recorded positions through the watch gate and print each decision
    Replay {
        /// Video length in seconds
        #[arg(long)]
        duration: f64,
        /// Sampled positions in seconds, comma separated, in playback order
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        samples: Vec<f64>,
        /// Finish with an end-of-stream signal
        #[arg(long)]
        ended: bool,
        /// Unlock manually before the first sample
        #[arg(long)]
        manual_override: bool,
        /// Start from a chapter the learner already completed
        #[arg(long)]
        completed: bool,
    },
}

pub async fn run(action: ChapterAction, config: &Config) -> Result<()> {
    match action {
        ChapterAction::Show { course, chapter } => {
            let controller = controller(config)?;
            let view = controller.load(&course, &chapter).await?;
            print_json(&view_summary(&view))
        }
        ChapterAction::Complete { course, chapter } => {
            let mut controller = controller(config)?;
            let view = controller.load(&course, &chapter).await?;
            controller.start(view, Arc::new(NativeSource::new()));
            let response = controller
                .mark_complete()
                .await
                .with_context(|| format!("failed to complete chapter {chapter}"))?;
            controller.close();

            if let Some(certificate) = response.issued_certificate() {
                info!(certificate_id = %certificate.certificate_id, "certificate issued");
            }
            print_json(&json!({
                "courseId": course,
                "chapterId": chapter,
                "progress": response.enrollment.as_ref().map(|e| e.progress),
                "certificateGenerated": response.certificate_generated,
                "certificateId": response.issued_certificate().map(|c| c.certificate_id.clone()),
            }))
        }
        ChapterAction::Replay {
            duration,
            samples,
            ended,
            manual_override,
            completed,
        } => {
            let steps = replay(duration, &samples, ended, manual_override, completed);
            print_json(&steps)
        }
    }
}

fn controller(config: &Config) -> Result<ChapterController> {
    let api = HttpCourseApi::from_config(&config.api)
        .context("invalid course API configuration")?;
    let learner = Learner::from_config(config)?;
    Ok(ChapterController::new(
        Arc::new(api),
        learner,
        config.fallback.clone(),
        ChapterGate::new(config.activity.report_interval),
    ))
}

fn view_summary(view: &ChapterView) -> Value {
    json!({
        "courseId": view.course_id,
        "courseTitle": view.course_title,
        "chapterId": view.chapter_id,
        "title": view.chapter.title,
        "duration": view.chapter.duration,
        "placeholder": view.is_placeholder,
        "video": {
            "url": view.video.url,
            "kind": view.video.kind,
            "placeholder": view.video.is_placeholder,
        },
        "navigation": {
            "previous": view.navigation.previous,
            "next": view.navigation.next,
            "isLast": view.navigation.is_last,
            "total": view.navigation.total,
        },
        "alreadyCompleted": view.already_completed,
        "comments": view.comments.len(),
    })
}

/// Run a sample script through a fresh [`WatchState`].
pub fn replay(
    duration: f64,
    samples: &[f64],
    ended: bool,
    manual_override: bool,
    completed: bool,
) -> Vec<Value> {
    let mut state = WatchState::seeded(completed);
    let mut steps = Vec::new();

    if manual_override {
        let decision = state.manual_override();
        steps.push(step("manual_override", decision, &state));
    }
    for position in samples {
        let decision = state.evaluate_progress(*position, duration);
        steps.push(step(&format!("sample {position}/{duration}"), decision, &state));
    }
    if ended {
        let decision = state.on_playback_ended();
        steps.push(step("ended", decision, &state));
    }
    steps
}

fn step(input: &str, decision: GateDecision, state: &WatchState) -> Value {
    let (outcome, detail) = match decision {
        GateDecision::NotMeasurable => ("not_measurable", Value::Null),
        GateDecision::Pending { fraction } => ("pending", json!(fraction)),
        GateDecision::Unlocked(trigger) => ("unlocked", json!(trigger.label())),
        GateDecision::AlreadyUnlocked => ("already_unlocked", Value::Null),
    };
    json!({
        "input": input,
        "decision": outcome,
        "detail": detail,
        "canAdvance": state.can_advance(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions(steps: &[Value]) -> Vec<&str> {
        steps
            .iter()
            .map(|step| step["decision"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn replay_reports_a_single_unlock() {
        let steps = replay(600.0, &[60.0, 300.0, 509.0, 510.0], true, false, false);
        assert_eq!(
            decisions(&steps),
            vec!["pending", "pending", "pending", "unlocked", "already_unlocked"]
        );
        assert_eq!(steps[3]["detail"], "threshold");
        assert_eq!(steps[2]["canAdvance"], false);
    }

    #[test]
    fn replay_of_completed_chapter_never_unlocks() {
        let steps = replay(600.0, &[600.0], true, true, true);
        assert!(decisions(&steps).iter().all(|d| *d == "already_unlocked"));
    }
}
