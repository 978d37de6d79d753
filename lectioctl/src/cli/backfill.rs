use super::print_json;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use lectio_config::Config;
use lectio_core::api::CourseApi;
use lectio_core::{BackfillPlanner, HttpCourseApi, YoutubeProbe};
use lectio_model::{Course, CourseId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum BackfillAction {
    /// Estimate video lengths and print generated chapters as JSON
    Plan {
        /// JSON file holding an array of course documents
        #[arg(long, conflicts_with = "course")]
        input: Option<PathBuf>,
        /// Course ids to fetch from the course API (repeatable)
        #[arg(long)]
        course: Vec<CourseId>,
        /// Seed for the chapter count, for reproducible plans
        #[arg(long)]
        seed: Option<u64>,
    },
}

pub async fn run(action: BackfillAction, config: &Config) -> Result<()> {
    match action {
        BackfillAction::Plan {
            input,
            course,
            seed,
        } => {
            let courses = match input {
                Some(path) => read_courses(&path)?,
                None if !course.is_empty() => fetch_courses(config, &course).await?,
                None => bail!("pass --input <file> or at least one --course <id>"),
            };
            info!(courses = courses.len(), "planning chapter backfill");

            let probe = YoutubeProbe::new(config.api.timeout)
                .context("failed to build video probe client")?;
            let planner = BackfillPlanner::new(Arc::new(probe), config.backfill.clone());
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let report = planner.plan_all(&courses, &mut rng).await;
            print_json(&report)
        }
    }
}

fn read_courses(path: &Path) -> Result<Vec<Course>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array of courses", path.display()))
}

async fn fetch_courses(config: &Config, ids: &[CourseId]) -> Result<Vec<Course>> {
    let api = HttpCourseApi::from_config(&config.api)
        .context("invalid course API configuration")?;
    let mut courses = Vec::with_capacity(ids.len());
    for id in ids {
        let course = api
            .fetch_course(id)
            .await
            .with_context(|| format!("failed to fetch course {id}"))?;
        courses.push(course);
    }
    Ok(courses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn courses_are_read_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"_id": "c1", "title": "Rust", "youtube_url": "https://youtu.be/abc"}}, {{"title": "Vide"}}]"#
        )
        .unwrap();

        let courses = read_courses(file.path()).unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].id.as_deref(), Some("c1"));
        assert_eq!(courses[0].primary_video_url(), Some("https://youtu.be/abc"));
        assert_eq!(courses[1].primary_video_url(), None);
    }

    #[test]
    fn malformed_input_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"not\": \"a list\"}}").unwrap();
        let err = read_courses(file.path()).unwrap_err();
        assert!(err.to_string().contains("not a JSON array"));
    }
}
