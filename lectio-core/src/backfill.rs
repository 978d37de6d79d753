//! Chapter backfill planning for courses that only carry a single video.
//!
//! For every course with a video link the planner estimates the video length
//! (scraped from the watch page, else guessed from the course title) and
//! splits the course into a handful of generated chapters that all point at
//! that video. Plans are returned, not persisted.

use lectio_config::BackfillConfig;
use lectio_model::{Chapter, ChapterId, Course};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const WATCH_PAGE_BASE: &str = "https://www.youtube.com/watch";
const OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";
const SCRAPE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const INTRO_MINUTES: u32 = 30;
const ADVANCED_MINUTES: u32 = 120;
const DEFAULT_MINUTES: u32 = 60;

static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)",
        r"youtube\.com/embed/([^&\n?#]+)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("video id regex should compile"))
    .collect()
});

static DURATION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#""lengthSeconds":"(\d+)""#,
        r#"\\"lengthSeconds\\":\\"(\d+)\\""#,
        r#""approxDurationMs":"(\d+)""#,
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("duration regex should compile"))
    .collect()
});

/// Video id of a watch, short or embed link.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str().to_string())
    })
}

/// Length in whole minutes (rounded up) found in a watch page.
///
/// The matched number is read as seconds for every pattern, including
/// `approxDurationMs`.
pub fn parse_duration_minutes(html: &str) -> Option<u32> {
    DURATION_PATTERNS.iter().find_map(|pattern| {
        let seconds: u64 = pattern.captures(html)?.get(1)?.as_str().parse().ok()?;
        u32::try_from(seconds.div_ceil(60)).ok()
    })
}

/// Length guess from a course title.
pub fn estimate_minutes_from_title(title: &str) -> u32 {
    let title = title.to_lowercase();
    if title.contains("introduction") || title.contains("démarrer") {
        INTRO_MINUTES
    } else if title.contains("avancé") || title.contains("complet") {
        ADVANCED_MINUTES
    } else {
        DEFAULT_MINUTES
    }
}

/// `"1h 20min"`, `"2h"` or `"45min"`.
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => format!("{m}min"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}min"),
    }
}

/// Subset of the oEmbed document the planner reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OEmbedInfo {
    /// Video title.
    pub title: Option<String>,
    /// Channel name.
    pub author_name: Option<String>,
}

/// Remote lookups used to size a course video.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VideoProbe: Send + Sync + std::fmt::Debug {
    /// Video length in minutes, `None` when the page gives nothing away.
    async fn scrape_duration_minutes(&self, video_id: &str) -> Option<u32>;

    /// oEmbed metadata of the video, used for the title heuristic.
    async fn fetch_oembed(&self, video_url: &str) -> Option<OEmbedInfo>;
}

/// [`VideoProbe`] backed by the public YouTube pages. Failures are
/// reported as `None`.
#[derive(Debug, Clone)]
pub struct YoutubeProbe {
    client: Client,
}

impl YoutubeProbe {
    /// Probe whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(SCRAPE_USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl VideoProbe for YoutubeProbe {
    async fn scrape_duration_minutes(&self, video_id: &str) -> Option<u32> {
        let response = self
            .client
            .get(WATCH_PAGE_BASE)
            .query(&[("v", video_id)])
            .send()
            .await
            .and_then(|response| response.error_for_status());
        let html = match response {
            Ok(response) => response.text().await.ok()?,
            Err(err) => {
                debug!(video_id, error = %err, "watch page unavailable");
                return None;
            }
        };
        parse_duration_minutes(&html)
    }

    async fn fetch_oembed(&self, video_url: &str) -> Option<OEmbedInfo> {
        let response = self
            .client
            .get(OEMBED_ENDPOINT)
            .query(&[("url", video_url), ("format", "json")])
            .send()
            .await
            .and_then(|response| response.error_for_status());
        match response {
            Ok(response) => response.json().await.ok(),
            Err(err) => {
                debug!(video_url, error = %err, "oEmbed lookup failed");
                None
            }
        }
    }
}

/// How a course's video length was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationSource {
    /// Read from the watch page.
    Scraped,
    /// Guessed from the course or video title.
    TitleHeuristic,
    /// No video id in the link; guessed from the course title.
    InvalidUrl,
}

/// Generated chapters for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePlan {
    /// Course document id, when the input had one.
    pub course_id: Option<String>,
    /// Course title.
    pub course_title: String,
    /// Course-level video link shared by every chapter.
    pub video_url: String,
    /// Estimated length of the video.
    pub total_minutes: u32,
    /// How `total_minutes` was obtained.
    pub duration_source: DurationSource,
    /// Title from oEmbed, when the scrape failed and the lookup worked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_title: Option<String>,
    /// Chapters to store on the course.
    pub chapters: Vec<Chapter>,
}

/// Outcome of planning a batch of courses.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackfillReport {
    /// One plan per course with a video link.
    pub plans: Vec<CoursePlan>,
    /// Titles of courses without any video link.
    pub skipped: Vec<String>,
    /// Plans sized from the watch page.
    pub scraped: usize,
    /// Plans sized by the title heuristic.
    pub fallbacks: usize,
}

/// Build `count` chapters sharing one video and duration.
pub fn plan_chapters(
    course_title: &str,
    video_url: &str,
    total_minutes: u32,
    count: u32,
) -> Vec<Chapter> {
    let duration = format_duration(total_minutes);
    (1..=count)
        .map(|i| Chapter {
            id: Some(ChapterId::from_ordinal(i)),
            title: format!("Chapitre {i}"),
            duration: Some(duration.clone()),
            video_url: Some(video_url.to_string()),
            youtube_url: Some(video_url.to_string()),
            youtube_url_alt: None,
            transcription: Some(format!(
                "Contenu du chapitre {i} du cours {course_title}."
            )),
        })
        .collect()
}

/// Sizes course videos and generates their chapters.
#[derive(Debug)]
pub struct BackfillPlanner {
    probe: Arc<dyn VideoProbe>,
    config: BackfillConfig,
}

impl BackfillPlanner {
    /// Planner using `probe` for remote lookups.
    pub fn new(probe: Arc<dyn VideoProbe>, config: BackfillConfig) -> Self {
        Self { probe, config }
    }

    /// Size a course's video and generate its chapters. `None` when the
    /// course has no video link.
    pub async fn plan_course<R: Rng>(
        &self,
        course: &Course,
        rng: &mut R,
    ) -> Option<CoursePlan> {
        let video_url = course.primary_video_url()?.to_string();

        let (total_minutes, duration_source, video_title) =
            match extract_video_id(&video_url) {
                Some(video_id) => {
                    match self.probe.scrape_duration_minutes(&video_id).await {
                        Some(minutes) if minutes > 0 => {
                            (minutes, DurationSource::Scraped, None)
                        }
                        _ => {
                            let title = self
                                .probe
                                .fetch_oembed(&video_url)
                                .await
                                .and_then(|info| info.title);
                            (
                                estimate_minutes_from_title(&course.title),
                                DurationSource::TitleHeuristic,
                                title,
                            )
                        }
                    }
                }
                None => (DEFAULT_MINUTES, DurationSource::InvalidUrl, None),
            };

        let min = self.config.min_chapters;
        let max = self.config.max_chapters.max(min);
        let count = rng.random_range(min..=max);

        debug!(
            course = %course.title,
            minutes = total_minutes,
            source = ?duration_source,
            chapters = count,
            "planned course chapters"
        );

        Some(CoursePlan {
            course_id: course.id.clone(),
            course_title: course.title.clone(),
            chapters: plan_chapters(&course.title, &video_url, total_minutes, count),
            video_url,
            total_minutes,
            duration_source,
            video_title,
        })
    }

    /// Plan every course, pausing `backfill.delay` after each planned one.
    pub async fn plan_all<R: Rng>(
        &self,
        courses: &[Course],
        rng: &mut R,
    ) -> BackfillReport {
        let mut report = BackfillReport::default();

        for course in courses {
            let Some(plan) = self.plan_course(course, rng).await else {
                info!(course = %course.title, "skipping course without video");
                report.skipped.push(course.title.clone());
                continue;
            };

            match plan.duration_source {
                DurationSource::Scraped => report.scraped += 1,
                DurationSource::TitleHeuristic => report.fallbacks += 1,
                DurationSource::InvalidUrl => {
                    warn!(course = %course.title, "unrecognised video URL; using default length");
                    report.fallbacks += 1;
                }
            }
            report.plans.push(plan);

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        info!(
            planned = report.plans.len(),
            skipped = report.skipped.len(),
            scraped = report.scraped,
            fallbacks = report.fallbacks,
            "backfill plan ready"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config() -> BackfillConfig {
        BackfillConfig {
            delay: Duration::from_millis(500),
            min_chapters: 3,
            max_chapters: 6,
        }
    }

    fn course(title: &str, url: Option<&str>) -> Course {
        Course {
            id: Some(format!("id-{title}")),
            title: title.into(),
            youtube_url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn video_ids_match_both_patterns() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=abc-123&t=5").as_deref(),
            Some("abc-123")
        );
        assert_eq!(
            extract_video_id("https://youtu.be/xyz#t=1").as_deref(),
            Some("xyz")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/emb?rel=0").as_deref(),
            Some("emb")
        );
        assert_eq!(extract_video_id("https://cdn.example.com/a.mp4"), None);
    }

    #[test]
    fn durations_are_scraped_in_pattern_order() {
        assert_eq!(
            parse_duration_minutes(r#"{"lengthSeconds":"3601","x":1}"#),
            Some(61)
        );
        assert_eq!(
            parse_duration_minutes(r#"var a = "{\"lengthSeconds\":\"120\"}";"#),
            Some(2)
        );
        assert_eq!(
            parse_duration_minutes(r#"{"approxDurationMs":"90"}"#),
            Some(2)
        );
        assert_eq!(parse_duration_minutes("<html></html>"), None);
    }

    #[test]
    fn title_heuristics() {
        assert_eq!(estimate_minutes_from_title("Introduction à Rust"), 30);
        assert_eq!(estimate_minutes_from_title("Bien DÉMARRER"), 30);
        assert_eq!(estimate_minutes_from_title("Rust avancé"), 120);
        assert_eq!(estimate_minutes_from_title("Cours complet"), 120);
        assert_eq!(estimate_minutes_from_title("Ownership"), 60);
    }

    #[test]
    fn durations_are_formatted() {
        assert_eq!(format_duration(45), "45min");
        assert_eq!(format_duration(120), "2h");
        assert_eq!(format_duration(80), "1h 20min");
        assert_eq!(format_duration(0), "0min");
    }

    #[test]
    fn planned_chapters_share_the_video() {
        let chapters = plan_chapters("Rust", "https://youtu.be/x", 80, 3);
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[2].id, Some(ChapterId::from_ordinal(3)));
        assert_eq!(chapters[2].title, "Chapitre 3");
        assert_eq!(chapters[0].duration.as_deref(), Some("1h 20min"));
        assert_eq!(chapters[1].video_url.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(
            chapters[1].transcription.as_deref(),
            Some("Contenu du chapitre 2 du cours Rust.")
        );
    }

    #[tokio::test]
    async fn scraped_length_wins() {
        let mut probe = MockVideoProbe::new();
        probe
            .expect_scrape_duration_minutes()
            .withf(|id| id == "abc")
            .returning(|_| Some(95));
        probe.expect_fetch_oembed().never();

        let planner = BackfillPlanner::new(Arc::new(probe), config());
        let mut rng = StdRng::seed_from_u64(7);
        let plan = planner
            .plan_course(&course("Rust", Some("https://youtu.be/abc")), &mut rng)
            .await
            .unwrap();

        assert_eq!(plan.total_minutes, 95);
        assert_eq!(plan.duration_source, DurationSource::Scraped);
        assert!((3..=6).contains(&plan.chapters.len()));
    }

    #[tokio::test]
    async fn heuristic_used_when_scrape_fails() {
        let mut probe = MockVideoProbe::new();
        probe.expect_scrape_duration_minutes().returning(|_| None);
        probe.expect_fetch_oembed().returning(|_| {
            Some(OEmbedInfo {
                title: Some("Rust for beginners".into()),
                author_name: None,
            })
        });

        let planner = BackfillPlanner::new(Arc::new(probe), config());
        let mut rng = StdRng::seed_from_u64(7);
        let plan = planner
            .plan_course(
                &course("Introduction à Rust", Some("https://www.youtube.com/watch?v=abc")),
                &mut rng,
            )
            .await
            .unwrap();

        assert_eq!(plan.total_minutes, 30);
        assert_eq!(plan.duration_source, DurationSource::TitleHeuristic);
        assert_eq!(plan.video_title.as_deref(), Some("Rust for beginners"));
    }

    #[tokio::test(start_paused = true)]
    async fn batch_skips_courses_without_video() {
        let mut probe = MockVideoProbe::new();
        probe.expect_scrape_duration_minutes().returning(|_| Some(10));

        let planner = BackfillPlanner::new(Arc::new(probe), config());
        let mut rng = StdRng::seed_from_u64(1);
        let courses = [
            course("Sans vidéo", None),
            course("Rust", Some("https://youtu.be/abc")),
            course("Direct", Some("https://cdn.example.com/video.mp4")),
        ];

        let started = tokio::time::Instant::now();
        let report = planner.plan_all(&courses, &mut rng).await;

        assert_eq!(report.skipped, vec!["Sans vidéo".to_string()]);
        assert_eq!(report.plans.len(), 2);
        assert_eq!(report.scraped, 1);
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.plans[1].duration_source, DurationSource::InvalidUrl);
        assert_eq!(report.plans[1].total_minutes, 60);
        assert!(started.elapsed() >= Duration::from_millis(1_000));
    }
}
