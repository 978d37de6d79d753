use super::routes::{self, utils::expand};
use super::{ActivitySink, CourseApi};
use crate::error::{ApiError, ApiResult};

use async_trait::async_trait;
use lectio_config::ApiConfig;
use lectio_model::prelude::*;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// reqwest-backed implementation of [`CourseApi`] and [`ActivitySink`].
#[derive(Debug, Clone)]
pub struct HttpCourseApi {
    client: Client,
    base_url: Url,
}

impl HttpCourseApi {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:5000/api`).
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;

        debug!(base_url = %base_url, "creating course API client");
        Ok(Self { client, base_url })
    }

    /// Create a client from the `api` config section.
    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(&config.base_url, config.timeout)
    }

    /// Normalized API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a route template.
    pub fn endpoint(&self, route: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(expand(route, params));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let response = self.client.get(url.clone()).send().await?;
        read_json(&url, response).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client.post(url.clone()).json(body).send().await?;
        read_json(&url, response).await
    }
}

/// Many users will provide "localhost:5000/api", which reqwest rejects.
fn normalize_base_url(raw: &str) -> ApiResult<Url> {
    let url = lectio_config::normalize_base_url(raw).map_err(|source| {
        ApiError::InvalidBaseUrl {
            value: raw.to_string(),
            source,
        }
    })?;
    if url.as_str() != raw {
        debug!(from = raw, to = %url, "normalized API base URL");
    }
    Ok(url)
}

async fn ensure_success(url: &Url, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    warn!(path = url.path(), status = status.as_u16(), "course API request failed");
    Err(ApiError::Status {
        path: url.path().to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(
    url: &Url,
    response: Response,
) -> ApiResult<T> {
    let response = ensure_success(url, response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// The enrollment endpoint answers with a bare array; older deployments
/// wrapped it in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum EnrollmentsBody {
    List(Vec<EnrolledCourse>),
    Wrapped {
        #[serde(rename = "enrolledCourses")]
        enrolled_courses: Vec<EnrolledCourse>,
    },
}

impl From<EnrollmentsBody> for Vec<EnrolledCourse> {
    fn from(body: EnrollmentsBody) -> Self {
        match body {
            EnrollmentsBody::List(list) => list,
            EnrollmentsBody::Wrapped { enrolled_courses } => enrolled_courses,
        }
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn fetch_course(&self, course_id: &CourseId) -> ApiResult<Course> {
        let url = self.endpoint(
            routes::courses::ITEM,
            &[("{course_id}", course_id.as_str())],
        );
        self.get_json(url).await
    }

    async fn fetch_enrollments(
        &self,
        user_id: &UserId,
    ) -> ApiResult<Vec<EnrolledCourse>> {
        let url = self.endpoint(
            routes::userdata::ENROLLED_COURSES,
            &[("{user_id}", user_id.as_str())],
        );
        let body: EnrollmentsBody = self.get_json(url).await?;
        Ok(body.into())
    }

    async fn update_progress(
        &self,
        request: UpdateProgressRequest,
    ) -> ApiResult<UpdateProgressResponse> {
        let url = self.endpoint(routes::userdata::UPDATE_PROGRESS, &[]);
        self.post_json(url, &request).await
    }

    async fn fetch_comments(
        &self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
    ) -> ApiResult<Vec<ChapterComment>> {
        let url = self.endpoint(
            routes::courses::CHAPTER_COMMENTS,
            &[
                ("{course_id}", course_id.as_str()),
                ("{chapter_id}", chapter_id.as_str()),
            ],
        );
        let body: CommentsResponse = self.get_json(url).await?;
        Ok(body.comments)
    }

    async fn post_comment(
        &self,
        course_id: &CourseId,
        chapter_id: &ChapterId,
        comment: NewCommentRequest,
    ) -> ApiResult<Vec<ChapterComment>> {
        let url = self.endpoint(
            routes::courses::CHAPTER_COMMENTS,
            &[
                ("{course_id}", course_id.as_str()),
                ("{chapter_id}", chapter_id.as_str()),
            ],
        );
        let body: CommentsResponse = self.post_json(url, &comment).await?;
        Ok(body.comments)
    }
}

#[async_trait]
impl ActivitySink for HttpCourseApi {
    async fn track_activity(
        &self,
        request: TrackActivityRequest,
    ) -> ApiResult<()> {
        let url = self.endpoint(routes::userdata::TRACK_ACTIVITY, &[]);
        let response = self.client.post(url.clone()).json(&request).send().await?;
        ensure_success(&url, response).await.map(|_| ())
    }
}
