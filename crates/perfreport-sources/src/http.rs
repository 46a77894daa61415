//! REST API source.
//!
//! Reads records from an HTTP service that exposes the school's data as
//! JSON. Missing entities (HTTP 404) read as absent; any other failure is a
//! [`SourceError`] and counts as a failed read.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use perfreport_core::model::{
    AssignmentRecord, ClassRecord, GoalRecord, StudentRecord, SubmissionRecord, UserRecord,
};
use perfreport_core::traits::{
    AccessPolicy, AssignmentQuery, CourseworkStore, GoalStore, StudentDirectory,
};

use crate::error::SourceError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP-backed implementation of every collaborator trait.
pub struct HttpStore {
    base_url: String,
    api_token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct AccessResponse {
    allowed: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl HttpStore {
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.filter(|t| !t.is_empty()),
            timeout_secs: timeout.as_secs(),
            client,
        }
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|e| SourceError::InvalidUrl(format!("{}{path}: {e}", self.base_url)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// GET a JSON resource. `Ok(None)` when the service answers 404.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, SourceError> {
        let url = self.url(path, query)?;
        let mut request = self.client.get(url).header("accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout(self.timeout_secs)
            } else {
                SourceError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::AuthenticationFailed(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(SourceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| SourceError::ApiError {
                status: status.as_u16(),
                message: format!("failed to parse response: {e}"),
            })
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        Ok(self.get(path, query).await?.unwrap_or_default())
    }
}

#[async_trait]
impl StudentDirectory for HttpStore {
    #[instrument(skip(self))]
    async fn student(&self, id: &str) -> anyhow::Result<Option<StudentRecord>> {
        Ok(self.get(&format!("/students/{id}"), &[]).await?)
    }

    #[instrument(skip(self))]
    async fn user(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        Ok(self.get(&format!("/users/{id}"), &[]).await?)
    }

    #[instrument(skip(self))]
    async fn classes(&self, ids: &[String]) -> anyhow::Result<Vec<ClassRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.get_list("/classes", &[("ids", ids.join(","))]).await?)
    }
}

#[async_trait]
impl CourseworkStore for HttpStore {
    #[instrument(skip(self, query), fields(student = %query.student_id))]
    async fn assignments(&self, query: &AssignmentQuery) -> anyhow::Result<Vec<AssignmentRecord>> {
        let params = [
            ("classIds", query.class_ids.join(",")),
            ("from", query.period.start.format("%Y-%m-%d").to_string()),
            ("to", query.period.end.format("%Y-%m-%d").to_string()),
        ];
        Ok(self
            .get_list(&format!("/students/{}/assignments", query.student_id), &params)
            .await?)
    }

    #[instrument(skip(self, assignment_ids), fields(count = assignment_ids.len()))]
    async fn submissions(
        &self,
        student_id: &str,
        assignment_ids: &[String],
    ) -> anyhow::Result<Vec<SubmissionRecord>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .get_list(
                &format!("/students/{student_id}/submissions"),
                &[("assignmentIds", assignment_ids.join(","))],
            )
            .await?)
    }
}

#[async_trait]
impl GoalStore for HttpStore {
    #[instrument(skip(self))]
    async fn goals(&self, student_id: &str) -> anyhow::Result<Vec<GoalRecord>> {
        Ok(self
            .get_list(&format!("/students/{student_id}/goals"), &[])
            .await?)
    }
}

/// Delegates the relationship check to the service. 404 means no
/// relationship.
#[async_trait]
impl AccessPolicy for HttpStore {
    #[instrument(skip(self, viewer, student), fields(viewer = %viewer.id, student = %student.id))]
    async fn can_view(&self, viewer: &UserRecord, student: &StudentRecord) -> anyhow::Result<bool> {
        let response: Option<AccessResponse> = self
            .get(&format!("/students/{}/viewers/{}", student.id, viewer.id), &[])
            .await?;
        Ok(response.is_some_and(|r| r.allowed))
    }
}
