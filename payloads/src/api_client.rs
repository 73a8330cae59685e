use std::rc::Rc;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::{CourseId, WorkoutId, requests, responses};

type ReqwestResult = Result<reqwest::Response, reqwest::Error>;

/// Read-only view of the externally-owned bearer token. The client reads
/// the token on every request; it never writes or discards one.
pub trait TokenStore {
    fn token(&self) -> Option<String>;
}

/// An API client for interfacing with the backend.
pub struct APIClient {
    pub address: String,
    pub inner_client: reqwest::Client,
    token_store: Rc<dyn TokenStore>,
}

/// Helper methods for http actions
impl APIClient {
    pub fn new(address: String, token_store: Rc<dyn TokenStore>) -> Self {
        Self {
            address,
            inner_client: reqwest::Client::new(),
            token_store,
        }
    }

    fn format_url(&self, path: &str) -> String {
        format!("{}/api/fitness{path}", &self.address)
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        match self.token_store.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> ReqwestResult {
        let request = self.authorize(self.inner_client.get(self.format_url(path)));
        request.send().await
    }

    // The backend only accepts JSON write bodies declared as text/plain.
    fn encode_body(body: &impl Serialize) -> Result<String, ClientError> {
        serde_json::to_string(body).map_err(ClientError::Encode)
    }

    async fn post(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, ClientError> {
        let request = self
            .authorize(self.inner_client.post(self.format_url(path)))
            .header(CONTENT_TYPE, "text/plain")
            .body(Self::encode_body(body)?);
        Ok(request.send().await?)
    }

    async fn patch(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<reqwest::Response, ClientError> {
        let request = self
            .authorize(self.inner_client.patch(self.format_url(path)))
            .header(CONTENT_TYPE, "text/plain")
            .body(Self::encode_body(body)?);
        Ok(request.send().await?)
    }

    async fn delete(&self, path: &str) -> ReqwestResult {
        let request =
            self.authorize(self.inner_client.delete(self.format_url(path)));
        request.send().await
    }
}

/// Methods on the backend API
impl APIClient {
    /// Exchange credentials for a bearer token. The caller hands the token
    /// to the token store's owner.
    pub async fn login(
        &self,
        details: &requests::Credentials,
    ) -> Result<responses::LoginToken, ClientError> {
        let response = self.post("/login", details).await?;
        ok_body(response).await
    }

    pub async fn create_account(
        &self,
        details: &requests::Credentials,
    ) -> Result<(), ClientError> {
        let response = self.post("/register", details).await?;
        ok_empty(response).await
    }

    /// Get the current user's profile, unwrapping the envelope some
    /// endpoint versions add.
    pub async fn user_profile(
        &self,
    ) -> Result<responses::UserProfile, ClientError> {
        let response = self.get("/users/me").await?;
        let envelope: responses::UserEnvelope = ok_body(response).await?;
        Ok(envelope.into_profile())
    }

    /// List the full course catalog.
    pub async fn get_courses(
        &self,
    ) -> Result<Vec<responses::Course>, ClientError> {
        let response = self.get("/courses").await?;
        ok_body(response).await
    }

    pub async fn get_course(
        &self,
        course_id: &CourseId,
    ) -> Result<responses::Course, ClientError> {
        let response = self.get(&format!("/courses/{course_id}")).await?;
        ok_body(response).await
    }

    pub async fn get_course_workouts(
        &self,
        course_id: &CourseId,
    ) -> Result<Vec<responses::Workout>, ClientError> {
        let response =
            self.get(&format!("/courses/{course_id}/workouts")).await?;
        ok_body(response).await
    }

    pub async fn get_workout(
        &self,
        workout_id: &WorkoutId,
    ) -> Result<responses::Workout, ClientError> {
        let response = self.get(&format!("/workouts/{workout_id}")).await?;
        ok_body(response).await
    }

    /// Progress for one course; `None` when no record exists yet.
    pub async fn get_course_progress(
        &self,
        course_id: &CourseId,
    ) -> Result<Option<responses::CourseProgress>, ClientError> {
        let response = self
            .get(&format!("/users/me/progress?courseId={course_id}"))
            .await?;
        ok_body(response).await
    }

    /// Progress for one workout within a course; `None` when no record
    /// exists yet.
    pub async fn get_workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
    ) -> Result<Option<responses::WorkoutProgress>, ClientError> {
        let response = self
            .get(&format!(
                "/users/me/progress?courseId={course_id}&workoutId={workout_id}"
            ))
            .await?;
        ok_body(response).await
    }

    pub async fn enroll_course(
        &self,
        details: &requests::EnrollCourse,
    ) -> Result<(), ClientError> {
        let response = self.post("/users/me/courses", details).await?;
        ok_empty(response).await
    }

    pub async fn unenroll_course(
        &self,
        course_id: &CourseId,
    ) -> Result<(), ClientError> {
        let response = self
            .delete(&format!("/users/me/courses/{course_id}"))
            .await?;
        ok_empty(response).await
    }

    pub async fn save_workout_progress(
        &self,
        course_id: &CourseId,
        workout_id: &WorkoutId,
        details: &requests::SaveWorkoutProgress,
    ) -> Result<(), ClientError> {
        let response = self
            .patch(
                &format!("/courses/{course_id}/workouts/{workout_id}"),
                details,
            )
            .await?;
        ok_empty(response).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// An unhandled API error to display, containing response text.
    #[error("{1}")]
    APIError(StatusCode, String),
    #[error("Network error. Please check your connection.")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected response shape from the server.")]
    Decode(#[source] serde_json::Error),
    #[error("Failed to encode request body.")]
    Encode(#[source] serde_json::Error),
}

impl ClientError {
    /// Human-readable message for surfacing failures to the user.
    /// Well-known statuses get a fixed message; otherwise the
    /// server-provided one is passed through when present.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::APIError(status, body) => match *status {
                StatusCode::UNAUTHORIZED => {
                    "Session expired. Please sign in again.".to_string()
                }
                StatusCode::FORBIDDEN => "Access denied.".to_string(),
                StatusCode::TOO_MANY_REQUESTS => {
                    "Too many requests. Please try again later.".to_string()
                }
                _ => server_message(body).unwrap_or_else(|| {
                    if body.trim().is_empty() {
                        "Request to the server failed.".to_string()
                    } else {
                        body.clone()
                    }
                }),
            },
            other => other.to_string(),
        }
    }
}

/// Error payloads usually arrive as `{"message": "..."}`.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_owned)
}

/// Deserialize a successful request into the desired type, or return an
/// appropriate error.
pub async fn ok_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ClientError::Decode)
}

/// Check that an empty response is OK, returning a ClientError if not.
pub async fn ok_empty(response: reqwest::Response) -> Result<(), ClientError> {
    if !response.status().is_success() {
        return Err(ClientError::APIError(
            response.status(),
            response.text().await?,
        ));
    }
    Ok(())
}
