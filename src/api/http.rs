use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::{ApiConfig, BatchApi, CalendarApi, CourseApi, EnrollmentApi, UserApi};
use crate::error::PortalError;
use crate::models::{
    Batch, Course, CourseCalendar, CreateUserRequest, EnrollmentDto, Feedback, FeedbackRequest,
    ManagerDto, NewBatchRequest, NewCalendarRequest, NewCourseRequest, User,
};

/// One HTTP client for every backend resource. Non-2xx responses are
/// collapsed into `PortalError::Request` carrying status and body text;
/// nothing downstream branches on the status code itself.
pub struct HttpApi {
    client: Client,
    config: ApiConfig,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Result<Self, PortalError> {
        let client = Client::builder()
            .build()
            .map_err(|e| PortalError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn check(path: &str, response: Response) -> Result<Response, PortalError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortalError::Request(format!(
                "API error {} on {}: {}",
                status, path, body
            )));
        }
        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, PortalError> {
        let body = Self::check(path, response).await?.text().await.unwrap_or_default();
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("failed to parse response from {}: {}", path, e);
            PortalError::Request(format!("Failed to parse response from {}: {}", path, e))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalError> {
        let response = self
            .with_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("GET {} failed: {}", path, e)))?;
        Self::parse(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, PortalError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .with_auth(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("POST {} failed: {}", path, e)))?;
        Self::parse(path, response).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, PortalError> {
        let response = self
            .with_auth(self.client.post(self.url(path)))
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("POST {} failed: {}", path, e)))?;
        Self::parse(path, response).await
    }

    async fn post_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), PortalError> {
        let response = self
            .with_auth(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("POST {} failed: {}", path, e)))?;
        Self::check(path, response).await?;
        Ok(())
    }

    async fn put_unit<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), PortalError> {
        let response = self
            .with_auth(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("PUT {} failed: {}", path, e)))?;
        Self::check(path, response).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), PortalError> {
        let response = self
            .with_auth(self.client.delete(self.url(path)))
            .send()
            .await
            .map_err(|e| PortalError::Request(format!("DELETE {} failed: {}", path, e)))?;
        Self::check(path, response).await?;
        Ok(())
    }
}

#[async_trait]
impl CourseApi for HttpApi {
    async fn list(&self) -> Result<Vec<Course>, PortalError> {
        self.get_json("courses").await
    }

    async fn create(&self, request: NewCourseRequest) -> Result<Course, PortalError> {
        self.post_json("courses", &request).await
    }
}

#[async_trait]
impl CalendarApi for HttpApi {
    async fn create(&self, request: NewCalendarRequest) -> Result<CourseCalendar, PortalError> {
        self.post_json("calendars", &request).await
    }
}

#[async_trait]
impl BatchApi for HttpApi {
    async fn list(&self) -> Result<Vec<Batch>, PortalError> {
        self.get_json("batches").await
    }

    async fn create(&self, request: NewBatchRequest) -> Result<Batch, PortalError> {
        self.post_json("batches", &request).await
    }

    async fn update(&self, batch_id: i64, batch: &Batch) -> Result<(), PortalError> {
        self.put_unit(&format!("batches/{}", batch_id), batch).await
    }

    async fn delete(&self, batch_id: i64) -> Result<(), PortalError> {
        self.delete_unit(&format!("batches/{}", batch_id)).await
    }
}

#[async_trait]
impl UserApi for HttpApi {
    async fn list_managers(&self) -> Result<Vec<ManagerDto>, PortalError> {
        self.get_json("users/managers").await
    }

    async fn create_user(&self, request: CreateUserRequest) -> Result<User, PortalError> {
        self.post_json("users/create", &request).await
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), PortalError> {
        self.delete_unit(&format!("users/{}", user_id)).await
    }
}

#[async_trait]
impl EnrollmentApi for HttpApi {
    async fn list_mine(&self) -> Result<Vec<EnrollmentDto>, PortalError> {
        self.get_json("enrollments/mine").await
    }

    async fn request_enrollment(&self, batch_id: i64) -> Result<EnrollmentDto, PortalError> {
        self.post_empty(&format!("enrollments/request/{}", batch_id)).await
    }

    async fn submit_feedback(
        &self,
        batch_id: i64,
        request: FeedbackRequest,
    ) -> Result<(), PortalError> {
        self.post_unit(&format!("feedback/{}", batch_id), &request).await
    }

    async fn list_feedback_for_batch(&self, batch_id: i64) -> Result<Vec<Feedback>, PortalError> {
        self.get_json(&format!("feedback/batch/{}", batch_id)).await
    }
}
