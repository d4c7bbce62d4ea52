pub mod http;

use std::env;

use async_trait::async_trait;

use crate::error::PortalError;
use crate::models::{
    Batch, Course, CourseCalendar, CreateUserRequest, EnrollmentDto, Feedback, FeedbackRequest,
    ManagerDto, NewBatchRequest, NewCalendarRequest, NewCourseRequest, User,
};

pub use http::HttpApi;

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_token: Option<String>,
}

impl ApiConfig {
    pub fn new_from_env() -> Result<Self, PortalError> {
        let base_url = env::var("TMS_API_URL")
            .map_err(|_| PortalError::Config("TMS_API_URL is not set".to_string()))?;
        let api_token = env::var("TMS_API_TOKEN").ok();

        Ok(Self {
            base_url,
            api_token,
        })
    }
}

#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Course>, PortalError>;
    async fn create(&self, request: NewCourseRequest) -> Result<Course, PortalError>;
}

#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn create(&self, request: NewCalendarRequest) -> Result<CourseCalendar, PortalError>;
}

#[async_trait]
pub trait BatchApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Batch>, PortalError>;
    async fn create(&self, request: NewBatchRequest) -> Result<Batch, PortalError>;
    async fn update(&self, batch_id: i64, batch: &Batch) -> Result<(), PortalError>;
    async fn delete(&self, batch_id: i64) -> Result<(), PortalError>;
}

#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_managers(&self) -> Result<Vec<ManagerDto>, PortalError>;
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, PortalError>;
    async fn delete_user(&self, user_id: i64) -> Result<(), PortalError>;
}

#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    async fn list_mine(&self) -> Result<Vec<EnrollmentDto>, PortalError>;
    async fn request_enrollment(&self, batch_id: i64) -> Result<EnrollmentDto, PortalError>;
    async fn submit_feedback(
        &self,
        batch_id: i64,
        request: FeedbackRequest,
    ) -> Result<(), PortalError>;
    async fn list_feedback_for_batch(&self, batch_id: i64) -> Result<Vec<Feedback>, PortalError>;
}
