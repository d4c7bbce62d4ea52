use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enrollment as observed by an employee. The "mine" endpoint denormalizes
/// names and carries no batch id, so `batch_name` is the only correlation
/// key available to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentDto {
    pub enrollment_id: i64,
    pub employee_name: String,
    pub course_name: String,
    pub batch_name: String,
    pub status: String,
    #[serde(default)]
    pub approved_by: Option<String>,
}

/// Per-batch enrollment state as displayed. `NotEnrolled` is a client-only
/// default and never comes off the wire; the server is free to introduce
/// statuses we have no variant for, which land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentStatus {
    NotEnrolled,
    Requested,
    Approved,
    Rejected,
    Other(String),
}

impl EnrollmentStatus {
    pub fn from_wire(status: &str) -> Self {
        match status {
            "Requested" => EnrollmentStatus::Requested,
            "Approved" => EnrollmentStatus::Approved,
            "Rejected" => EnrollmentStatus::Rejected,
            other => EnrollmentStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::NotEnrolled => write!(f, "Not Enrolled"),
            EnrollmentStatus::Requested => write!(f, "Requested"),
            EnrollmentStatus::Approved => write!(f, "Approved"),
            EnrollmentStatus::Rejected => write!(f, "Rejected"),
            EnrollmentStatus::Other(status) => write!(f, "{}", status),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_text: Option<String>,
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub feedback_id: i64,
    pub batch_id: i64,
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub feedback_text: Option<String>,
    pub rating: i32,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}
