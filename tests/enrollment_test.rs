use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tms_portal::api::{BatchApi, EnrollmentApi};
use tms_portal::error::PortalError;
use tms_portal::models::{
    Batch, EnrollmentDto, EnrollmentStatus, Feedback, FeedbackRequest, NewBatchRequest,
};
use tms_portal::services::EnrollmentReconciler;

#[derive(Default)]
struct StubBatchApi {
    batches: Mutex<Vec<Batch>>,
    fail_list: AtomicBool,
}

#[async_trait]
impl BatchApi for StubBatchApi {
    async fn list(&self) -> Result<Vec<Batch>, PortalError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(PortalError::Request("API error 500: down".to_string()));
        }
        Ok(self.batches.lock().unwrap().clone())
    }

    async fn create(&self, _request: NewBatchRequest) -> Result<Batch, PortalError> {
        Err(PortalError::Request("unexpected call: create".to_string()))
    }

    async fn update(&self, _batch_id: i64, _batch: &Batch) -> Result<(), PortalError> {
        Err(PortalError::Request("unexpected call: update".to_string()))
    }

    async fn delete(&self, _batch_id: i64) -> Result<(), PortalError> {
        Err(PortalError::Request("unexpected call: delete".to_string()))
    }
}

#[derive(Default)]
struct StubEnrollmentApi {
    mine: Mutex<Vec<EnrollmentDto>>,
    list_mine_calls: AtomicUsize,
    request_status: Mutex<String>,
    fail_mine: AtomicBool,
    feedback: Mutex<Vec<(i64, FeedbackRequest)>>,
}

#[async_trait]
impl EnrollmentApi for StubEnrollmentApi {
    async fn list_mine(&self) -> Result<Vec<EnrollmentDto>, PortalError> {
        self.list_mine_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mine.load(Ordering::SeqCst) {
            return Err(PortalError::Request("API error 404: no mine endpoint".to_string()));
        }
        Ok(self.mine.lock().unwrap().clone())
    }

    async fn request_enrollment(&self, batch_id: i64) -> Result<EnrollmentDto, PortalError> {
        Ok(EnrollmentDto {
            enrollment_id: batch_id,
            employee_name: "eve".to_string(),
            course_name: "Rust Fundamentals".to_string(),
            batch_name: String::new(),
            status: self.request_status.lock().unwrap().clone(),
            approved_by: None,
        })
    }

    async fn submit_feedback(
        &self,
        batch_id: i64,
        request: FeedbackRequest,
    ) -> Result<(), PortalError> {
        self.feedback.lock().unwrap().push((batch_id, request));
        Ok(())
    }

    async fn list_feedback_for_batch(&self, _batch_id: i64) -> Result<Vec<Feedback>, PortalError> {
        Ok(Vec::new())
    }
}

fn batch(batch_id: i64, batch_name: &str) -> Batch {
    Batch {
        batch_id,
        calendar_id: 1,
        batch_name: batch_name.to_string(),
        created_on: None,
        is_active: Some(true),
        modified_by: None,
        calendar: None,
    }
}

fn enrollment(batch_name: &str, status: &str) -> EnrollmentDto {
    EnrollmentDto {
        enrollment_id: 1,
        employee_name: "eve".to_string(),
        course_name: "Rust Fundamentals".to_string(),
        batch_name: batch_name.to_string(),
        status: status.to_string(),
        approved_by: None,
    }
}

fn dashboard(
    batches: Arc<StubBatchApi>,
    enrollments: Arc<StubEnrollmentApi>,
) -> EnrollmentReconciler {
    EnrollmentReconciler::new(batches, enrollments)
}

#[tokio::test]
async fn empty_mine_list_emits_an_advisory_and_defaults_to_not_enrolled() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let mut view = dashboard(batches, Arc::new(StubEnrollmentApi::default()));

    view.load_dashboard().await.unwrap();

    assert!(view.advisory().is_some());
    assert_eq!(view.status_for(1), EnrollmentStatus::NotEnrolled);
    assert_eq!(view.batches().len(), 1);
}

#[tokio::test]
async fn matching_enrollment_sets_the_batch_status() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let enrollments = Arc::new(StubEnrollmentApi::default());
    enrollments.mine.lock().unwrap().push(enrollment("Java-Jan", "Approved"));
    let mut view = dashboard(batches, enrollments);

    view.load_dashboard().await.unwrap();

    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);
    assert!(view.advisory().is_none());
}

#[tokio::test]
async fn enrollment_for_an_unknown_batch_is_ignored() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let enrollments = Arc::new(StubEnrollmentApi::default());
    enrollments.mine.lock().unwrap().push(enrollment("Cobol-Dec", "Approved"));
    let mut view = dashboard(batches, enrollments);

    view.load_dashboard().await.unwrap();

    assert_eq!(view.status_for(1), EnrollmentStatus::NotEnrolled);
}

#[tokio::test]
async fn reconciliation_is_idempotent() {
    let mut view = dashboard(
        Arc::new(StubBatchApi::default()),
        Arc::new(StubEnrollmentApi::default()),
    );
    let batches = vec![batch(1, "Java-Jan"), batch(2, "Rust-Feb")];
    let mine = vec![enrollment("Java-Jan", "Requested")];

    view.reconcile(batches.clone(), mine.clone());
    let first = view.statuses().clone();
    view.reconcile(batches, mine);

    assert_eq!(view.statuses(), &first);
}

#[tokio::test]
async fn ambiguous_batch_names_attach_to_the_first_match() {
    let mut view = dashboard(
        Arc::new(StubBatchApi::default()),
        Arc::new(StubEnrollmentApi::default()),
    );

    view.reconcile(
        vec![batch(1, "Java-Jan"), batch(2, "Java-Jan")],
        vec![enrollment("Java-Jan", "Approved")],
    );

    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);
    assert_eq!(view.status_for(2), EnrollmentStatus::NotEnrolled);
}

#[tokio::test]
async fn request_enrollment_applies_the_status_optimistically() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let enrollments = Arc::new(StubEnrollmentApi::default());
    *enrollments.request_status.lock().unwrap() = "Requested".to_string();
    let mut view = dashboard(batches, enrollments.clone());

    let status = view.request_enrollment(1).await.unwrap();

    assert_eq!(status, EnrollmentStatus::Requested);
    // applied before any "mine" refresh resolves
    assert_eq!(enrollments.list_mine_calls.load(Ordering::SeqCst), 0);
    assert_eq!(view.status_for(1), EnrollmentStatus::Requested);
}

#[tokio::test]
async fn the_next_reconciliation_wins_over_optimistic_state() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let enrollments = Arc::new(StubEnrollmentApi::default());
    *enrollments.request_status.lock().unwrap() = "Requested".to_string();
    let mut view = dashboard(batches, enrollments.clone());

    view.request_enrollment(1).await.unwrap();
    assert_eq!(view.status_for(1), EnrollmentStatus::Requested);

    // a confirmed refresh with no enrollment rows resets the batch
    view.load_dashboard().await.unwrap();
    assert_eq!(view.status_for(1), EnrollmentStatus::NotEnrolled);

    // and a later refresh that does carry the row takes over again
    enrollments.mine.lock().unwrap().push(enrollment("Java-Jan", "Approved"));
    view.load_dashboard().await.unwrap();
    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);
}

#[tokio::test]
async fn a_failed_fetch_mutates_nothing() {
    let batches = Arc::new(StubBatchApi::default());
    batches.batches.lock().unwrap().push(batch(1, "Java-Jan"));
    let enrollments = Arc::new(StubEnrollmentApi::default());
    enrollments.mine.lock().unwrap().push(enrollment("Java-Jan", "Approved"));
    let mut view = dashboard(batches.clone(), enrollments.clone());

    view.load_dashboard().await.unwrap();
    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);

    enrollments.fail_mine.store(true, Ordering::SeqCst);
    let err = view.load_dashboard().await.unwrap_err();

    assert!(matches!(err, PortalError::Request(_)));
    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);
    assert_eq!(view.batches().len(), 1);

    enrollments.fail_mine.store(false, Ordering::SeqCst);
    batches.fail_list.store(true, Ordering::SeqCst);
    view.load_dashboard().await.unwrap_err();

    assert_eq!(view.status_for(1), EnrollmentStatus::Approved);
    assert_eq!(view.batches().len(), 1);
}

#[tokio::test]
async fn feedback_is_forwarded_to_the_backend() {
    let enrollments = Arc::new(StubEnrollmentApi::default());
    let view = dashboard(Arc::new(StubBatchApi::default()), enrollments.clone());

    view.submit_feedback(
        3,
        FeedbackRequest {
            feedback_text: Some("solid batch".to_string()),
            rating: 5,
        },
    )
    .await
    .unwrap();

    let feedback = enrollments.feedback.lock().unwrap();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].0, 3);
    assert_eq!(feedback[0].1.rating, 5);
}
