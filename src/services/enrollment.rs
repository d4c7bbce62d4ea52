use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::{BatchApi, EnrollmentApi};
use crate::error::PortalError;
use crate::models::{Batch, EnrollmentDto, EnrollmentStatus, Feedback, FeedbackRequest};

/// Outcome of correlating one record against a candidate list by key.
/// The ambiguous case is reported instead of being silently resolved.
#[derive(Debug)]
pub enum KeyMatch<'a, T> {
    None,
    Unique(&'a T),
    Ambiguous(Vec<&'a T>),
}

/// Exact-key join over a slice. Equality is whatever `PartialEq` says for
/// the extracted key; for batch names that means case-sensitive, no
/// trimming.
pub fn match_by_key<'a, T, K, F>(items: &'a [T], key: F, wanted: &K) -> KeyMatch<'a, T>
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    let mut hits = items.iter().filter(|item| key(item) == wanted);
    match (hits.next(), hits.next()) {
        (None, _) => KeyMatch::None,
        (Some(only), None) => KeyMatch::Unique(only),
        (Some(first), Some(second)) => {
            let mut all = vec![first, second];
            all.extend(hits);
            KeyMatch::Ambiguous(all)
        }
    }
}

const EMPTY_MINE_ADVISORY: &str =
    "No enrollments returned; either you have none yet or the backend is missing the my-enrollments endpoint";

/// Derives a per-batch enrollment status by correlating the batch list
/// with the "mine" list. The "mine" records carry no batch id, so the
/// join runs on exact batch-name equality; the derived map is a view,
/// never the source of truth.
pub struct EnrollmentReconciler {
    batches_api: Arc<dyn BatchApi>,
    enrollments: Arc<dyn EnrollmentApi>,
    batches: Vec<Batch>,
    status_by_batch: HashMap<i64, EnrollmentStatus>,
    advisory: Option<String>,
    loading: bool,
}

impl EnrollmentReconciler {
    pub fn new(batches_api: Arc<dyn BatchApi>, enrollments: Arc<dyn EnrollmentApi>) -> Self {
        Self {
            batches_api,
            enrollments,
            batches: Vec::new(),
            status_by_batch: HashMap::new(),
            advisory: None,
            loading: false,
        }
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn statuses(&self) -> &HashMap<i64, EnrollmentStatus> {
        &self.status_by_batch
    }

    pub fn status_for(&self, batch_id: i64) -> EnrollmentStatus {
        self.status_by_batch
            .get(&batch_id)
            .cloned()
            .unwrap_or(EnrollmentStatus::NotEnrolled)
    }

    /// Non-fatal anomaly note, surfaced to the caller without blocking
    /// the rest of the dashboard.
    pub fn advisory(&self) -> Option<&str> {
        self.advisory.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Fetches the batch list and the "mine" list concurrently, then
    /// reconciles once both are known. If either fetch fails nothing is
    /// mutated and the failure is returned for the caller to surface.
    pub async fn load_dashboard(&mut self) -> Result<(), PortalError> {
        self.loading = true;
        let (batches, mine) = tokio::join!(self.batches_api.list(), self.enrollments.list_mine());
        self.loading = false;

        let batches = match batches {
            Ok(batches) => batches,
            Err(err) => {
                error!("failed to load batches: {}", err);
                return Err(err);
            }
        };
        let mine = match mine {
            Ok(mine) => mine,
            Err(err) => {
                error!("failed to load enrollments: {}", err);
                return Err(err);
            }
        };

        self.reconcile(batches, mine);
        Ok(())
    }

    /// The merge itself. Rebuilds the status map from scratch, so running
    /// it twice on the same inputs yields the same map, and a confirmed
    /// refresh always replaces earlier optimistic entries.
    pub fn reconcile(&mut self, batches: Vec<Batch>, mine: Vec<EnrollmentDto>) {
        self.advisory = if mine.is_empty() {
            Some(EMPTY_MINE_ADVISORY.to_string())
        } else {
            None
        };

        let mut statuses = HashMap::new();
        for enrollment in &mine {
            match match_by_key(&batches, |b| b.batch_name.as_str(), enrollment.batch_name.as_str()) {
                KeyMatch::None => {
                    // the name join is best-effort; unmatched rows are skipped
                    debug!(
                        "enrollment {} names unknown batch {:?}",
                        enrollment.enrollment_id, enrollment.batch_name
                    );
                }
                KeyMatch::Unique(batch) => {
                    statuses.insert(batch.batch_id, EnrollmentStatus::from_wire(&enrollment.status));
                }
                KeyMatch::Ambiguous(hits) => {
                    // correctness gap until the backend puts a batch id on
                    // the "mine" DTO; first match wins in iteration order
                    warn!(
                        "{} batches share the name {:?}, enrollment {} attached to batch {}",
                        hits.len(),
                        enrollment.batch_name,
                        enrollment.enrollment_id,
                        hits[0].batch_id
                    );
                    statuses.insert(hits[0].batch_id, EnrollmentStatus::from_wire(&enrollment.status));
                }
            }
        }

        self.batches = batches;
        self.status_by_batch = statuses;
    }

    /// Optimistic update: the response status is applied immediately,
    /// without waiting for a "mine" refresh. There is no rollback path;
    /// the next reconciliation wins.
    pub async fn request_enrollment(&mut self, batch_id: i64) -> Result<EnrollmentStatus, PortalError> {
        match self.enrollments.request_enrollment(batch_id).await {
            Ok(dto) => {
                let status = EnrollmentStatus::from_wire(&dto.status);
                self.status_by_batch.insert(batch_id, status.clone());
                Ok(status)
            }
            Err(err) => {
                warn!("enrollment request for batch {} failed: {}", batch_id, err);
                Err(err)
            }
        }
    }

    pub async fn submit_feedback(
        &self,
        batch_id: i64,
        request: FeedbackRequest,
    ) -> Result<(), PortalError> {
        self.enrollments.submit_feedback(batch_id, request).await
    }

    pub async fn feedback_for_batch(&self, batch_id: i64) -> Result<Vec<Feedback>, PortalError> {
        self.enrollments.list_feedback_for_batch(batch_id).await
    }
}
