use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::api::{BatchApi, CalendarApi, CourseApi};
use crate::error::PortalError;
use crate::models::{Batch, CourseCalendar, NewBatchRequest, NewCalendarRequest, NewCourseRequest};
use crate::store::ResourceGraphStore;

/// Input buffer for the per-course calendar form. Kept across failed
/// submissions so the admin can retry without retyping.
#[derive(Debug, Default)]
pub struct CalendarDraft {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct BatchDraft {
    pub batch_name: String,
}

/// Per-course UI sub-state: the two sub-forms, their visibility and the
/// last result message for each. Lazily created on first use.
#[derive(Debug, Default)]
pub struct CourseForms {
    pub calendar_open: bool,
    pub calendar_draft: CalendarDraft,
    pub calendar_message: Option<String>,
    pub batch_open: bool,
    pub batch_draft: BatchDraft,
    pub batch_message: Option<String>,
}

/// Sequences the Course -> Calendar -> Batch creation flow. The backend
/// offers no cross-resource transaction, so this coordinator is the only
/// place the ordering invariant is enforced: a batch may only reference
/// the calendar most recently created for its course in this session,
/// even if older calendars exist server-side.
pub struct ProvisioningCoordinator {
    courses: Arc<dyn CourseApi>,
    calendars: Arc<dyn CalendarApi>,
    batches: Arc<dyn BatchApi>,
    store: ResourceGraphStore,
    course_draft: NewCourseRequest,
    course_message: Option<String>,
    forms: HashMap<i64, CourseForms>,
}

impl ProvisioningCoordinator {
    pub fn new(
        courses: Arc<dyn CourseApi>,
        calendars: Arc<dyn CalendarApi>,
        batches: Arc<dyn BatchApi>,
    ) -> Self {
        Self {
            courses,
            calendars,
            batches,
            store: ResourceGraphStore::new(),
            course_draft: NewCourseRequest::default(),
            course_message: None,
            forms: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ResourceGraphStore {
        &self.store
    }

    pub fn course_draft(&self) -> &NewCourseRequest {
        &self.course_draft
    }

    pub fn course_message(&self) -> Option<&str> {
        self.course_message.as_deref()
    }

    pub fn course_forms(&self, course_id: i64) -> Option<&CourseForms> {
        self.forms.get(&course_id)
    }

    /// Replaces the course list with the server's. A failed load leaves
    /// the previous list on display; nothing was mutated.
    pub async fn load_courses(&mut self) -> Result<(), PortalError> {
        match self.courses.list().await {
            Ok(list) => {
                self.store.set_courses(list);
                Ok(())
            }
            Err(err) => {
                warn!("failed to load courses: {}", err);
                Err(err)
            }
        }
    }

    pub async fn create_course(&mut self, draft: NewCourseRequest) -> Result<(), PortalError> {
        self.course_draft = draft;

        if self.course_draft.course_name.trim().is_empty() {
            let msg = "Course name is required";
            self.course_message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        }

        match self.courses.create(self.course_draft.clone()).await {
            Ok(course) => {
                info!("course {} created", course.course_id);
                self.course_message = Some("Course created".to_string());
                self.course_draft = NewCourseRequest::default();
                let _ = self.load_courses().await;
                Ok(())
            }
            Err(err) => {
                self.course_message = Some(format!("Create failed: {}", err));
                Err(err)
            }
        }
    }

    /// Lazily initializes the calendar form for the course on first use,
    /// then flips its visibility. No network effect.
    pub fn toggle_calendar_form(&mut self, course_id: i64) {
        let forms = self.forms.entry(course_id).or_default();
        forms.calendar_open = !forms.calendar_open;
    }

    pub fn toggle_batch_form(&mut self, course_id: i64) {
        let forms = self.forms.entry(course_id).or_default();
        forms.batch_open = !forms.batch_open;
    }

    pub async fn submit_calendar(
        &mut self,
        course_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<CourseCalendar, PortalError> {
        let forms = self.forms.entry(course_id).or_default();
        forms.calendar_draft.start_date = start_date;
        forms.calendar_draft.end_date = end_date;

        let (Some(start), Some(end)) = (start_date, end_date) else {
            let msg = "Start and end dates are required";
            forms.calendar_message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        };
        if start > end {
            let msg = "Start date must not be after end date";
            forms.calendar_message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        }

        let request = NewCalendarRequest {
            course_id,
            start_date: start,
            end_date: end,
        };
        match self.calendars.create(request).await {
            Ok(calendar) => {
                info!("calendar {} recorded for course {}", calendar.calendar_id, course_id);
                self.store.record_calendar(course_id, calendar.clone());
                let forms = self.forms.entry(course_id).or_default();
                forms.calendar_draft = CalendarDraft::default();
                forms.calendar_message = Some("Calendar created".to_string());
                Ok(calendar)
            }
            Err(err) => {
                let forms = self.forms.entry(course_id).or_default();
                forms.calendar_message = Some(format!("Create failed: {}", err));
                Err(err)
            }
        }
    }

    /// Refuses without a network call unless a calendar has been created
    /// for this course in the current session.
    pub async fn submit_batch(
        &mut self,
        course_id: i64,
        batch_name: &str,
    ) -> Result<Batch, PortalError> {
        self.forms.entry(course_id).or_default().batch_draft.batch_name = batch_name.to_string();

        let Some(calendar_id) = self.store.calendar_for(course_id).map(|c| c.calendar_id) else {
            let msg = "No calendar found for this course";
            self.forms.entry(course_id).or_default().batch_message = Some(msg.to_string());
            return Err(PortalError::MissingDependency(msg.to_string()));
        };

        if batch_name.trim().is_empty() {
            let msg = "Batch name is required";
            self.forms.entry(course_id).or_default().batch_message = Some(msg.to_string());
            return Err(PortalError::Validation(msg.to_string()));
        }

        let request = NewBatchRequest {
            batch_name: batch_name.to_string(),
            calendar_id,
        };
        match self.batches.create(request).await {
            Ok(batch) => {
                info!("batch {} created under calendar {}", batch.batch_id, calendar_id);
                let forms = self.forms.entry(course_id).or_default();
                forms.batch_draft = BatchDraft::default();
                forms.batch_message = Some("Batch created".to_string());
                Ok(batch)
            }
            Err(err) => {
                let forms = self.forms.entry(course_id).or_default();
                forms.batch_message = Some(format!("Create failed: {}", err));
                Err(err)
            }
        }
    }
}
