use std::collections::HashMap;

use crate::models::{Course, CourseCalendar};

/// In-memory view of the admin's course graph for the current session:
/// the last-fetched course list plus, per course, the most recently
/// created calendar. The calendar slot is last-write-wins with no
/// history; it is the only calendar allowed to parent new batches.
#[derive(Debug, Default)]
pub struct ResourceGraphStore {
    courses: Vec<Course>,
    calendars: HashMap<i64, CourseCalendar>,
}

impl ResourceGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_courses(&mut self, courses: Vec<Course>) {
        self.courses = courses;
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Overwrites any previously recorded calendar for the course.
    pub fn record_calendar(&mut self, course_id: i64, calendar: CourseCalendar) {
        self.calendars.insert(course_id, calendar);
    }

    pub fn calendar_for(&self, course_id: i64) -> Option<&CourseCalendar> {
        self.calendars.get(&course_id)
    }
}
