pub mod course;
pub mod enrollment;
pub mod user;

pub use course::{Batch, Course, CourseCalendar, NewBatchRequest, NewCalendarRequest, NewCourseRequest};
pub use enrollment::{EnrollmentDto, EnrollmentStatus, Feedback, FeedbackRequest};
pub use user::{CreateUserRequest, EmployeeSummary, ManagerDto, User};
