pub mod error;
pub mod traits;
pub mod types;

pub use error::AttendanceError;
pub use traits::{IdRecognizer, LmsApi};
pub use types::{AttendanceReport, AttendanceRequest, PresentStudent, RosterEntry};
