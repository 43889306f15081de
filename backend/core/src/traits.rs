//! Service trait seams between the orchestrator and the two remote
//! collaborators. Concrete implementations live in `rollmark-lms` and
//! `rollmark-recognition`; tests substitute in-memory fakes.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::error::AttendanceError;
use crate::types::RosterEntry;

/// The LMS surface the pipeline depends on.
///
/// All methods take the caller's bearer credential explicitly — nothing is
/// cached or shared across runs.
#[async_trait]
pub trait LmsApi: Send + Sync {
    /// Identity self-check. Read-only; must succeed before any mutating call.
    async fn validate_token(&self, token: &str) -> Result<(), AttendanceError>;

    /// Create one published, no-submission assignment; returns its remote id.
    async fn create_assignment(
        &self,
        token: &str,
        course_id: &str,
        name: &str,
        points_possible: f64,
    ) -> Result<i64, AttendanceError>;

    /// Fetch every student-role enrollee of the course.
    async fn fetch_roster(
        &self,
        token: &str,
        course_id: &str,
    ) -> Result<Vec<RosterEntry>, AttendanceError>;

    /// Bulk grade update: remote user id -> awarded points. Exactly one call
    /// per run; success means the LMS accepted the request.
    async fn submit_grades(
        &self,
        token: &str,
        course_id: &str,
        assignment_id: i64,
        grades: &BTreeMap<i64, f64>,
    ) -> Result<(), AttendanceError>;
}

/// The recognition-service surface: data-URI images in, deduplicated
/// candidate identifier strings out.
#[async_trait]
pub trait IdRecognizer: Send + Sync {
    async fn extract_ids(&self, images: &[String]) -> Result<BTreeSet<String>, AttendanceError>;
}
