//! Assignment provisioning.
//!
//! Creates the grade container for one attendance session: no submission
//! types (students never submit anything to it) and published immediately so
//! posted grades are visible.

use serde::{Deserialize, Serialize};
use tracing::info;

use rollmark_core::AttendanceError;

use crate::client::CanvasClient;

#[derive(Serialize)]
struct CreateAssignmentBody<'a> {
    assignment: AssignmentSpec<'a>,
}

#[derive(Serialize)]
struct AssignmentSpec<'a> {
    name: &'a str,
    points_possible: f64,
    submission_types: [&'a str; 1],
    published: bool,
}

#[derive(Deserialize, Debug)]
pub(crate) struct CreatedAssignment {
    #[serde(default)]
    pub(crate) id: Option<i64>,
}

impl CanvasClient {
    /// Create one published, submission-less assignment; returns its id.
    pub async fn create_assignment(
        &self,
        token: &str,
        course_id: &str,
        name: &str,
        points_possible: f64,
    ) -> Result<i64, AttendanceError> {
        let body = CreateAssignmentBody {
            assignment: AssignmentSpec {
                name,
                points_possible,
                submission_types: ["none"],
                published: true,
            },
        };

        let response = self
            .http_client
            .post(self.api_url(&format!("/courses/{course_id}/assignments")))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AttendanceError::ProvisioningFailed(format!("assignment create failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AttendanceError::ProvisioningFailed(format!(
                "LMS answered HTTP {status}: {detail}"
            )));
        }

        let created: CreatedAssignment = response.json().await.map_err(|e| {
            AttendanceError::ProvisioningFailed(format!("unreadable create response: {e}"))
        })?;

        // No id means nothing to grade against; the run cannot continue.
        let id = created.id.ok_or_else(|| {
            AttendanceError::ProvisioningFailed(
                "create response lacks an assignment id".to_string(),
            )
        })?;

        info!("[Canvas] Created assignment {} ({:?}) in course {}", id, name, course_id);
        Ok(id)
    }
}
