//! Bulk grade submission.
//!
//! One `update_grades` call per run, carrying a score for every enrollee on
//! the roster. The LMS processes bulk grading as a background job; this
//! client reports success once the request is accepted and does not poll the
//! returned progress object.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::info;

use rollmark_core::AttendanceError;

use crate::client::CanvasClient;

/// Format an awarded score the way the LMS grade field expects: a string,
/// without a trailing `.0` on whole values.
pub(crate) fn format_grade(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{}", points as i64)
    } else {
        format!("{points}")
    }
}

pub(crate) fn grade_data_body(grades: &BTreeMap<i64, f64>) -> Value {
    let grade_data: Map<String, Value> = grades
        .iter()
        .map(|(user_id, points)| {
            (
                user_id.to_string(),
                json!({ "posted_grade": format_grade(*points) }),
            )
        })
        .collect();
    json!({ "grade_data": grade_data })
}

impl CanvasClient {
    /// Submit the full grade payload for one assignment.
    pub async fn submit_grades(
        &self,
        token: &str,
        course_id: &str,
        assignment_id: i64,
        grades: &BTreeMap<i64, f64>,
    ) -> Result<(), AttendanceError> {
        let url = self.api_url(&format!(
            "/courses/{course_id}/assignments/{assignment_id}/submissions/update_grades"
        ));

        let response = self
            .http_client
            .post(url)
            .bearer_auth(token)
            .json(&grade_data_body(grades))
            .send()
            .await
            .map_err(|e| {
                AttendanceError::GradeSubmissionFailed(format!("grade update failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AttendanceError::GradeSubmissionFailed(format!(
                "LMS answered HTTP {status}: {detail}"
            )));
        }

        info!(
            "[Canvas] Grade update accepted for assignment {} ({} entries)",
            assignment_id,
            grades.len()
        );
        Ok(())
    }
}
