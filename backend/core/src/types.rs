use serde::{Deserialize, Serialize};

/// Input contract for one pipeline run.
///
/// The credential is held only for the duration of the run and is never
/// persisted; images are data-URI encoded payloads captured client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRequest {
    /// Opaque bearer token for the LMS, validated before any mutating call.
    pub access_token: String,
    /// Target course identifier (opaque to this pipeline).
    pub course_id: String,
    /// Attendance sheet photos, each as a `data:image/...;base64,...` payload.
    pub images: Vec<String>,
    /// Display name for the assignment created for this session.
    pub assignment_name: String,
    /// Points awarded to each present student (> 0, 0.5 granularity).
    pub points_possible: f64,
}

/// One enrollee as returned by the LMS roster endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub login_id: Option<String>,
}

/// A student the reconciliation engine matched against a candidate identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentStudent {
    /// The join key that matched (e.g. `22-101100`).
    pub id: String,
    /// Roster display name.
    pub name: String,
}

/// Final report for a pipeline run that reached a normal terminal state.
///
/// `success: false` with `marked_count: 0` means the run completed but no
/// candidate identifier matched the roster — distinct from a hard failure,
/// which surfaces as an `AttendanceError` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReport {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<i64>,
    pub marked_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub present_students: Vec<PresentStudent>,
}

impl AttendanceReport {
    /// Report for a run that graded at least one student.
    pub fn marked(assignment_id: i64, present: Vec<PresentStudent>) -> Self {
        let count = present.len();
        Self {
            success: true,
            message: format!("Attendance marked for {count} student(s)"),
            assignment_id: Some(assignment_id),
            marked_count: count,
            present_students: present,
        }
    }

    /// Report for a run where no candidate matched the roster.
    pub fn no_matches(assignment_id: i64) -> Self {
        Self {
            success: false,
            message: "No student identifiers from the images matched the course roster"
                .to_string(),
            assignment_id: Some(assignment_id),
            marked_count: 0,
            present_students: Vec::new(),
        }
    }
}
