//! Pipeline orchestrator.
//!
//! Runs the strictly linear stage sequence over the two injected service
//! seams. Each remote call is attempted at most once — no retries — and a
//! failure at any stage terminates the run with that stage's error. The one
//! exception is a reconciliation with zero hits, which short-circuits to a
//! normal terminal report instead of failing.

use std::sync::Arc;

use tracing::{debug, info};

use rollmark_core::{
    AttendanceError, AttendanceReport, AttendanceRequest, IdRecognizer, LmsApi,
};

use crate::reconcile::reconcile;
use crate::roster::RosterIndex;

/// Stages of one run, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CredentialValidated,
    AssignmentProvisioned,
    RosterIndexed,
    IdentifiersExtracted,
    Reconciled,
    GradesSubmitted,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CredentialValidated => "credential_validated",
            Self::AssignmentProvisioned => "assignment_provisioned",
            Self::RosterIndexed => "roster_indexed",
            Self::IdentifiersExtracted => "identifiers_extracted",
            Self::Reconciled => "reconciled",
            Self::GradesSubmitted => "grades_submitted",
        }
    }
}

pub struct AttendancePipeline {
    lms: Arc<dyn LmsApi>,
    recognizer: Arc<dyn IdRecognizer>,
}

/// Local input checks, before any remote traffic.
fn validate_request(request: &AttendanceRequest) -> Result<(), AttendanceError> {
    if request.access_token.trim().is_empty() {
        return Err(AttendanceError::Unauthorized(
            "access token is required".to_string(),
        ));
    }
    if request.assignment_name.trim().is_empty() {
        return Err(AttendanceError::ProvisioningFailed(
            "assignment name must not be empty".to_string(),
        ));
    }
    let points = request.points_possible;
    if !points.is_finite() || points <= 0.0 || (points * 2.0).fract() != 0.0 {
        return Err(AttendanceError::ProvisioningFailed(format!(
            "points possible must be positive in 0.5 steps, got {points}"
        )));
    }
    if request.images.is_empty() {
        return Err(AttendanceError::InvalidImageEncoding(
            "image batch is empty".to_string(),
        ));
    }
    Ok(())
}

impl AttendancePipeline {
    pub fn new(lms: Arc<dyn LmsApi>, recognizer: Arc<dyn IdRecognizer>) -> Self {
        Self { lms, recognizer }
    }

    /// Execute one full attendance run for `request`.
    pub async fn run(
        &self,
        request: &AttendanceRequest,
    ) -> Result<AttendanceReport, AttendanceError> {
        validate_request(request)?;
        let token = &request.access_token;
        let course = &request.course_id;

        self.lms.validate_token(token).await?;
        debug!("[Pipeline] stage={}", Stage::CredentialValidated.as_str());

        let assignment_id = self
            .lms
            .create_assignment(
                token,
                course,
                request.assignment_name.trim(),
                request.points_possible,
            )
            .await?;
        debug!("[Pipeline] stage={}", Stage::AssignmentProvisioned.as_str());

        let roster = self.lms.fetch_roster(token, course).await?;
        let index = RosterIndex::build(&roster);
        debug!(
            "[Pipeline] stage={} roster={}",
            Stage::RosterIndexed.as_str(),
            index.roster_len()
        );

        let candidates = self.recognizer.extract_ids(&request.images).await?;
        debug!(
            "[Pipeline] stage={} candidates={}",
            Stage::IdentifiersExtracted.as_str(),
            candidates.len()
        );

        let outcome = reconcile(&index, &candidates, request.points_possible);
        debug!(
            "[Pipeline] stage={} present={} unmatched={}",
            Stage::Reconciled.as_str(),
            outcome.present.len(),
            outcome.unmatched.len()
        );

        // Nothing matched: a normal terminal, not a failure. The assignment
        // was created this run, so there are no stale grades to clear and no
        // reason to spend the mutating call.
        if outcome.is_no_match() {
            info!(
                "[Pipeline] No candidates matched course {} ({} unmatched)",
                course,
                outcome.unmatched.len()
            );
            return Ok(AttendanceReport::no_matches(assignment_id));
        }

        self.lms
            .submit_grades(token, course, assignment_id, &outcome.grades)
            .await?;
        debug!("[Pipeline] stage={}", Stage::GradesSubmitted.as_str());

        info!(
            "[Pipeline] Marked {} student(s) present in course {} (assignment {})",
            outcome.present.len(),
            course,
            assignment_id
        );
        Ok(AttendanceReport::marked(assignment_id, outcome.present))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rollmark_core::RosterEntry;

    /// Call-counting LMS fake. Counters make the fail-fast ordering
    /// observable independently of call contents.
    #[derive(Default)]
    struct FakeLms {
        reject_token: bool,
        fail_roster: bool,
        validate_calls: AtomicUsize,
        create_calls: AtomicUsize,
        roster_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        submitted: Mutex<Option<BTreeMap<i64, f64>>>,
    }

    impl FakeLms {
        fn two_students() -> Vec<RosterEntry> {
            vec![
                RosterEntry {
                    id: 1,
                    name: "Ada Lovelace".to_string(),
                    email: None,
                    login_id: Some("22-101100@uni.edu".to_string()),
                },
                RosterEntry {
                    id: 2,
                    name: "Alan Turing".to_string(),
                    email: None,
                    login_id: Some("22-101184@uni.edu".to_string()),
                },
            ]
        }
    }

    #[async_trait]
    impl LmsApi for FakeLms {
        async fn validate_token(&self, _token: &str) -> Result<(), AttendanceError> {
            self.validate_calls.fetch_add(1, Ordering::SeqCst);
            if self.reject_token {
                // Redirect-to-login is equivalent to explicit rejection.
                return Err(AttendanceError::Unauthorized(
                    "LMS redirected to login; access token rejected".to_string(),
                ));
            }
            Ok(())
        }

        async fn create_assignment(
            &self,
            _token: &str,
            _course_id: &str,
            _name: &str,
            _points_possible: f64,
        ) -> Result<i64, AttendanceError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Ok(501)
        }

        async fn fetch_roster(
            &self,
            _token: &str,
            _course_id: &str,
        ) -> Result<Vec<RosterEntry>, AttendanceError> {
            self.roster_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_roster {
                return Err(AttendanceError::RosterFetchFailed(
                    "response is not a list of enrollees".to_string(),
                ));
            }
            Ok(Self::two_students())
        }

        async fn submit_grades(
            &self,
            _token: &str,
            _course_id: &str,
            _assignment_id: i64,
            grades: &BTreeMap<i64, f64>,
        ) -> Result<(), AttendanceError> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            *self.submitted.lock().unwrap() = Some(grades.clone());
            Ok(())
        }
    }

    struct FakeRecognizer {
        ids: Vec<&'static str>,
        fail: Option<String>,
        calls: AtomicUsize,
    }

    impl FakeRecognizer {
        fn returning(ids: &[&'static str]) -> Self {
            Self { ids: ids.to_vec(), fail: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl IdRecognizer for FakeRecognizer {
        async fn extract_ids(
            &self,
            _images: &[String],
        ) -> Result<BTreeSet<String>, AttendanceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.fail {
                return Err(AttendanceError::RecognitionServiceError(message.clone()));
            }
            Ok(self.ids.iter().map(|s| s.to_string()).collect())
        }
    }

    fn request() -> AttendanceRequest {
        AttendanceRequest {
            access_token: "tok-123".to_string(),
            course_id: "42".to_string(),
            images: vec!["data:image/png;base64,AAAA".to_string()],
            assignment_name: "Attendance - 2026-08-30".to_string(),
            points_possible: 1.0,
        }
    }

    fn pipeline(lms: Arc<FakeLms>, rec: Arc<FakeRecognizer>) -> AttendancePipeline {
        AttendancePipeline::new(lms, rec)
    }

    #[tokio::test]
    async fn full_match_marks_everyone_and_submits_once() {
        let lms = Arc::new(FakeLms::default());
        let rec = Arc::new(FakeRecognizer::returning(&["22-101100", "22-101184"]));
        let report = pipeline(lms.clone(), rec).run(&request()).await.unwrap();

        assert!(report.success);
        assert_eq!(report.marked_count, 2);
        assert_eq!(report.assignment_id, Some(501));
        assert_eq!(report.present_students.len(), 2);
        assert_eq!(lms.submit_calls.load(Ordering::SeqCst), 1);

        let submitted = lms.submitted.lock().unwrap().clone().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[&1], 1.0);
        assert_eq!(submitted[&2], 1.0);
    }

    #[tokio::test]
    async fn rejected_credential_halts_before_any_other_call() {
        let lms = Arc::new(FakeLms { reject_token: true, ..Default::default() });
        let rec = Arc::new(FakeRecognizer::returning(&["22-101100"]));
        let err = pipeline(lms.clone(), rec.clone()).run(&request()).await.unwrap_err();

        assert!(matches!(err, AttendanceError::Unauthorized(_)));
        assert_eq!(lms.validate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(lms.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(lms.roster_calls.load(Ordering::SeqCst), 0);
        assert_eq!(lms.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(rec.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_credential_never_reaches_the_lms() {
        let lms = Arc::new(FakeLms::default());
        let rec = Arc::new(FakeRecognizer::returning(&[]));
        let mut req = request();
        req.access_token = "   ".to_string();
        let err = pipeline(lms.clone(), rec).run(&req).await.unwrap_err();

        assert!(matches!(err, AttendanceError::Unauthorized(_)));
        assert_eq!(lms.validate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn no_matches_is_reported_without_grade_submission() {
        let lms = Arc::new(FakeLms::default());
        let rec = Arc::new(FakeRecognizer::returning(&["99-999999"]));
        let report = pipeline(lms.clone(), rec).run(&request()).await.unwrap();

        assert!(!report.success);
        assert_eq!(report.marked_count, 0);
        assert!(report.present_students.is_empty());
        assert_eq!(report.assignment_id, Some(501));
        assert_eq!(lms.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn roster_failure_stops_before_extraction() {
        let lms = Arc::new(FakeLms { fail_roster: true, ..Default::default() });
        let rec = Arc::new(FakeRecognizer::returning(&["22-101100"]));
        let err = pipeline(lms.clone(), rec.clone()).run(&request()).await.unwrap_err();

        assert!(matches!(err, AttendanceError::RosterFetchFailed(_)));
        assert_eq!(lms.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rec.calls.load(Ordering::SeqCst), 0);
        assert_eq!(lms.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extraction_failure_surfaces_with_its_kind() {
        let lms = Arc::new(FakeLms::default());
        let rec = Arc::new(FakeRecognizer {
            ids: vec![],
            fail: Some("Try uploading a high quality image".to_string()),
            calls: AtomicUsize::new(0),
        });
        let err = pipeline(lms.clone(), rec).run(&request()).await.unwrap_err();

        assert_eq!(err.kind(), "RECOGNITION_SERVICE_ERROR");
        assert_eq!(lms.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bad_points_granularity_fails_before_provisioning() {
        let lms = Arc::new(FakeLms::default());
        let rec = Arc::new(FakeRecognizer::returning(&[]));
        for points in [0.0, -1.0, 0.3, f64::NAN] {
            let mut req = request();
            req.points_possible = points;
            let err = pipeline(lms.clone(), rec.clone()).run(&req).await.unwrap_err();
            assert!(matches!(err, AttendanceError::ProvisioningFailed(_)), "points {points}");
        }
        assert_eq!(lms.create_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn half_point_granularity_is_accepted() {
        let mut req = request();
        req.points_possible = 2.5;
        assert!(validate_request(&req).is_ok());
    }
}
