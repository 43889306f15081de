use thiserror::Error;

/// Top-level error type for one attendance pipeline run.
///
/// Every stage surfaces its failure through exactly one of these variants;
/// no stage swallows an error and continues. A run with zero matched
/// candidates is NOT an error — see `AttendanceReport::no_matches`.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("roster fetch failed: {0}")]
    RosterFetchFailed(String),

    #[error("invalid image encoding: {0}")]
    InvalidImageEncoding(String),

    #[error("recognition service error: {0}")]
    RecognitionServiceError(String),

    #[error("assignment provisioning failed: {0}")]
    ProvisioningFailed(String),

    #[error("grade submission failed: {0}")]
    GradeSubmissionFailed(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AttendanceError {
    /// Stable machine-readable kind, preserved verbatim on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::RosterFetchFailed(_) => "ROSTER_FETCH_FAILED",
            Self::InvalidImageEncoding(_) => "INVALID_IMAGE_ENCODING",
            Self::RecognitionServiceError(_) => "RECOGNITION_SERVICE_ERROR",
            Self::ProvisioningFailed(_) => "PROVISIONING_FAILED",
            Self::GradeSubmissionFailed(_) => "GRADE_SUBMISSION_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
