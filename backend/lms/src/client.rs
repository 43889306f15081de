//! LMS HTTP client core.
//!
//! Holds the shared `reqwest::Client` and base URL, and implements the
//! identity self-check. Redirect following is disabled: the LMS answers an
//! invalid or expired token on some deployments with a redirect to its login
//! page rather than a clean 401, and that redirect must be observable so it
//! can be classified as `Unauthorized`.

use std::time::Duration;

use anyhow::anyhow;
use reqwest::{redirect, Client, StatusCode};
use tracing::{info, warn};

use rollmark_core::AttendanceError;

pub struct CanvasClient {
    base_url: String,
    pub(crate) http_client: Client,
}

impl CanvasClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Identity self-check against `/users/self`.
    ///
    /// 401/403, any redirect (login bounce), and transport failures are all
    /// `Unauthorized`; an unexpected HTTP status is `Internal` so it is not
    /// mistaken for a clean token rejection.
    pub async fn validate_token(&self, token: &str) -> Result<(), AttendanceError> {
        if token.trim().is_empty() {
            return Err(AttendanceError::Unauthorized(
                "access token is required".to_string(),
            ));
        }

        // Transport failures, the bounded per-call timeout included, carry
        // this stage's kind like every other stage's client does.
        let response = self
            .http_client
            .get(self.api_url("/users/self"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                AttendanceError::Unauthorized(format!("identity check failed: {e}"))
            })?;

        let status = response.status();
        if status.is_redirection() {
            warn!("[Canvas] Identity check redirected ({}), treating as rejected token", status);
            return Err(AttendanceError::Unauthorized(
                "LMS redirected to login; access token rejected".to_string(),
            ));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttendanceError::Unauthorized(format!(
                "LMS rejected the access token (HTTP {status})"
            )));
        }
        if !status.is_success() {
            return Err(AttendanceError::Internal(anyhow!(
                "unexpected HTTP {status} from identity check"
            )));
        }

        info!("[Canvas] Access token accepted");
        Ok(())
    }
}
