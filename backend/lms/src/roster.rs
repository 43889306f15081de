//! Roster fetch.
//!
//! Lists every student-role enrollee of a course. The LMS pages list
//! endpoints via RFC 5988 `Link` headers, so the fetch follows `rel="next"`
//! until exhausted and returns the concatenated roster in remote order.

use reqwest::header::LINK;
use tracing::info;

use rollmark_core::{AttendanceError, RosterEntry};

use crate::client::CanvasClient;

/// Extract the `rel="next"` target from a `Link` header value.
///
/// A segment may carry several `;`-separated parameters besides `rel`, in
/// any position.
pub(crate) fn next_page_url(link_header: &str) -> Option<String> {
    for segment in link_header.split(',') {
        let mut parts = segment.split(';');
        let url = parts.next()?.trim();
        if parts.any(|param| param.trim() == r#"rel="next""#) {
            return Some(url.trim_start_matches('<').trim_end_matches('>').to_string());
        }
    }
    None
}

impl CanvasClient {
    /// Fetch the full student roster for a course, following pagination.
    pub async fn fetch_roster(
        &self,
        token: &str,
        course_id: &str,
    ) -> Result<Vec<RosterEntry>, AttendanceError> {
        let mut url = format!(
            "{}?enrollment_type[]=student&per_page=100",
            self.api_url(&format!("/courses/{course_id}/users"))
        );
        let mut roster: Vec<RosterEntry> = Vec::new();

        loop {
            let response = self
                .http_client
                .get(&url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| {
                    AttendanceError::RosterFetchFailed(format!("roster request failed: {e}"))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(AttendanceError::RosterFetchFailed(format!(
                    "LMS answered HTTP {status} for course {course_id}"
                )));
            }

            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            let page: Vec<RosterEntry> = response.json().await.map_err(|e| {
                AttendanceError::RosterFetchFailed(format!(
                    "response is not a list of enrollees: {e}"
                ))
            })?;
            roster.extend(page);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }

        info!("[Canvas] Fetched {} enrollee(s) for course {}", roster.len(), course_id);
        Ok(roster)
    }
}
