//! Recognition service client.
//!
//! The service exposes one endpoint accepting a multi-file upload of sheet
//! photos and answering `{status, idArray | message}`. This is the canonical
//! contract: a structured list of candidate identifier strings. The historical
//! raw-text variant (OCR text requiring client-side regex extraction) is not
//! supported.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use rollmark_core::{AttendanceError, IdRecognizer};

use crate::image::decode_batch;

/// Response envelope from the recognition service.
#[derive(Deserialize, Debug)]
struct ExtractResponse {
    status: String,
    #[serde(rename = "idArray", default)]
    id_array: Option<Vec<String>>,
    #[serde(default)]
    message: Option<String>,
}

/// Trim, drop empties, and deduplicate the raw id list. Set semantics: the
/// same identifier read off two different images still counts once.
fn normalize_candidates(ids: Vec<String>) -> BTreeSet<String> {
    ids.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

pub struct RecognitionClient {
    base_url: String,
    http_client: Client,
}

impl RecognitionClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn extract_url(&self) -> String {
        format!("{}/extractIds", self.base_url)
    }
}

#[async_trait]
impl IdRecognizer for RecognitionClient {
    /// Decode the batch, ship it as one multipart request, and return the
    /// deduplicated candidate identifier set.
    async fn extract_ids(&self, images: &[String]) -> Result<BTreeSet<String>, AttendanceError> {
        // Decode everything up front: a bad payload must fail the batch
        // before any bytes reach the service.
        let decoded = decode_batch(images)?;

        let image_count = decoded.len();
        let mut form = Form::new();
        for (i, img) in decoded.into_iter().enumerate() {
            let file_name = img.file_name(i);
            let part = Part::bytes(img.bytes)
                .file_name(file_name)
                .mime_str(&img.mime)
                .map_err(|e| {
                    AttendanceError::InvalidImageEncoding(format!(
                        "image {i}: unusable media type {}: {e}",
                        img.mime
                    ))
                })?;
            form = form.part("images", part);
        }

        info!("[Recognition] Submitting {image_count} image(s) for extraction");
        let response = self
            .http_client
            .post(self.extract_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                AttendanceError::RecognitionServiceError(format!("request failed: {e}"))
            })?;

        // The service reports failures through the envelope's `status`, with
        // a non-2xx HTTP status alongside; prefer the envelope message.
        let http_status = response.status();
        let envelope: ExtractResponse = response.json().await.map_err(|e| {
            AttendanceError::RecognitionServiceError(format!(
                "unreadable response (HTTP {http_status}): {e}"
            ))
        })?;

        if !envelope.status.eq_ignore_ascii_case("success") {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("service reported status {:?}", envelope.status));
            warn!("[Recognition] Extraction failed: {}", message);
            return Err(AttendanceError::RecognitionServiceError(message));
        }

        let ids = envelope.id_array.ok_or_else(|| {
            AttendanceError::RecognitionServiceError(
                "success response missing idArray".to_string(),
            )
        })?;

        let candidates = normalize_candidates(ids);
        info!("[Recognition] Extracted {} unique candidate id(s)", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_envelope() {
        let raw = r#"{"status":"success","idArray":["22-101100","22-101184","22-101100"]}"#;
        let envelope: ExtractResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.status, "success");
        assert_eq!(envelope.id_array.unwrap().len(), 3);
    }

    #[test]
    fn parses_failure_envelope_with_message() {
        let raw = r#"{"status":"Failed","message":"Try uploading a high quality image"}"#;
        let envelope: ExtractResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.status, "Failed");
        assert!(envelope.id_array.is_none());
        assert!(envelope.message.unwrap().contains("high quality"));
    }

    #[test]
    fn duplicate_ids_across_images_collapse_to_one() {
        let ids = vec![
            "22-101100".to_string(),
            " 22-101100 ".to_string(),
            "".to_string(),
            "22-101184".to_string(),
        ];
        let candidates = normalize_candidates(ids);
        assert_eq!(candidates.len(), 2);
        assert!(candidates.contains("22-101100"));
    }

    #[tokio::test]
    async fn bad_payload_fails_before_any_request() {
        // Base URL that would refuse connections; the decode error must win.
        let client =
            RecognitionClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let err = client
            .extract_ids(&["definitely not a data uri".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidImageEncoding(_)));
    }
}
