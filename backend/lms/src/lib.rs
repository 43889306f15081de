//! `rollmark-lms` — typed client for the Canvas-style LMS REST API.
//!
//! Covers the four calls the attendance pipeline depends on:
//! - identity self-check (credential validation)
//! - assignment create (the grade container for one session)
//! - student roster list (with Link-header pagination)
//! - bulk grade update
//!
//! Every call carries the caller's bearer credential; nothing is cached
//! across runs.

pub mod assignments;
pub mod client;
pub mod grades;
pub mod roster;

pub use client::CanvasClient;

use std::collections::BTreeMap;

use async_trait::async_trait;

use rollmark_core::{AttendanceError, LmsApi, RosterEntry};

#[async_trait]
impl LmsApi for CanvasClient {
    async fn validate_token(&self, token: &str) -> Result<(), AttendanceError> {
        CanvasClient::validate_token(self, token).await
    }

    async fn create_assignment(
        &self,
        token: &str,
        course_id: &str,
        name: &str,
        points_possible: f64,
    ) -> Result<i64, AttendanceError> {
        CanvasClient::create_assignment(self, token, course_id, name, points_possible).await
    }

    async fn fetch_roster(
        &self,
        token: &str,
        course_id: &str,
    ) -> Result<Vec<RosterEntry>, AttendanceError> {
        CanvasClient::fetch_roster(self, token, course_id).await
    }

    async fn submit_grades(
        &self,
        token: &str,
        course_id: &str,
        assignment_id: i64,
        grades: &BTreeMap<i64, f64>,
    ) -> Result<(), AttendanceError> {
        CanvasClient::submit_grades(self, token, course_id, assignment_id, grades).await
    }
}
