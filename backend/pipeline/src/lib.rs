//! `rollmark-pipeline` — the attendance reconciliation core.
//!
//! Builds the roster join-key index, reconciles OCR candidates against it,
//! and orchestrates the linear run from credential check to grade submission.

pub mod orchestrator;
pub mod reconcile;
pub mod roster;

pub use orchestrator::{AttendancePipeline, Stage};
pub use reconcile::{reconcile, Reconciliation};
pub use roster::{join_key, Enrollee, RosterIndex};
