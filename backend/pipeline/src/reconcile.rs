//! Reconciliation engine.
//!
//! Joins the candidate identifier set against the roster index and builds the
//! grade payload. The payload always carries exactly one entry per roster
//! remote id — non-present students are explicitly zeroed, never omitted, so
//! no stale prior grade can survive a run.

use std::collections::{BTreeMap, BTreeSet};

use rollmark_core::PresentStudent;

use crate::roster::RosterIndex;

/// The computed present/absent partition for one run.
#[derive(Debug)]
pub struct Reconciliation {
    /// Remote user id -> awarded points. One entry per roster member.
    pub grades: BTreeMap<i64, f64>,
    /// Matched students, ordered by join key.
    pub present: Vec<PresentStudent>,
    /// Candidates that matched no enrollee. OCR noise is expected; these are
    /// reported, not treated as an error.
    pub unmatched: BTreeSet<String>,
}

impl Reconciliation {
    /// True when not a single candidate matched the roster.
    pub fn is_no_match(&self) -> bool {
        self.present.is_empty()
    }
}

/// Partition candidates into present/unmatched and build the grade payload.
pub fn reconcile(
    index: &RosterIndex,
    candidates: &BTreeSet<String>,
    points_possible: f64,
) -> Reconciliation {
    // Every enrollee starts at zero.
    let mut grades: BTreeMap<i64, f64> =
        index.all_ids().iter().map(|id| (*id, 0.0)).collect();
    let mut present = Vec::new();
    let mut unmatched = BTreeSet::new();

    for candidate in candidates {
        match index.lookup(candidate) {
            Some(enrollee) => {
                grades.insert(enrollee.remote_id, points_possible);
                present.push(PresentStudent {
                    id: candidate.clone(),
                    name: enrollee.name.clone(),
                });
            }
            None => {
                unmatched.insert(candidate.clone());
            }
        }
    }

    Reconciliation { grades, present, unmatched }
}
