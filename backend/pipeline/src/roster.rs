//! Roster index construction.
//!
//! Maps a derived join key to an enrollee's remote identity. The join key is
//! the local part of the institutional email, falling back to the local part
//! of the login id; enrollees with neither are skipped and therefore always
//! reported absent. Derivation is pure: the same entry yields the same key on
//! every run.

use std::collections::HashMap;

use tracing::warn;

use rollmark_core::RosterEntry;

/// One indexed enrollee.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollee {
    pub remote_id: i64,
    pub name: String,
}

/// Derive the join key for one roster entry.
pub fn join_key(entry: &RosterEntry) -> Option<String> {
    let source = entry
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| entry.login_id.as_deref().map(str::trim).filter(|s| !s.is_empty()))?;

    let local = source.split('@').next().unwrap_or("");
    if local.is_empty() {
        None
    } else {
        Some(local.to_string())
    }
}

/// Lookup from join key to enrollee, plus the full ordered roster id list
/// (used to default non-present students to a zero score).
#[derive(Debug, Default)]
pub struct RosterIndex {
    by_join_key: HashMap<String, Enrollee>,
    all_ids: Vec<i64>,
}

impl RosterIndex {
    pub fn build(roster: &[RosterEntry]) -> Self {
        let mut by_join_key = HashMap::with_capacity(roster.len());
        let mut all_ids = Vec::with_capacity(roster.len());

        for entry in roster {
            all_ids.push(entry.id);
            let Some(key) = join_key(entry) else {
                warn!(
                    "[Roster] Enrollee {} ({}) has no email or login id; will always be absent",
                    entry.id, entry.name
                );
                continue;
            };
            // First writer wins on a join-key collision; the duplicate can
            // never be matched and is reported absent.
            if by_join_key.contains_key(&key) {
                warn!("[Roster] Duplicate join key {:?} for enrollee {}", key, entry.id);
                continue;
            }
            by_join_key.insert(
                key,
                Enrollee {
                    remote_id: entry.id,
                    name: entry.name.clone(),
                },
            );
        }

        Self { by_join_key, all_ids }
    }

    pub fn lookup(&self, candidate: &str) -> Option<&Enrollee> {
        self.by_join_key.get(candidate)
    }

    /// Every roster remote id, in the order the LMS returned them.
    pub fn all_ids(&self) -> &[i64] {
        &self.all_ids
    }

    pub fn roster_len(&self) -> usize {
        self.all_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, name: &str, email: Option<&str>, login_id: Option<&str>) -> RosterEntry {
        RosterEntry {
            id,
            name: name.to_string(),
            email: email.map(String::from),
            login_id: login_id.map(String::from),
        }
    }

    #[test]
    fn email_local_part_wins_over_login() {
        let e = entry(1, "Ada", Some("22-101100@uni.edu"), Some("other@uni.edu"));
        assert_eq!(join_key(&e).as_deref(), Some("22-101100"));
    }

    #[test]
    fn falls_back_to_login_id() {
        let e = entry(2, "Alan", None, Some("22-101184@uni.edu"));
        assert_eq!(join_key(&e).as_deref(), Some("22-101184"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let e = entry(1, "Ada", Some(" 22-101100@uni.edu "), None);
        let first = join_key(&e);
        for _ in 0..10 {
            assert_eq!(join_key(&e), first);
        }
        assert_eq!(first.as_deref(), Some("22-101100"));
    }

    #[test]
    fn keyless_enrollees_are_indexed_absent_but_counted() {
        let roster = vec![
            entry(1, "Ada", Some("22-101100@uni.edu"), None),
            entry(2, "Ghost", None, None),
        ];
        let index = RosterIndex::build(&roster);
        assert_eq!(index.roster_len(), 2);
        assert_eq!(index.all_ids(), &[1, 2]);
        assert!(index.lookup("22-101100").is_some());
        // Enrollee 2 can never be matched.
        assert_eq!(
            index.lookup("22-101100").unwrap(),
            &Enrollee { remote_id: 1, name: "Ada".to_string() }
        );
    }

    #[test]
    fn empty_local_part_yields_no_key() {
        let e = entry(3, "Odd", Some("@uni.edu"), None);
        assert_eq!(join_key(&e), None);
    }
}
