//! Per-source credential and name assignment
//!
//! The command line can supply lists of usernames, passwords and names that
//! are matched up with the input files by position. When a list is shorter
//! than the number of files, its last value is reused for every remaining
//! file. Each list runs out independently of the others.

use crate::error::{Error, Result};

/// CLI-supplied lists, validated once before any source is processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliAssignments {
    usernames: Vec<String>,
    passwords: Vec<String>,
    names: Vec<String>,
}

/// What one source gets from the command line. `None` means "use the
/// source's own value".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialAssignment {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl CliAssignments {
    /// Validate and capture the CLI lists.
    ///
    /// When both credential lists are non-empty they must be the same length.
    pub fn new(usernames: Vec<String>, passwords: Vec<String>, names: Vec<String>) -> Result<Self> {
        if !usernames.is_empty() && !passwords.is_empty() && usernames.len() != passwords.len() {
            return Err(Error::CredentialListMismatch {
                usernames: usernames.len(),
                passwords: passwords.len(),
            });
        }
        Ok(Self {
            usernames,
            passwords,
            names,
        })
    }

    /// True when the command line supplies credentials for every source.
    pub fn credentials_active(&self) -> bool {
        !self.usernames.is_empty() && !self.passwords.is_empty()
    }

    /// Assignment for the source at `index`.
    pub fn resolve_for_index(&self, index: usize) -> CredentialAssignment {
        CredentialAssignment {
            username: pick(&self.usernames, index),
            password: pick(&self.passwords, index),
            name: pick(&self.names, index),
        }
    }
}

/// Element at `min(index, len - 1)`, or `None` for an empty list.
pub fn pick(values: &[String], index: usize) -> Option<String> {
    values.get(index).or_else(|| values.last()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mismatched_credential_lists_rejected() {
        let result = CliAssignments::new(strings(&["a", "b"]), strings(&["x"]), vec![]);
        assert!(matches!(
            result,
            Err(Error::CredentialListMismatch {
                usernames: 2,
                passwords: 1
            })
        ));
    }

    #[test]
    fn test_one_sided_lists_are_not_a_mismatch() {
        let assignments = CliAssignments::new(strings(&["a", "b"]), vec![], vec![]).unwrap();
        assert!(!assignments.credentials_active());
        let first = assignments.resolve_for_index(0);
        assert_eq!(first.username.as_deref(), Some("a"));
        assert_eq!(first.password, None);
    }

    #[test]
    fn test_single_pair_reused_for_every_source() {
        let assignments =
            CliAssignments::new(strings(&["admin"]), strings(&["secret"]), vec![]).unwrap();
        assert!(assignments.credentials_active());
        for index in 0..3 {
            let assignment = assignments.resolve_for_index(index);
            assert_eq!(assignment.username.as_deref(), Some("admin"));
            assert_eq!(assignment.password.as_deref(), Some("secret"));
            assert_eq!(assignment.name, None);
        }
    }

    #[test]
    fn test_lists_run_out_independently() {
        let assignments = CliAssignments::new(
            strings(&["u1", "u2", "u3"]),
            strings(&["p1", "p2", "p3"]),
            strings(&["east"]),
        )
        .unwrap();
        let third = assignments.resolve_for_index(2);
        assert_eq!(third.username.as_deref(), Some("u3"));
        assert_eq!(third.password.as_deref(), Some("p3"));
        assert_eq!(third.name.as_deref(), Some("east"));

        let fifth = assignments.resolve_for_index(4);
        assert_eq!(fifth.username.as_deref(), Some("u3"));
        assert_eq!(fifth.name.as_deref(), Some("east"));
    }

    proptest! {
        /// Property: past the end of a non-empty list, the last value is reused
        #[test]
        fn last_value_is_reused(
            values in prop::collection::vec("[a-z]{1,8}", 1..6),
            extra in 0usize..10,
        ) {
            let index = values.len() + extra;
            prop_assert_eq!(pick(&values, index), values.last().cloned());
        }

        /// Property: within range, the value at the index is returned
        #[test]
        fn in_range_index_is_used(
            values in prop::collection::vec("[a-z]{1,8}", 1..6),
            seed in 0usize..100,
        ) {
            let index = seed % values.len();
            prop_assert_eq!(pick(&values, index), Some(values[index].clone()));
        }

        /// Property: an empty list never yields a value
        #[test]
        fn empty_list_is_always_absent(index in 0usize..1000) {
            let assignments = CliAssignments::new(vec![], vec![], vec![]).unwrap();
            prop_assert_eq!(assignments.resolve_for_index(index), CredentialAssignment::default());
        }
    }
}
