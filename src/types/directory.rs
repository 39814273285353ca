use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of the `get-users` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDirectoryEntry {
    /// Stable numeric identifier assigned by the backend.
    pub id: i64,

    /// Display name.
    pub username: String,
}

impl UserDirectoryEntry {
    /// Create a new entry.
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Mapping from user id to username, built fresh for every `get-users` call.
///
/// Iteration is in ascending id order.  A repeated id keeps the last entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    users: BTreeMap<i64, String>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, id: i64, username: impl Into<String>) {
        self.users.insert(id, username.into());
    }

    /// Look up the username for `id`.
    pub fn get(&self, id: i64) -> Option<&str> {
        self.users.get(&id).map(String::as_str)
    }

    /// Number of users listed.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// True if nobody else is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Iterate over `(id, username)` in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.users.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<i64, String> {
        &self.users
    }
}

impl FromIterator<UserDirectoryEntry> for Directory {
    fn from_iter<I: IntoIterator<Item = UserDirectoryEntry>>(iter: I) -> Self {
        let mut directory = Directory::new();
        for entry in iter {
            directory.insert(entry.id, entry.username);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_entries() {
        let directory: Directory = vec![
            UserDirectoryEntry::new(2, "carol"),
            UserDirectoryEntry::new(1, "bob"),
        ]
        .into_iter()
        .collect();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.get(1), Some("bob"));
        assert_eq!(directory.get(2), Some("carol"));
        assert_eq!(directory.get(3), None);
        let ids: Vec<i64> = directory.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn repeated_id_keeps_last() {
        let directory: Directory = vec![
            UserDirectoryEntry::new(1, "bob"),
            UserDirectoryEntry::new(1, "robert"),
        ]
        .into_iter()
        .collect();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.get(1), Some("robert"));
    }

    #[test]
    fn empty_directory() {
        let directory = Directory::new();
        assert!(directory.is_empty());
        assert_eq!(directory.iter().count(), 0);
    }
}
