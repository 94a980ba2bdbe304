//! Per-user prediction history.
//!
//! Serving layers keep an append-only log of what each user's uploads were
//! classified as. Entries are only recorded for successful predictions; a
//! failed call leaves the history untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One recorded prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Filename of the uploaded image.
    pub filename: String,
    /// Label the classifier predicted.
    pub predicted_label: String,
    /// Confidence score in [0, 1].
    pub confidence: f32,
}

/// An append-only prediction log keyed by user.
///
/// Growth is unbounded; retention is the owner's concern.
#[derive(Debug, Clone, Default)]
pub struct PredictionHistory {
    entries: HashMap<String, Vec<HistoryEntry>>,
}

impl PredictionHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the given user's log.
    pub fn record(&mut self, user: impl Into<String>, entry: HistoryEntry) {
        self.entries.entry(user.into()).or_default().push(entry);
    }

    /// All entries for the given user, oldest first. Empty for unknown users.
    pub fn entries(&self, user: &str) -> &[HistoryEntry] {
        self.entries.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of users with at least one entry.
    pub fn user_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filename: &str, label: &str, confidence: f32) -> HistoryEntry {
        HistoryEntry {
            filename: filename.to_string(),
            predicted_label: label.to_string(),
            confidence,
        }
    }

    #[test]
    fn appends_preserve_order() {
        let mut history = PredictionHistory::new();
        history.record("alice", entry("a.jpg", "pizza", 0.92));
        history.record("alice", entry("b.jpg", "burger", 0.55));

        let entries = history.entries("alice");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].predicted_label, "pizza");
        assert_eq!(entries[1].predicted_label, "burger");
    }

    #[test]
    fn unknown_user_has_no_entries() {
        let history = PredictionHistory::new();
        assert!(history.entries("nobody").is_empty());
    }

    #[test]
    fn users_are_tracked_independently() {
        let mut history = PredictionHistory::new();
        history.record("alice", entry("a.jpg", "pizza", 0.9));
        history.record("bob", entry("b.jpg", "Dosa", 0.8));

        assert_eq!(history.user_count(), 2);
        assert_eq!(history.entries("bob").len(), 1);
    }
}
