use std::collections::BTreeSet;

/// Cities searched during one dashboard session.
///
/// Every successful search is appended; duplicates only collapse in
/// [`SessionHistory::snapshot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionHistory {
    searches: Vec<String>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, city: impl Into<String>) {
        self.searches.push(city.into());
    }

    /// Distinct city names, sorted for stable display.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.searches.iter().cloned().collect()
    }

    /// Number of recorded searches, duplicates included.
    pub fn len(&self) -> usize {
        self.searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.searches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse_in_snapshot_only() {
        let mut history = SessionHistory::new();
        for city in ["Paris", "Paris", "Lyon"] {
            history.record(city);
        }

        assert_eq!(history.len(), 3);

        let snapshot = history.snapshot();
        let expected: BTreeSet<String> = ["Paris", "Lyon"].iter().map(|s| s.to_string()).collect();
        assert_eq!(snapshot, expected);
    }

    #[test]
    fn new_history_is_empty() {
        let history = SessionHistory::new();
        assert!(history.is_empty());
        assert!(history.snapshot().is_empty());
    }

    #[test]
    fn names_are_not_normalized() {
        let mut history = SessionHistory::new();
        history.record("paris");
        history.record("Paris");

        assert_eq!(history.snapshot().len(), 2);
    }
}
