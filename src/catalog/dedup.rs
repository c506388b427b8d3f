//! Per-build duplicate suppression

use crate::types::{CandidateItem, SourceId};
use std::collections::HashSet;

/// Ids already admitted during one build
///
/// An id is marked seen when its candidate is admitted, not when it validates,
/// so a candidate that failed validation is never dispatched again.
#[derive(Debug, Default)]
pub struct SeenIds {
    seen: HashSet<SourceId>,
}

impl SeenIds {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only candidates whose id has not been seen, marking them seen
    ///
    /// Repeats inside `items` itself are dropped too. Order is preserved.
    pub fn admit(&mut self, items: Vec<CandidateItem>) -> Vec<CandidateItem> {
        items
            .into_iter()
            .filter(|item| self.seen.insert(item.source_id))
            .collect()
    }

    /// Whether `id` has been admitted
    pub fn contains(&self, id: SourceId) -> bool {
        self.seen.contains(&id)
    }

    /// Number of distinct ids admitted so far
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True when nothing has been admitted
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[CandidateItem]) -> Vec<u64> {
        items.iter().map(|i| i.source_id.get()).collect()
    }

    #[test]
    fn test_admit_drops_ids_seen_on_earlier_pages() {
        let mut seen = SeenIds::new();
        let first = seen.admit(vec![CandidateItem::new(1u64, "a"), CandidateItem::new(2u64, "b")]);
        let second = seen.admit(vec![CandidateItem::new(2u64, "b"), CandidateItem::new(3u64, "c")]);

        assert_eq!(ids(&first), vec![1, 2]);
        assert_eq!(ids(&second), vec![3]);
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_admit_drops_repeats_within_a_page() {
        let mut seen = SeenIds::new();
        let admitted = seen.admit(vec![
            CandidateItem::new(4u64, "first"),
            CandidateItem::new(4u64, "again"),
            CandidateItem::new(5u64, "other"),
        ]);

        assert_eq!(ids(&admitted), vec![4, 5]);
        assert_eq!(admitted[0].title.as_deref(), Some("first"));
    }

    #[test]
    fn test_fully_duplicate_page_admits_nothing() {
        let mut seen = SeenIds::new();
        seen.admit(vec![CandidateItem::new(1u64, "a")]);
        assert!(seen.admit(vec![CandidateItem::new(1u64, "a")]).is_empty());
        assert!(seen.contains(SourceId(1)));
        assert!(!seen.contains(SourceId(2)));
    }
}
