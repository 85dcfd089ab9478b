//! In-memory deal lifecycle registry.
//!
//! The tracker is the sole authority on whether a deal is new, active, or
//! finished. It is volatile: a restart loses entries, and re-tracking is
//! driven from remote fields (see the scanner's resumption handling).

use crate::domain::DealId;
use std::collections::HashMap;

/// Lifecycle phase of a tracked deal.
///
/// Untracked ids are implicitly Unseen (never entered) or Completed
/// (entered and later removed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealPhase {
    /// Eligible, but the remote start marker has not been confirmed yet.
    PendingStart,
    /// Price recovery in progress.
    Active,
}

/// Registry of deals currently under management.
///
/// Single-threaded cooperative model: all mutations happen synchronously
/// within one polling cycle, so no locking is needed.
#[derive(Debug, Default)]
pub struct DealTracker {
    entries: HashMap<DealId, DealPhase>,
}

impl DealTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tracked(&self, deal: &DealId) -> bool {
        self.entries.contains_key(deal)
    }

    pub fn phase(&self, deal: &DealId) -> Option<DealPhase> {
        self.entries.get(deal).copied()
    }

    /// Begin tracking a deal whose remote start is not yet confirmed.
    /// A no-op if the deal is already tracked: tracking never resets.
    pub fn track_pending(&mut self, deal: DealId) {
        self.entries.entry(deal).or_insert(DealPhase::PendingStart);
    }

    /// Begin (or promote to) active tracking.
    pub fn mark_active(&mut self, deal: DealId) {
        self.entries.insert(deal, DealPhase::Active);
    }

    /// Remove a completed deal. Removal is terminal for this process.
    pub fn untrack(&mut self, deal: &DealId) {
        self.entries.remove(deal);
    }

    /// Number of deals currently in the Active phase.
    pub fn active_count(&self) -> usize {
        self.entries
            .values()
            .filter(|p| **p == DealPhase::Active)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(n: u32) -> DealId {
        DealId::new(format!("gid://shop/Metaobject/{}", n))
    }

    #[test]
    fn test_untracked_is_unseen() {
        let tracker = DealTracker::new();
        assert!(!tracker.is_tracked(&deal(1)));
        assert_eq!(tracker.phase(&deal(1)), None);
    }

    #[test]
    fn test_pending_then_active() {
        let mut tracker = DealTracker::new();
        tracker.track_pending(deal(1));
        assert_eq!(tracker.phase(&deal(1)), Some(DealPhase::PendingStart));
        assert_eq!(tracker.active_count(), 0);

        tracker.mark_active(deal(1));
        assert_eq!(tracker.phase(&deal(1)), Some(DealPhase::Active));
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn test_track_pending_never_demotes_active() {
        let mut tracker = DealTracker::new();
        tracker.mark_active(deal(1));
        tracker.track_pending(deal(1));
        assert_eq!(tracker.phase(&deal(1)), Some(DealPhase::Active));
    }

    #[test]
    fn test_untrack_is_terminal() {
        let mut tracker = DealTracker::new();
        tracker.mark_active(deal(1));
        tracker.untrack(&deal(1));
        assert!(!tracker.is_tracked(&deal(1)));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_one_entry_per_deal() {
        let mut tracker = DealTracker::new();
        tracker.track_pending(deal(1));
        tracker.track_pending(deal(1));
        tracker.mark_active(deal(2));
        assert_eq!(tracker.active_count(), 1);
        assert!(tracker.is_tracked(&deal(1)));
        assert!(tracker.is_tracked(&deal(2)));
    }
}
