//! Process-wide count of in-flight requests.

use parking_lot::Mutex;
use tracing::debug;

/// A point-in-time reading of the tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcurrencySnapshot {
    pub active: usize,
    pub peak: usize,
}

/// Counts requests between validation and response, and the highest count seen.
///
/// Both counters live behind one lock so the peak is exact. The tracker is an
/// observability signal only; it never rejects work.
#[derive(Debug, Default)]
pub struct ConcurrencyTracker {
    counts: Mutex<ConcurrencySnapshot>,
}

impl ConcurrencyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request entering the pipeline.
    ///
    /// The returned guard records the exit when dropped, so a caller that
    /// abandons its request is still counted out.
    pub fn enter(&self) -> InFlight<'_> {
        let snapshot = {
            let mut counts = self.counts.lock();
            counts.active += 1;
            counts.peak = counts.peak.max(counts.active);
            *counts
        };
        debug!(active = snapshot.active, peak = snapshot.peak, "request started");
        InFlight { tracker: self }
    }

    pub fn snapshot(&self) -> ConcurrencySnapshot {
        *self.counts.lock()
    }

    fn exit(&self) {
        let snapshot = {
            let mut counts = self.counts.lock();
            counts.active = counts.active.saturating_sub(1);
            *counts
        };
        debug!(active = snapshot.active, peak = snapshot.peak, "request finished");
    }
}

/// Guard for one tracked request.
#[must_use = "the request is counted out as soon as the guard is dropped"]
pub struct InFlight<'a> {
    tracker: &'a ConcurrencyTracker,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.tracker.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_enter_and_exit() {
        let tracker = ConcurrencyTracker::new();
        assert_eq!(tracker.snapshot(), ConcurrencySnapshot::default());

        let guard = tracker.enter();
        assert_eq!(tracker.snapshot(), ConcurrencySnapshot { active: 1, peak: 1 });

        drop(guard);
        assert_eq!(tracker.snapshot(), ConcurrencySnapshot { active: 0, peak: 1 });
    }

    #[test]
    fn test_peak_never_decreases() {
        let tracker = ConcurrencyTracker::new();
        let a = tracker.enter();
        let b = tracker.enter();
        let c = tracker.enter();
        assert_eq!(tracker.snapshot().peak, 3);

        drop(a);
        drop(b);
        let d = tracker.enter();
        assert_eq!(tracker.snapshot(), ConcurrencySnapshot { active: 2, peak: 3 });

        drop(c);
        drop(d);
        assert_eq!(tracker.snapshot(), ConcurrencySnapshot { active: 0, peak: 3 });
    }

    #[test]
    fn test_concurrent_threads_count_exactly() {
        let tracker = Arc::new(ConcurrencyTracker::new());
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = tracker.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    let _guard = tracker.enter();
                    // everyone is inside before anyone leaves
                    barrier.wait();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tracker.snapshot(), ConcurrencySnapshot { active: 0, peak: 8 });
    }
}
