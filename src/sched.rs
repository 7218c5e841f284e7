//! Scheduled continuations
//!
//! Engines never sleep: anything that has to happen "later" is pushed onto a
//! [`DelayQueue`] and fired from the owner's `tick`. Tests fast-forward by
//! ticking with a large elapsed time.

/// A pending item with its due time
#[derive(Debug, Clone)]
struct Scheduled<T> {
    due_ms: u64,
    seq: u64,
    item: T,
}

/// Delay queue on a virtual millisecond clock
#[derive(Debug, Clone)]
pub struct DelayQueue<T> {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for DelayQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Virtual time elapsed since creation
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `item` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u32, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms + u64::from(delay_ms),
            seq,
            item,
        });
    }

    /// Milliseconds until the earliest item is due
    pub fn next_due_in(&self) -> Option<u32> {
        self.pending
            .iter()
            .map(|s| s.due_ms.saturating_sub(self.now_ms))
            .min()
            .map(|d| d.min(u64::from(u32::MAX)) as u32)
    }

    /// Pop the earliest item if it falls due within `budget_ms`.
    ///
    /// The clock advances to the item's due time; the returned `u32` is how
    /// much of the budget that consumed. Items due at the same time fire in
    /// scheduling order.
    pub fn pop_due(&mut self, budget_ms: u32) -> Option<(u32, T)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| (s.due_ms, s.seq))
            .map(|(i, _)| i)?;
        let wait = self.pending[idx].due_ms.saturating_sub(self.now_ms);
        if wait > u64::from(budget_ms) {
            return None;
        }
        let scheduled = self.pending.swap_remove(idx);
        self.now_ms = self.now_ms.max(scheduled.due_ms);
        Some((wait as u32, scheduled.item))
    }

    /// Advance the clock without firing anything
    pub fn advance(&mut self, elapsed_ms: u32) {
        self.now_ms += u64::from(elapsed_ms);
    }

    /// Drop every pending item
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Fires once per elapsed interval
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval_ms: f64,
    accumulated_ms: f64,
}

impl IntervalTimer {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            accumulated_ms: 0.0,
        }
    }

    /// Advance and return how many intervals completed
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.accumulated_ms += elapsed_ms;
        let mut fired = 0;
        while self.accumulated_ms >= self.interval_ms {
            self.accumulated_ms -= self.interval_ms;
            fired += 1;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_fire_in_due_order() {
        let mut q = DelayQueue::new();
        q.schedule(200, "late");
        q.schedule(100, "early");
        q.schedule(100, "early-second");

        assert_eq!(q.pop_due(50), None);
        assert_eq!(q.pop_due(100), Some((100, "early")));
        assert_eq!(q.pop_due(0), Some((0, "early-second")));
        assert_eq!(q.pop_due(100), Some((100, "late")));
        assert!(q.is_empty());
        assert_eq!(q.now_ms(), 200);
    }

    #[test]
    fn test_schedule_is_relative_to_virtual_now() {
        let mut q = DelayQueue::new();
        q.advance(1000);
        q.schedule(150, 1);
        assert_eq!(q.next_due_in(), Some(150));
        q.advance(100);
        assert_eq!(q.next_due_in(), Some(50));
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut q = DelayQueue::new();
        q.schedule(10, ());
        q.clear();
        assert_eq!(q.pop_due(u32::MAX), None);
    }

    #[test]
    fn test_interval_timer_counts_intervals() {
        let mut t = IntervalTimer::new(125.0);
        assert_eq!(t.advance(100.0), 0);
        assert_eq!(t.advance(30.0), 1);
        assert_eq!(t.advance(250.0), 2);
        t.reset();
        assert_eq!(t.advance(124.0), 0);
    }
}
