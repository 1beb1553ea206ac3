//! Per-neuron delayed-delivery queue

use std::collections::VecDeque;

/// Synaptic input waiting for its delivery tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingInput {
    /// Tick on or after which the input is delivered
    pub delivery_tick: u64,
    /// Synaptic weight added to the target's neighbor input
    pub weight: f64,
}

/// FIFO of pending inputs for one target neuron
///
/// Entries must be pushed in non-decreasing `delivery_tick` order. With a
/// single network-wide delay this holds by construction, which lets
/// [`DelayQueue::drain_due`] stop at the first entry that is not yet due
/// instead of keeping a priority queue.
#[derive(Debug, Clone, Default)]
pub struct DelayQueue {
    entries: VecDeque<PendingInput>,
}

impl DelayQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an input for delivery at `delivery_tick`
    pub fn push(&mut self, delivery_tick: u64, weight: f64) {
        debug_assert!(
            self.entries
                .back()
                .map_or(true, |last| last.delivery_tick <= delivery_tick),
            "delivery ticks must be non-decreasing"
        );
        self.entries.push_back(PendingInput {
            delivery_tick,
            weight,
        });
    }

    /// Pop every entry due at or before `now` and return the summed weight
    pub fn drain_due(&mut self, now: u64) -> f64 {
        let mut total = 0.0;
        while let Some(front) = self.entries.front() {
            if front.delivery_tick > now {
                break;
            }
            total += front.weight;
            self.entries.pop_front();
        }
        total
    }

    /// Delivery tick of the oldest pending entry
    pub fn next_delivery(&self) -> Option<u64> {
        self.entries.front().map(|entry| entry.delivery_tick)
    }

    /// Number of pending entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate pending entries in delivery order
    pub fn iter(&self) -> impl Iterator<Item = &PendingInput> {
        self.entries.iter()
    }

    /// Drop every pending entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_stops_at_future_entry() {
        let mut queue = DelayQueue::new();
        queue.push(5, 0.25);
        queue.push(5, 0.5);
        queue.push(7, 1.0);

        assert_eq!(queue.drain_due(4), 0.0);
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain_due(5), 0.75);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_delivery(), Some(7));

        assert_eq!(queue.drain_due(6), 0.0);
        assert_eq!(queue.drain_due(10), 1.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overdue_entries_are_drained() {
        let mut queue = DelayQueue::new();
        queue.push(1, -0.5);
        queue.push(2, 0.5);
        assert_eq!(queue.drain_due(3), 0.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut queue = DelayQueue::new();
        queue.push(1, 1.0);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.next_delivery(), None);
    }
}
