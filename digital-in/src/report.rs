//! Hand-off of confirmed state changes to the reporting layer.

use crate::{mode::PinMode, pin::DigitalPinRecord, TimeMillis};
use heapless::{Deque, String};
use serde::{Deserialize, Serialize};

/// A confirmed change of a pin's logical state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct PinChange<'a> {
    pub index: u8,
    pub name: &'a str,
    pub mode: PinMode,
    pub state: bool,
    pub time: TimeMillis,
}

impl<'a, const L: usize> From<&'a DigitalPinRecord<L>> for PinChange<'a> {
    fn from(pin: &'a DigitalPinRecord<L>) -> Self {
        Self {
            index: pin.index(),
            name: pin.name(),
            mode: pin.mode(),
            state: pin.state(),
            time: pin.last_change().unwrap_or_default(),
        }
    }
}

/// Receives pin state changes.
///
/// Called from within the polling loop, a slow implementation delays the next scan.
pub trait StateReporter {
    fn report(&mut self, change: &PinChange<'_>);
}

impl<F: FnMut(&PinChange<'_>)> StateReporter for F {
    fn report(&mut self, change: &PinChange<'_>) {
        self(change)
    }
}

/// Owned copy of a [`PinChange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct PinEvent<const L: usize> {
    pub index: u8,
    pub name: String<L>,
    pub mode: PinMode,
    pub state: bool,
    pub time: TimeMillis,
}

impl<const L: usize> From<&PinChange<'_>> for PinEvent<L> {
    fn from(change: &PinChange<'_>) -> Self {
        let mut name = String::new();
        for c in change.name.chars() {
            if name.push(c).is_err() {
                break;
            }
        }

        Self {
            index: change.index,
            name,
            mode: change.mode,
            state: change.state,
            time: change.time,
        }
    }
}

/// Bounded backlog of pin events for a consumer that drains them at its own pace.
///
/// Holds at most `Q` events. Once full, each new event evicts the oldest one.
pub struct ChangeQueue<const Q: usize, const L: usize> {
    events: Deque<PinEvent<L>, Q>,
    counters: QueueCounters,
}

impl<const Q: usize, const L: usize> Default for ChangeQueue<Q, L> {
    fn default() -> Self {
        Self {
            events: Deque::new(),
            counters: QueueCounters::default(),
        }
    }
}

impl<const Q: usize, const L: usize> ChangeQueue<Q, L> {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events waiting to be drained.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn counters(&self) -> QueueCounters {
        self.counters
    }

    pub fn push(&mut self, event: PinEvent<L>) {
        let event = match self.events.push_back(event) {
            Ok(()) => None,
            Err(event) => Some(event),
        };

        // Full, make room at the front
        if let Some(event) = event {
            let _ = self.events.pop_front();
            self.counters.dropped = self.counters.dropped.wrapping_add(1);
            let _ = self.events.push_back(event);
        }

        self.counters.queued = self.counters.queued.wrapping_add(1);
    }

    /// Takes the oldest event.
    pub fn pop(&mut self) -> Option<PinEvent<L>> {
        self.events.pop_front()
    }

    /// Oldest first, leaving the queue untouched.
    pub fn iter(&self) -> impl Iterator<Item = &PinEvent<L>> {
        self.events.iter()
    }
}

impl<const Q: usize, const L: usize> StateReporter for ChangeQueue<Q, L> {
    fn report(&mut self, change: &PinChange<'_>) {
        self.push(change.into());
    }
}

/// Running counts kept by a [`ChangeQueue`], both wrap on overflow.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct QueueCounters {
    /// Every event ever pushed, including those later evicted.
    pub queued: usize,

    /// Events evicted unread to make room.
    pub dropped: usize,
}

#[cfg(test)]
mod test {
    use super::*;

    fn change(index: u8, state: bool) -> PinChange<'static> {
        PinChange {
            index,
            name: "door",
            mode: PinMode::Debounced,
            state,
            time: 100,
        }
    }

    #[test]
    fn queue_new() {
        let queue: ChangeQueue<4, 16> = ChangeQueue::default();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.counters(), QueueCounters::default());
    }

    #[test]
    fn queue_report() {
        let mut queue: ChangeQueue<4, 16> = ChangeQueue::default();
        queue.report(&change(1, true));
        queue.report(&change(2, false));

        assert_eq!(queue.len(), 2);
        let event = queue.pop().unwrap();
        assert_eq!(event.index, 1);
        assert_eq!(event.name, "door");
        assert!(event.state);
        assert_eq!(event.time, 100);

        assert_eq!(queue.pop().unwrap().index, 2);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn queue_discards_oldest() {
        let mut queue: ChangeQueue<2, 16> = ChangeQueue::default();
        queue.report(&change(1, true));
        queue.report(&change(2, true));
        queue.report(&change(3, true));

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.counters(),
            QueueCounters {
                queued: 3,
                dropped: 1
            }
        );
        let indices: std::vec::Vec<u8> = queue.iter().map(|e| e.index).collect();
        assert_eq!(indices, [2, 3]);
    }

    #[test]
    fn event_name_truncated() {
        let event: PinEvent<2> = (&change(0, false)).into();
        assert_eq!(event.name, "do");
    }

    fn recorder<F: FnMut(&PinChange<'_>)>(f: F) -> F {
        f
    }

    #[test]
    fn closure_reporter() {
        let mut seen = std::vec::Vec::new();
        let mut reporter = recorder(|c| seen.push((c.index, c.state)));
        reporter.report(&change(4, true));
        assert_eq!(seen, [(4, true)]);
    }
}
