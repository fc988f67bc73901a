//! Two-reading debounce with a hold window.
//!
//! A raw level that differs from the accepted one becomes a pending candidate. The candidate
//! is accepted once it has been observed again after the window has elapsed, and is dropped if
//! the level reverts first.

use crate::TimeMillis;
use embedded_hal::digital::PinState;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum DebounceState {
    #[default]
    Stable,
    Pending {
        level: PinState,
        since: TimeMillis,
    },
}

/// Outcome of a single debounce step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Step {
    /// Raw level matches the accepted level.
    Unchanged,

    /// A new candidate was recorded.
    Started,

    /// The candidate is still inside its window.
    Waiting,

    /// The candidate was replaced by a different level.
    Restarted,

    /// The raw level reverted before the window elapsed, the candidate was noise.
    Rejected,

    /// The candidate held for the full window.
    Accepted(PinState),
}

/// Advances the debounce state for one sample.
///
/// `basis` is the raw level the current stable state was accepted from.
pub fn step(
    state: DebounceState,
    basis: PinState,
    raw: PinState,
    now: TimeMillis,
    window: TimeMillis,
) -> (DebounceState, Step) {
    match state {
        DebounceState::Stable if raw == basis => (DebounceState::Stable, Step::Unchanged),
        DebounceState::Stable => (
            DebounceState::Pending {
                level: raw,
                since: now,
            },
            Step::Started,
        ),
        DebounceState::Pending { level, since } if raw == level => {
            if now.wrapping_sub(since) >= window {
                (DebounceState::Stable, Step::Accepted(level))
            } else {
                (state, Step::Waiting)
            }
        }
        DebounceState::Pending { .. } if raw == basis => (DebounceState::Stable, Step::Rejected),
        DebounceState::Pending { .. } => (
            DebounceState::Pending {
                level: raw,
                since: now,
            },
            Step::Restarted,
        ),
    }
}
