use crate::{mode::PinMode, TimeMillis, DEFAULT_DEBOUNCE_WINDOW, DEFAULT_UPDATE_DELAY};
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Persisted settings of a single pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct PinConfig<const L: usize> {
    pub index: u8,
    pub name: String<L>,
    pub mode: PinMode,
}

/// Everything the configuration store keeps for a bank of `N` pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct DigitalInConfig<const N: usize, const L: usize> {
    /// Time between scans of the pin bank, zero selects the default.
    pub update_delay: TimeMillis,

    pub debounce_window: TimeMillis,

    pub pins: Vec<PinConfig<L>, N>,
}

impl<const N: usize, const L: usize> Default for DigitalInConfig<N, L> {
    fn default() -> Self {
        Self {
            update_delay: DEFAULT_UPDATE_DELAY,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            pins: Vec::new(),
        }
    }
}
