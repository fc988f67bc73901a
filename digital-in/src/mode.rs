use crate::{TimeMillis, DEFAULT_DEBOUNCE_WINDOW};
use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// How a pin's raw level is turned into its logical state.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    FromRepr,
    IntoStaticStr,
)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PinMode {
    /// Logical state follows every sample of the raw level.
    Raw = 0,

    /// Logical state follows the raw level once it has held for the debounce window.
    #[default]
    Debounced = 1,

    /// As [`PinMode::Debounced`], but a low level reads as active.
    PullupInverted = 2,

    /// Each debounced press (transition to high) flips the logical state.
    Toggle = 3,
}

impl TryFrom<u8> for PinMode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_repr(value).ok_or(value)
    }
}

impl From<PinMode> for u8 {
    fn from(mode: PinMode) -> Self {
        mode as u8
    }
}

/// Sampling parameters derived from a [`PinMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct ModePolicy {
    pub invert: bool,

    /// `None` when every sample is accepted immediately.
    pub debounce_window: Option<TimeMillis>,

    pub toggle: bool,
}

impl ModePolicy {
    /// Whether `level` counts as active under this policy.
    pub fn is_active(&self, level: PinState) -> bool {
        bool::from(level) != self.invert
    }
}

/// Maps modes to their sampling policy for a given debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub struct ModeRegistry {
    debounce_window: TimeMillis,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

impl ModeRegistry {
    pub fn new(debounce_window: TimeMillis) -> Self {
        Self { debounce_window }
    }

    pub fn debounce_window(&self) -> TimeMillis {
        self.debounce_window
    }

    pub fn effect_for(&self, mode: PinMode) -> ModePolicy {
        match mode {
            PinMode::Raw => ModePolicy {
                invert: false,
                debounce_window: None,
                toggle: false,
            },
            PinMode::Debounced => ModePolicy {
                invert: false,
                debounce_window: Some(self.debounce_window),
                toggle: false,
            },
            PinMode::PullupInverted => ModePolicy {
                invert: true,
                debounce_window: Some(self.debounce_window),
                toggle: false,
            },
            PinMode::Toggle => ModePolicy {
                invert: false,
                debounce_window: Some(self.debounce_window),
                toggle: true,
            },
        }
    }
}
