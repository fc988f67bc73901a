//! Sources of raw pin levels.

use core::convert::Infallible;
use embedded_hal::digital::{InputPin, PinState};

/// Errors a [`PinBank`] can return, loggable with either logging backend.
#[cfg(feature = "no-std")]
pub trait BankError: core::fmt::Debug + defmt::Format {}
#[cfg(feature = "no-std")]
impl<T: core::fmt::Debug + defmt::Format> BankError for T {}

/// Errors a [`PinBank`] can return, loggable with either logging backend.
#[cfg(not(feature = "no-std"))]
pub trait BankError: core::fmt::Debug {}
#[cfg(not(feature = "no-std"))]
impl<T: core::fmt::Debug> BankError for T {}

/// Reads the raw electrical level of pins by index.
pub trait PinBank {
    type Error: BankError;

    fn read_level(&mut self, index: u8) -> Result<PinState, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum InputPinBankError<E> {
    NoSuchPin(u8),
    Pin(E),
}

/// A bank of `N` hardware input pins.
pub struct InputPinBank<P, const N: usize> {
    pins: [P; N],
}

impl<P: InputPin, const N: usize> InputPinBank<P, N> {
    pub fn new(pins: [P; N]) -> Self {
        Self { pins }
    }

    pub fn release(self) -> [P; N] {
        self.pins
    }
}

impl<P: InputPin, const N: usize> PinBank for InputPinBank<P, N>
where
    InputPinBankError<P::Error>: BankError,
{
    type Error = InputPinBankError<P::Error>;

    fn read_level(&mut self, index: u8) -> Result<PinState, Self::Error> {
        let pin = self
            .pins
            .get_mut(usize::from(index))
            .ok_or(InputPinBankError::NoSuchPin(index))?;

        pin.is_high()
            .map(PinState::from)
            .map_err(InputPinBankError::Pin)
    }
}

/// Pin levels held in memory, for simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelBank<const N: usize> {
    levels: [PinState; N],
}

impl<const N: usize> LevelBank<N> {
    pub fn new(initial: PinState) -> Self {
        Self {
            levels: [initial; N],
        }
    }

    /// Sets the level of a pin, indices outside the bank are ignored.
    pub fn set(&mut self, index: u8, level: PinState) {
        if let Some(l) = self.levels.get_mut(usize::from(index)) {
            *l = level;
        }
    }

    pub fn get(&self, index: u8) -> Option<PinState> {
        self.levels.get(usize::from(index)).copied()
    }
}

impl<const N: usize> PinBank for LevelBank<N> {
    type Error = Infallible;

    fn read_level(&mut self, index: u8) -> Result<PinState, Self::Error> {
        // Unknown pins float low
        Ok(self.get(index).unwrap_or(PinState::Low))
    }
}
