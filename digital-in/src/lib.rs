//! Cooperative polling of a bank of digital inputs.
//!
//! A [`DigitalIn`] owns a fixed table of pin records. Each call to [`DigitalIn::handle`] samples
//! every pin through a [`PinBank`], runs the per-pin debounce state machine selected by the pin's
//! [`PinMode`], and hands any pin whose logical state changed to a [`StateReporter`].
//!
//! Persistence of [`DigitalInConfig`] and publishing of reported changes are left to the caller.

#![cfg_attr(feature = "no-std", no_std)]

pub mod bank;
mod changed;
pub mod config;
pub mod debounce;
mod error;
pub mod mode;
mod name_index;
pub mod pin;
pub mod report;
mod scheduler;
pub mod table;


pub use self::{
    bank::{BankError, InputPinBank, LevelBank, PinBank},
    changed::{checked_set, Changed},
    config::{DigitalInConfig, PinConfig},
    error::{Error, Result},
    mode::{ModePolicy, ModeRegistry, PinMode},
    pin::DigitalPinRecord,
    report::{ChangeQueue, PinChange, PinEvent, QueueCounters, StateReporter},
    scheduler::DigitalIn,
    table::DigitalPinTable,
};
pub use embedded_hal::digital::PinState;

/// Milliseconds from a free running, wrapping, monotonic counter.
pub type TimeMillis = u32;

/// Capacity of a pin name, in bytes.
pub const DEFAULT_NAME_LEN: usize = 16;

/// Time a debounced level must hold before it is accepted.
pub const DEFAULT_DEBOUNCE_WINDOW: TimeMillis = 50;

/// Time between full scans of the pin bank.
pub const DEFAULT_UPDATE_DELAY: TimeMillis = 10;
