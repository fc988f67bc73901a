use crate::{
    bank::PinBank,
    changed::Changed,
    config::DigitalInConfig,
    error::{Error, Result},
    mode::{ModeRegistry, PinMode},
    pin::DigitalPinRecord,
    report::{PinChange, StateReporter},
    table::DigitalPinTable,
    TimeMillis, DEFAULT_NAME_LEN, DEFAULT_UPDATE_DELAY,
};
use heapless::{String, Vec};

#[cfg(feature = "no-std")]
use defmt::{debug, info, warn};
#[cfg(feature = "std")]
use log::{debug, info, warn};

/// Polls a bank of `N` digital inputs and reports changes of their logical state.
pub struct DigitalIn<B, R, const N: usize, const L: usize = DEFAULT_NAME_LEN> {
    bank: B,
    reporter: R,
    table: DigitalPinTable<N, L>,
    registry: ModeRegistry,
    update_delay: TimeMillis,
    last_run: Option<TimeMillis>,
}

impl<B: PinBank, R: StateReporter, const N: usize, const L: usize> DigitalIn<B, R, N, L> {
    pub fn new(bank: B, reporter: R) -> Self {
        Self {
            bank,
            reporter,
            table: DigitalPinTable::new(),
            registry: ModeRegistry::default(),
            update_delay: DEFAULT_UPDATE_DELAY,
            last_run: None,
        }
    }

    /// Loads persisted settings and initializes every pin.
    ///
    /// Returns [`Changed::Yes`] when defaults were filled in and the configuration should be
    /// saved, see [`DigitalIn::config`].
    pub fn setup(&mut self, config: &DigitalInConfig<N, L>) -> Result<Changed> {
        if N > usize::from(u8::MAX) + 1 {
            return Err(Error::TooManyPins);
        }

        let mut changed = Changed::No;

        if config.update_delay == 0 {
            self.update_delay = DEFAULT_UPDATE_DELAY;
            changed = Changed::Yes;
        } else {
            self.update_delay = config.update_delay;
        }
        self.registry = ModeRegistry::new(config.debounce_window);

        changed = changed.or(self.table.apply_config(&config.pins)?);
        for index in Self::indices() {
            changed = changed.or(self.table.initialize_pin(index));
        }

        // Default names may clash with configured ones
        for pin in self.table.iter() {
            if self.table.find(pin.name()) != Some(pin.index()) {
                return Err(Error::DuplicateName(pin.index()));
            }
        }

        self.last_run = None;

        info!(
            "Digital inputs ready, {} pins, update delay {} ms, debounce window {} ms",
            N,
            self.update_delay,
            self.registry.debounce_window()
        );

        Ok(changed)
    }

    /// Runs one scan of all pins if the update delay has elapsed since the last one.
    ///
    /// Every pin is sampled before any change is reported. Returns the number of pins reported.
    pub fn handle(&mut self, now: TimeMillis) -> usize {
        if let Some(last) = self.last_run {
            if now.wrapping_sub(last) < self.update_delay {
                return 0;
            }
        }

        let mut changed: Vec<u8, N> = Vec::new();
        for index in Self::indices() {
            if self.check_state(index, now).is_yes() {
                // At most one entry per pin
                let _ = changed.push(index);
            }
        }
        self.last_run = Some(now);

        for &index in &changed {
            self.update(index);
        }

        changed.len()
    }

    /// (Re)initializes a single pin, returning [`Changed::Yes`] if the configuration needs saving.
    pub fn initialize_pin(&mut self, index: u8) -> Changed {
        self.table.initialize_pin(index)
    }

    /// Samples one pin and advances its debounce state.
    pub fn check_state(&mut self, index: u8, now: TimeMillis) -> Changed {
        let Some(mode) = self.table.mode(index) else {
            warn!("Cannot check pin {}, index out of range", index);
            return Changed::No;
        };
        let policy = self.registry.effect_for(mode);

        match self.bank.read_level(index) {
            Ok(raw) => self.table.sample(index, raw, now, &policy),
            Err(e) => {
                warn!("Failed to read pin {}: {:?}", index, e);
                Changed::No
            }
        }
    }

    /// Hands the current state of a pin to the reporter.
    pub fn update(&mut self, index: u8) {
        match self.table.get(index) {
            Some(pin) => {
                debug!("Reporting pin {} ({}) state {}", index, pin.name(), pin.state());
                self.reporter.report(&PinChange::from(pin));
            }
            None => warn!("Cannot report pin {}, index out of range", index),
        }
    }

    /// Sets the time between scans, zero is rejected.
    pub fn set_update_delay(&mut self, delay: TimeMillis) -> Result<()> {
        if delay == 0 {
            return Err(Error::InvalidDelay);
        }
        self.update_delay = delay;
        Ok(())
    }

    pub fn update_delay(&self) -> TimeMillis {
        self.update_delay
    }

    pub fn mode(&self, index: u8) -> Option<PinMode> {
        self.table.mode(index)
    }

    /// Sets the mode of the named pin, returns `false` if no pin has that name.
    ///
    /// A successful change alters the configuration, which the caller should persist.
    pub fn set_mode(&mut self, name: &str, mode: PinMode) -> bool {
        self.table.set_mode(name, mode)
    }

    /// Copies the name of a pin into `dst`, which is left empty for an invalid index.
    pub fn pin_name(&self, index: u8, dst: &mut String<L>) {
        self.table.name_into(index, dst)
    }

    pub fn set_pin_name(&mut self, index: u8, name: &str) -> Result<Changed> {
        self.table.set_name(index, name)
    }

    pub fn pin(&self, index: u8) -> Option<&DigitalPinRecord<L>> {
        self.table.get(index)
    }

    pub fn pins(&self) -> core::slice::Iter<'_, DigitalPinRecord<L>> {
        self.table.iter()
    }

    /// Current settings, in the form the configuration store persists them.
    pub fn config(&self) -> DigitalInConfig<N, L> {
        DigitalInConfig {
            update_delay: self.update_delay,
            debounce_window: self.registry.debounce_window(),
            pins: self.table.config(),
        }
    }

    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut R {
        &mut self.reporter
    }

    fn indices() -> impl Iterator<Item = u8> {
        (0..N).map(|i| i as u8)
    }
}
