use crate::{
    changed::{checked_set, Changed},
    debounce::{self, DebounceState, Step},
    mode::{ModePolicy, PinMode},
    TimeMillis,
};
use embedded_hal::digital::PinState;
use heapless::String;

#[cfg(feature = "no-std")]
use defmt::{debug, trace};
#[cfg(feature = "std")]
use log::{debug, trace};

/// State of a single input pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalPinRecord<const L: usize> {
    index: u8,
    name: String<L>,
    mode: Option<PinMode>,

    raw_level: Option<PinState>,
    accepted_level: Option<PinState>,
    stable_state: bool,
    toggle_state: bool,
    last_change: Option<TimeMillis>,
    debounce: DebounceState,
    /// Set by a mode change, the logical state is derived again on the next sample.
    mode_changed: bool,
}

impl<const L: usize> DigitalPinRecord<L> {
    pub(crate) fn new(index: u8) -> Self {
        Self {
            index,
            name: String::new(),
            mode: None,
            raw_level: None,
            accepted_level: None,
            stable_state: false,
            toggle_state: false,
            last_change: None,
            debounce: DebounceState::Stable,
            mode_changed: false,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_string(&self) -> &String<L> {
        &self.name
    }

    /// The configured mode, or the default mode if none has been assigned yet.
    pub fn mode(&self) -> PinMode {
        self.mode.unwrap_or_default()
    }

    /// Last raw level read from the pin.
    pub fn raw_level(&self) -> Option<PinState> {
        self.raw_level
    }

    /// Logical state of the pin after debounce and mode policy.
    pub fn state(&self) -> bool {
        self.stable_state
    }

    pub fn last_change(&self) -> Option<TimeMillis> {
        self.last_change
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debounce
    }

    /// Assigns a default name and mode where none is set, and drops any pending candidate.
    pub(crate) fn initialize(&mut self) -> Changed {
        let mut changed = Changed::No;

        if self.name.is_empty() {
            self.name = default_name(self.index);
            changed = Changed::Yes;
        }

        if self.mode.is_none() {
            self.mode = Some(PinMode::default());
            changed = Changed::Yes;
        }

        self.debounce = DebounceState::Stable;

        changed
    }

    pub(crate) fn set_name(&mut self, name: String<L>) -> Changed {
        checked_set(&mut self.name, name)
    }

    /// Changes the mode, dropping any pending candidate and the toggle value.
    ///
    /// The accepted level is kept. The next sample derives the logical state from it under the
    /// new mode before debouncing as usual.
    pub(crate) fn set_mode(&mut self, mode: PinMode) -> Changed {
        let changed = checked_set(&mut self.mode, Some(mode));
        if changed.is_yes() {
            self.debounce = DebounceState::Stable;
            self.toggle_state = false;
            self.mode_changed = true;
        }
        changed
    }

    /// Feeds one raw sample through the debounce state machine.
    ///
    /// Returns [`Changed::Yes`] when the logical state changed, or when the first sample of a
    /// pin seeded its state.
    pub(crate) fn sample(&mut self, raw: PinState, now: TimeMillis, policy: &ModePolicy) -> Changed {
        self.raw_level = Some(raw);

        let Some(basis) = self.accepted_level else {
            debug!("Pin {} seeded with {}", self.index, bool::from(raw));
            self.debounce = DebounceState::Stable;
            self.mode_changed = false;
            self.accepted_level = Some(raw);
            self.stable_state = self.logical(raw, policy);
            self.last_change = Some(now);
            return Changed::Yes;
        };

        let rederived = if core::mem::take(&mut self.mode_changed) {
            let logical = self.logical(basis, policy);
            self.set_state(logical, now)
        } else {
            Changed::No
        };

        let accepted = match policy.debounce_window {
            None => (raw != basis).then_some(raw),
            Some(window) => {
                let (next, step) = debounce::step(self.debounce, basis, raw, now, window);
                self.debounce = next;

                match step {
                    Step::Accepted(level) => Some(level),
                    Step::Rejected => {
                        debug!("Pin {} rejected noise", self.index);
                        None
                    }
                    Step::Started | Step::Restarted => {
                        trace!("Pin {} pending since {}", self.index, now);
                        None
                    }
                    Step::Unchanged | Step::Waiting => None,
                }
            }
        };

        let stepped = match accepted {
            Some(level) => self.accept(basis, level, now, policy),
            None => Changed::No,
        };

        rederived.or(stepped)
    }

    fn accept(
        &mut self,
        previous: PinState,
        level: PinState,
        now: TimeMillis,
        policy: &ModePolicy,
    ) -> Changed {
        self.accepted_level = Some(level);

        if policy.toggle && policy.is_active(level) && !policy.is_active(previous) {
            self.toggle_state = !self.toggle_state;
        }

        let logical = self.logical(level, policy);
        self.set_state(logical, now)
    }

    fn logical(&self, level: PinState, policy: &ModePolicy) -> bool {
        if policy.toggle {
            self.toggle_state
        } else {
            policy.is_active(level)
        }
    }

    fn set_state(&mut self, logical: bool, now: TimeMillis) -> Changed {
        let changed = checked_set(&mut self.stable_state, logical);
        if changed.is_yes() {
            self.last_change = Some(now);
        }
        changed
    }
}

fn default_name<const L: usize>(index: u8) -> String<L> {
    let mut name = String::new();
    let _ = core::fmt::write(&mut name, format_args!("din{index}"));
    name
}
