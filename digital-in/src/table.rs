use crate::{
    changed::Changed,
    config::PinConfig,
    error::{Error, Result},
    mode::{ModePolicy, PinMode},
    name_index::NameIndex,
    pin::DigitalPinRecord,
    TimeMillis,
};
use embedded_hal::digital::PinState;
use heapless::{String, Vec};

#[cfg(feature = "no-std")]
use defmt::{info, warn};
#[cfg(feature = "std")]
use log::{info, warn};

/// Fixed set of `N` pin records, keyed by index, with names of up to `L` bytes.
#[derive(Debug)]
pub struct DigitalPinTable<const N: usize, const L: usize> {
    pins: [DigitalPinRecord<L>; N],
    names: NameIndex<N, L>,
}

impl<const N: usize, const L: usize> Default for DigitalPinTable<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const L: usize> DigitalPinTable<N, L> {
    pub fn new() -> Self {
        Self {
            pins: core::array::from_fn(|i| DigitalPinRecord::new(i as u8)),
            names: NameIndex::default(),
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: u8) -> Option<&DigitalPinRecord<L>> {
        self.pins.get(usize::from(index))
    }

    pub fn iter(&self) -> core::slice::Iter<'_, DigitalPinRecord<L>> {
        self.pins.iter()
    }

    fn get_mut(&mut self, index: u8) -> Option<&mut DigitalPinRecord<L>> {
        self.pins.get_mut(usize::from(index))
    }

    /// Looks up a pin by exact, case sensitive, name.
    pub fn find(&self, name: &str) -> Option<u8> {
        self.names.get_index(name)
    }

    /// Applies persisted pin settings.
    ///
    /// Entries for pins outside the table are dropped, which the caller should persist.
    pub fn apply_config(&mut self, pins: &[PinConfig<L>]) -> Result<Changed> {
        let mut changed = Changed::No;

        for config in pins {
            match self.get_mut(config.index) {
                Some(pin) => {
                    let _ = pin.set_name(config.name.clone());
                    let _ = pin.set_mode(config.mode);
                }
                None => {
                    warn!("Dropping configuration for missing pin {}", config.index);
                    changed = Changed::Yes;
                }
            }
        }

        self.rebuild_names()?;
        Ok(changed)
    }

    /// Current settings of every pin, in index order.
    pub fn config(&self) -> Vec<PinConfig<L>, N> {
        self.pins
            .iter()
            .map(|pin| PinConfig {
                index: pin.index(),
                name: pin.name_string().clone(),
                mode: pin.mode(),
            })
            .collect()
    }

    /// Resets the sampling state of a pin, assigning a default name and mode where unset.
    ///
    /// Returns [`Changed::Yes`] if a default was assigned and the configuration needs saving.
    pub fn initialize_pin(&mut self, index: u8) -> Changed {
        let Some(pin) = self.get_mut(index) else {
            warn!("Cannot initialize pin {}, index out of range", index);
            return Changed::No;
        };

        let changed = pin.initialize();
        if changed.is_yes() {
            info!("Pin {} given defaults, name {}", index, pin.name());
            if let Err(e) = self.rebuild_names() {
                warn!("Pin name index rebuild failed: {}", e);
            }
        }
        changed
    }

    pub fn mode(&self, index: u8) -> Option<PinMode> {
        self.get(index).map(|pin| pin.mode())
    }

    /// Changes the mode of the named pin, dropping any partially debounced sample.
    ///
    /// Returns `false` if no pin has that name.
    pub fn set_mode(&mut self, name: &str, mode: PinMode) -> bool {
        let Some(index) = self.find(name) else {
            return false;
        };

        if let Some(pin) = self.get_mut(index) {
            if pin.set_mode(mode).is_yes() {
                info!("Pin {} ({}) mode set to {}", index, name, mode);
            }
            true
        } else {
            false
        }
    }

    /// Copies the name of a pin into `dst`, or leaves `dst` empty if there is no such pin.
    pub fn name_into(&self, index: u8, dst: &mut String<L>) {
        dst.clear();
        if let Some(pin) = self.get(index) {
            // Same capacity, cannot fail
            let _ = dst.push_str(pin.name());
        }
    }

    /// Renames a pin, the name must not be used by any other pin.
    pub fn set_name(&mut self, index: u8, name: &str) -> Result<Changed> {
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        let name: String<L> = String::try_from(name).map_err(|_| Error::InvalidName)?;

        match self.find(&name) {
            Some(owner) if owner == index => return Ok(Changed::No),
            Some(_) => return Err(Error::DuplicateName(index)),
            None => {}
        }

        let pin = self.get_mut(index).ok_or(Error::InvalidIndex(index))?;
        let changed = pin.set_name(name);
        self.rebuild_names()?;
        Ok(changed)
    }

    /// Feeds a raw sample to a pin, see [`DigitalPinRecord`] for the state machine.
    pub fn sample(
        &mut self,
        index: u8,
        raw: PinState,
        now: TimeMillis,
        policy: &ModePolicy,
    ) -> Changed {
        match self.get_mut(index) {
            Some(pin) => {
                let changed = pin.sample(raw, now, policy);
                if changed.is_yes() {
                    info!("Pin {} ({}) is now {}", index, pin.name(), pin.state());
                }
                changed
            }
            None => Changed::No,
        }
    }

    fn rebuild_names(&mut self) -> Result<()> {
        self.names.rebuild(self.pins.iter().map(|pin| (pin.name_string(), pin.index())))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::ModeRegistry;

    type Table = DigitalPinTable<4, 16>;

    fn initialized() -> Table {
        let mut table = Table::new();
        for i in 0..4 {
            let _ = table.initialize_pin(i);
        }
        table
    }

    fn pin_config(index: u8, name: &str, mode: PinMode) -> PinConfig<16> {
        PinConfig {
            index,
            name: String::try_from(name).unwrap(),
            mode,
        }
    }

    #[test]
    fn initialize_pin_assigns_defaults() {
        let mut table = Table::new();
        assert_eq!(table.initialize_pin(1), Changed::Yes);
        assert_eq!(table.initialize_pin(1), Changed::No);

        assert_eq!(table.find("din1"), Some(1));
        assert_eq!(table.mode(1), Some(PinMode::Debounced));
    }

    #[test]
    fn initialize_pin_out_of_range() {
        let mut table = initialized();
        let before: std::vec::Vec<_> = table.iter().cloned().collect();

        assert_eq!(table.initialize_pin(4), Changed::No);
        assert_eq!(table.initialize_pin(255), Changed::No);

        assert!(table.iter().cloned().eq(before));
    }

    #[test]
    fn set_mode_by_name() {
        let mut table = initialized();

        assert!(table.set_mode("din2", PinMode::Toggle));
        assert_eq!(table.mode(2), Some(PinMode::Toggle));

        assert!(table.set_mode("din2", PinMode::Raw));
        assert_eq!(table.mode(2), Some(PinMode::Raw));
    }

    #[test]
    fn set_mode_unknown_name() {
        let mut table = initialized();
        let before: std::vec::Vec<_> = table.iter().cloned().collect();

        assert!(!table.set_mode("nonexistent", PinMode::Raw));
        assert!(!table.set_mode("DIN2", PinMode::Raw));

        assert!(table.iter().cloned().eq(before));
    }

    #[test]
    fn set_mode_clears_pending() {
        let mut table = initialized();
        let policy = ModeRegistry::default().effect_for(PinMode::Debounced);

        let _ = table.sample(0, PinState::High, 0, &policy);
        let _ = table.sample(0, PinState::Low, 10, &policy);
        assert_ne!(
            table.get(0).unwrap().debounce_state(),
            crate::debounce::DebounceState::Stable
        );

        assert!(table.set_mode("din0", PinMode::PullupInverted));
        assert_eq!(
            table.get(0).unwrap().debounce_state(),
            crate::debounce::DebounceState::Stable
        );
    }

    #[test]
    fn mode_out_of_range() {
        let table = initialized();
        assert_eq!(table.mode(4), None);
    }

    #[test]
    fn name_into() {
        let table = initialized();
        let mut name = String::<16>::try_from("junk").unwrap();

        table.name_into(3, &mut name);
        assert_eq!(name, "din3");
    }

    #[test]
    fn name_into_out_of_range() {
        let table = initialized();
        let before: std::vec::Vec<_> = table.iter().cloned().collect();
        let mut name = String::<16>::try_from("junk").unwrap();

        table.name_into(9, &mut name);
        assert_eq!(name, "");
        assert!(table.iter().cloned().eq(before));
    }

    #[test]
    fn set_name() {
        let mut table = initialized();

        assert_eq!(table.set_name(1, "door"), Ok(Changed::Yes));
        assert_eq!(table.find("door"), Some(1));
        assert!(table.find("din1").is_none());

        assert_eq!(table.set_name(1, "door"), Ok(Changed::No));
        assert_eq!(table.set_name(2, "door"), Err(Error::DuplicateName(2)));
        assert_eq!(table.set_name(2, ""), Err(Error::InvalidName));
        assert_eq!(
            table.set_name(2, "a name that is far too long"),
            Err(Error::InvalidName)
        );
        assert_eq!(table.set_name(7, "lid"), Err(Error::InvalidIndex(7)));
    }

    #[test]
    fn apply_config() {
        let mut table = Table::new();

        let changed = table
            .apply_config(&[
                pin_config(0, "door", PinMode::PullupInverted),
                pin_config(2, "button", PinMode::Toggle),
            ])
            .unwrap();
        assert_eq!(changed, Changed::No);

        assert_eq!(table.find("door"), Some(0));
        assert_eq!(table.mode(2), Some(PinMode::Toggle));

        // Configured pins keep their settings, the others get defaults
        assert_eq!(table.initialize_pin(0), Changed::No);
        assert_eq!(table.initialize_pin(1), Changed::Yes);
    }

    #[test]
    fn apply_config_drops_missing_pins() {
        let mut table = Table::new();

        let changed = table
            .apply_config(&[pin_config(9, "ghost", PinMode::Raw)])
            .unwrap();
        assert_eq!(changed, Changed::Yes);
        assert!(table.find("ghost").is_none());
    }

    #[test]
    fn apply_config_duplicate_names() {
        let mut table = Table::new();

        assert_eq!(
            table.apply_config(&[
                pin_config(0, "door", PinMode::Raw),
                pin_config(1, "door", PinMode::Raw),
            ]),
            Err(Error::DuplicateName(1))
        );
    }

    #[test]
    fn config_export() {
        let mut table = initialized();
        table.set_name(3, "estop").unwrap();
        assert!(table.set_mode("estop", PinMode::Raw));

        let config = table.config();
        assert_eq!(config.len(), 4);
        assert_eq!(config[0], pin_config(0, "din0", PinMode::Debounced));
        assert_eq!(config[3], pin_config(3, "estop", PinMode::Raw));
    }
}
