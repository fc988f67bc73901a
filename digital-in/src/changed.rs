/// Outcome of an operation that may alter state worth saving or reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Changed {
    Yes,
    No,
}

impl Changed {
    /// Combines two outcomes, [`Changed::Yes`] if either is.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::No, Self::No) => Self::No,
            _ => Self::Yes,
        }
    }

    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Stores `new` in `value` and reports whether that altered it.
#[must_use = "the outcome tells the caller whether anything needs saving or reporting"]
pub fn checked_set<T: PartialEq>(value: &mut T, new: T) -> Changed {
    if *value == new {
        return Changed::No;
    }
    *value = new;
    Changed::Yes
}
