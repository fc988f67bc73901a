pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "no-std", derive(defmt::Format))]
pub enum Error {
    #[error("Pin index {0} is out of range")]
    InvalidIndex(u8),

    #[error("Pin names must be non-empty and fit the name capacity")]
    InvalidName,

    #[error("Pin {0} has a name that is already in use")]
    DuplicateName(u8),

    #[error("Update delay must be greater than zero")]
    InvalidDelay,

    #[error("More pins configured than can be indexed")]
    TooManyPins,
}
