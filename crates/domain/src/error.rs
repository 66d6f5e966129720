//! Domain error types.
//!
//! Each error here maps to a user-visible failure at the command boundary;
//! none of them should ever terminate the hosting process.

/// Why an intensity value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IntensityError {
    /// The input was not an integer at all.
    #[error("intensity is not an integer")]
    NotAnInteger,

    /// The integer was outside the valid percentage range.
    #[error("intensity {0} is outside 0..=100")]
    OutOfRange(i64),
}

/// Why a trigger could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    /// The text fragment to match was empty.
    #[error("trigger text must not be empty")]
    EmptyPattern,

    /// The intensity was invalid.
    #[error(transparent)]
    Intensity(#[from] IntensityError),
}

/// Why a trigger-set operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TriggerSetError {
    /// The requested listing index does not exist.
    #[error("no trigger at index {index} (the set holds {len})")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// The number of triggers currently stored.
        len: usize,
    },
}
