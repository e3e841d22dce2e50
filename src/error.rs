//! General error types
//!
//! Errors in this module are not tied to any particular parser state; they
//! describe values that were read successfully but cannot be represented
//! on the current platform or in the target type.

use std::error::Error;
use std::fmt::Display;

/// Error type for length-prefixed collections whose declared element-count
/// cannot be represented in memory.
#[derive(Clone, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Declared element-count exceeds the platform limit
    TooLong { limit: u64, actual: u64 },
}

impl LengthError {
    /// Converts a length prefix into a `usize`, failing when it would truncate.
    pub fn restrict(declared: u64) -> Result<usize, Self> {
        usize::try_from(declared).map_err(|_| LengthError::TooLong {
            limit: usize::MAX as u64,
            actual: declared,
        })
    }
}

impl Display for LengthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(
                    f,
                    "{actual}-element length prefix exceeded limit of {limit} elements"
                )
            }
        }
    }
}

impl Error for LengthError {}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn restrict_fits() {
        assert_eq!(LengthError::restrict(42), Ok(42usize));
    }
}
