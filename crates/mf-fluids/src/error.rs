//! Fluid state errors.

use mf_core::CoreError;
use thiserror::Error;

/// Result type for fluid state operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors raised by fluid state construction and mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Construction-time configuration failure (bad species list, missing
    /// property catalog entry, mismatched array lengths).
    #[error("Configuration error: {what}")]
    Config { what: &'static str },

    /// Input failed validation (fraction sums outside tolerance, mixed
    /// phases, sub-epsilon temperature or pressure, empty name).
    #[error("Input validation failed: {what}")]
    InvalidInput { what: &'static str },

    /// Value or structure out of range (mismatched constituent sets,
    /// unknown species, combined flow below minimum).
    #[error("Out of range: {what}")]
    OutOfRange { what: &'static str },

    /// Index outside the constituent array.
    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { .. } => FluidError::InvalidInput {
                what: "non-finite numeric value",
            },
            CoreError::InvalidArg { what } => FluidError::InvalidInput { what },
            CoreError::IndexOob { what, index, len } => FluidError::IndexOob { what, index, len },
            CoreError::Invariant { what } => FluidError::OutOfRange { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::InvalidInput {
            what: "mass fraction sum",
        };
        assert!(err.to_string().contains("mass fraction sum"));

        let err = FluidError::IndexOob {
            what: "constituent",
            index: 3,
            len: 2,
        };
        assert!(err.to_string().contains("index=3"));
    }

    #[test]
    fn core_error_conversion() {
        let core = CoreError::NonFinite {
            what: "temperature",
            value: f64::NAN,
        };
        let fluid: FluidError = core.into();
        assert!(matches!(fluid, FluidError::InvalidInput { .. }));
    }
}
