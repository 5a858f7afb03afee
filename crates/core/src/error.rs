//! Error types for forest fire construction and sweeps.
//!
//! Stepping a validly constructed simulation never fails, so every variant
//! here describes a configuration or placement problem detected up front.

use serde::Serialize;
use thiserror::Error;

/// Errors raised while building grids, simulations or sweeps.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum FireSimError {
    /// Grid dimensions must both be positive.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width in cells.
        width: usize,
        /// Requested height in cells.
        height: usize,
    },

    /// A probability parameter fell outside its declared range.
    #[error("{parameter} must be in {range}, got {value}")]
    OutOfRange {
        /// Parameter name (e.g. `"density"`).
        parameter: &'static str,
        /// Offending value.
        value: f64,
        /// Human-readable accepted range (e.g. `"(0, 1]"`).
        range: String,
    },

    /// Cell family name did not match any known variant.
    #[error("unknown cell variant '{0}', expected simple, single-spread or drossel-schwabl")]
    UnknownVariant(String),

    /// A swept parameter has no meaning for the configured variant.
    #[error("parameter {parameter} does not apply to the {variant} variant")]
    ParameterNotApplicable {
        /// Parameter name.
        parameter: &'static str,
        /// Variant name.
        variant: &'static str,
    },

    /// Coordinates outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A cell was placed into a slot that does not match its own position.
    #[error("cell at ({cell_x}, {cell_y}) cannot occupy slot ({x}, {y})")]
    SlotMismatch {
        x: usize,
        y: usize,
        cell_x: usize,
        cell_y: usize,
    },

    /// Sweep axis declared with no sample points.
    #[error("sweep axis {0} has no values")]
    EmptyAxis(&'static str),

    /// The same parameter was declared as two sweep axes.
    #[error("sweep axis {0} declared more than once")]
    DuplicateAxis(&'static str),

    /// Two sweep columns (axes or reporters) share a name.
    #[error("sweep column {0} declared more than once")]
    DuplicateColumn(String),

    /// A sweep needs at least one iteration per combination.
    #[error("sweep iterations must be at least 1")]
    NoIterations,

    /// A sweep needs at least one reporter to reduce runs.
    #[error("sweep has no reporters")]
    NoReporters,
}

impl FireSimError {
    /// Build an [`FireSimError::OutOfRange`] for a probability parameter.
    pub(crate) fn out_of_range(parameter: &'static str, value: f64, range: impl Into<String>) -> Self {
        Self::OutOfRange {
            parameter,
            value,
            range: range.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_parameter() {
        let err = FireSimError::out_of_range("density", 1.5, "(0, 1]");
        assert_eq!(err.to_string(), "density must be in (0, 1], got 1.5");

        let err = FireSimError::UnknownVariant("lava".to_string());
        assert!(err.to_string().contains("lava"));
    }
}
