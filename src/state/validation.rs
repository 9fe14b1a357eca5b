//! State validation helpers — reusable checks for indices, bounds, and
//! bound sharing.
//!
//! Purpose
//! -------
//! Centralize the small validation routines used across the parameter state
//! stack so constructors and accessors can fail fast with structured errors.
//! Bound verification is pure: it returns a structured error naming the
//! offending parameter and both bound pairs, and produces no output.
//!
//! Key behaviors
//! -------------
//! - Validate flat/local indices against a dimension.
//! - Validate bound pairs (ordering, NaN rejection).
//! - Validate that every value in a vector lies inside inclusive bounds
//!   (first violation wins; values are never clamped).
//! - Validate that all sub-parameters of a compound share one bound pair.
//!
//! Conventions
//! -----------
//! - Indices are 0-based.
//! - Validation functions return [`StateResult`] and never panic on invalid
//!   inputs.
//! - This module contains no I/O and no logging; it only inspects numeric
//!   values and lengths.
use crate::state::bounds::Bounds;
use crate::state::errors::{StateError, StateResult};
use crate::state::real_parameter::RealParameter;
use ndarray::ArrayView1;

/// Validate a 0-based index against a dimension.
///
/// Returns `Ok(())` if `index < dimension`, otherwise
/// [`StateError::OutOfRange`] carrying both values.
pub fn validate_index(index: usize, dimension: usize) -> StateResult<()> {
    if index >= dimension {
        return Err(StateError::OutOfRange { index, dimension });
    }
    Ok(())
}

/// Validate a raw bound pair.
///
/// Returns `Ok(())` if neither bound is NaN and `lower <= upper`, otherwise
/// [`StateError::InvalidBounds`].
pub fn validate_bounds(lower: f64, upper: f64) -> StateResult<()> {
    if lower.is_nan() || upper.is_nan() || lower > upper {
        return Err(StateError::InvalidBounds { lower, upper });
    }
    Ok(())
}

/// Validate that every value lies inside the inclusive bounds.
///
/// Reports the **first** violation as [`StateError::ValueOutOfBounds`] with
/// the offending index, value, and both bounds. Values are never clamped.
pub fn validate_within_bounds(values: ArrayView1<f64>, bounds: &Bounds) -> StateResult<()> {
    for (index, &value) in values.iter().enumerate() {
        if !bounds.contains(value) {
            return Err(StateError::ValueOutOfBounds {
                index,
                value,
                lower: bounds.lower(),
                upper: bounds.upper(),
            });
        }
    }
    Ok(())
}

/// Validate that all sub-parameters share one `(lower, upper)` pair.
///
/// The first sub-parameter's bounds are the reference; the first disagreeing
/// sub-parameter fails the whole check with [`StateError::BoundMismatch`]
/// naming it and both pairs. Returns the shared bounds on success.
///
/// The list must be non-empty ([`StateError::EmptyCompound`] otherwise).
pub fn validate_shared_bounds(parameters: &[RealParameter]) -> StateResult<Bounds> {
    let first = parameters.first().ok_or(StateError::EmptyCompound)?;
    let expected = first.bounds();
    for parameter in parameters {
        let bounds = parameter.bounds();
        if bounds != expected {
            return Err(StateError::BoundMismatch {
                id: parameter.id().to_string(),
                lower: bounds.lower(),
                upper: bounds.upper(),
                expected_lower: expected.lower(),
                expected_upper: expected.upper(),
            });
        }
    }
    Ok(expected)
}
