//! Errors for the parameter state layer (indexing, bounds, composite
//! construction, and transactional store/restore misuse).
//!
//! This module defines [`StateError`] and the [`StateResult`] alias used
//! across the state stack and, under the `python-bindings` feature, at the
//! PyO3 boundary.
//!
//! ## Conventions
//! - **Indices are 0-based** and validated against the flat dimension.
//! - Bounds are **inclusive** on both ends; out-of-bounds values are flagged
//!   with the offending index and value, never clamped.
//! - Unsupported operations (`set_dimension`, `assign_to`, `assign_from`)
//!   are surfaced explicitly rather than approximated.
//! - `restore()` without a prior `store()` is a programming error and is
//!   reported as [`StateError::InvalidState`].
#[cfg(feature = "python-bindings")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

/// Result alias for state-layer operations that may produce [`StateError`].
pub type StateResult<T> = Result<T, StateError>;

/// Unified error type for parameter state manipulation.
///
/// Covers flat/local index validation, bound checking, composite
/// construction, and transactional misuse. Implements `Display`/`Error` and
/// converts to a Python `ValueError` at PyO3 boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum StateError {
    // ---- Indexing ----
    /// Index outside `[0, dimension)`.
    OutOfRange { index: usize, dimension: usize },

    // ---- Bounds ----
    /// A stored value lies outside the inclusive `[lower, upper]` range.
    ValueOutOfBounds { index: usize, value: f64, lower: f64, upper: f64 },

    /// A bound pair is NaN or inverted (`lower > upper`).
    InvalidBounds { lower: f64, upper: f64 },

    // ---- Composite construction ----
    /// A compound parameter was built from an empty sub-parameter list.
    EmptyCompound,

    /// A sub-parameter disagrees with the compound's shared bounds.
    BoundMismatch {
        id: String,
        lower: f64,
        upper: f64,
        expected_lower: f64,
        expected_upper: f64,
    },

    /// A dimension constraint was violated (e.g. matrix shape vs storage).
    DimensionMismatch { expected: usize, actual: usize },

    // ---- Lifecycle / contract ----
    /// The operation is intentionally unsupported on this type.
    UnsupportedOperation { operation: &'static str },

    /// A call sequence violated the transactional contract.
    InvalidState { reason: &'static str },
}

impl std::error::Error for StateError {}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Indexing ----
            StateError::OutOfRange { index, dimension } => {
                write!(f, "Index {index} is out of range for dimension {dimension}.")
            }
            // ---- Bounds ----
            StateError::ValueOutOfBounds { index, value, lower, upper } => {
                write!(
                    f,
                    "Value {value} at index {index} lies outside the inclusive bounds ({lower},{upper})."
                )
            }
            StateError::InvalidBounds { lower, upper } => {
                write!(f, "Bounds must be non-NaN with lower <= upper; got ({lower},{upper}).")
            }
            // ---- Composite construction ----
            StateError::EmptyCompound => {
                write!(f, "A compound parameter requires at least one sub-parameter.")
            }
            StateError::BoundMismatch { id, lower, upper, expected_lower, expected_upper } => {
                write!(
                    f,
                    "Sub-parameter '{id}' has bounds ({lower},{upper}) but the compound requires shared bounds ({expected_lower},{expected_upper})."
                )
            }
            StateError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}.")
            }
            // ---- Lifecycle / contract ----
            StateError::UnsupportedOperation { operation } => {
                write!(f, "Operation '{operation}' is not supported on this parameter.")
            }
            StateError::InvalidState { reason } => {
                write!(f, "Invalid call sequence: {reason}")
            }
        }
    }
}

/// Convert a [`StateError`] into a Python `ValueError` with the error message.
///
/// Used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<StateError> for PyErr {
    fn from(err: StateError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
