//! Errors for the substitution layer (parameter plumbing, rate-matrix
//! construction, and spectral decomposition).
//!
//! This module defines [`SubstitutionError`] and the [`SubstitutionResult`]
//! alias. State-layer failures propagate through the `State` variant; the
//! numerical variants carry enough payload to identify the failing
//! computation without any logging side channel.
#[cfg(feature = "python-bindings")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

use crate::state::errors::StateError;

/// Result alias for substitution-layer operations.
pub type SubstitutionResult<T> = Result<T, SubstitutionError>;

/// Unified error type for substitution-model construction and evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionError {
    // ---- Construction ----
    /// A named model parameter has the wrong dimension.
    ParameterShape { name: &'static str, expected: usize, actual: usize },

    /// A resolved frequency is non-finite or non-positive.
    InvalidFrequency { index: usize, value: f64 },

    // ---- Evaluation ----
    /// Branch lengths must be finite and non-negative.
    InvalidBranchLength { length: f64 },

    /// A numerical computation produced non-finite output.
    NumericalFailure { context: &'static str },

    // ---- Propagated ----
    /// A state-layer failure surfaced through parameter access.
    State(StateError),
}

impl std::error::Error for SubstitutionError {}

impl std::fmt::Display for SubstitutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Construction ----
            SubstitutionError::ParameterShape { name, expected, actual } => {
                write!(
                    f,
                    "Model parameter '{name}' must have dimension {expected}; got {actual}."
                )
            }
            SubstitutionError::InvalidFrequency { index, value } => {
                write!(
                    f,
                    "Equilibrium frequency at index {index} must be finite and positive; got {value}."
                )
            }
            // ---- Evaluation ----
            SubstitutionError::InvalidBranchLength { length } => {
                write!(f, "Branch length must be finite and non-negative; got {length}.")
            }
            SubstitutionError::NumericalFailure { context } => {
                write!(f, "Numerical failure in {context}.")
            }
            // ---- Propagated ----
            SubstitutionError::State(err) => write!(f, "{err}"),
        }
    }
}

impl From<StateError> for SubstitutionError {
    fn from(err: StateError) -> SubstitutionError {
        SubstitutionError::State(err)
    }
}

/// Convert a [`SubstitutionError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl std::convert::From<SubstitutionError> for PyErr {
    fn from(err: SubstitutionError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
