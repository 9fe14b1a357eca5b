//! Errors for the likelihood layer (pattern indexing, evaluator binding,
//! injection dispatch, and numerical evaluation).
//!
//! This module defines [`LikelihoodError`] and the [`LikelihoodResult`]
//! alias. State-layer and substitution-layer failures propagate through the
//! `State` and `Substitution` variants so callers see one uniform error
//! surface for a full evaluate call.
#[cfg(feature = "python-bindings")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

use crate::state::errors::StateError;
use crate::substitution::errors::SubstitutionError;
use crate::substitution::model::SubstitutionModelKind;

/// Result alias for likelihood-layer operations.
pub type LikelihoodResult<T> = Result<T, LikelihoodError>;

/// Unified error type for pattern-scoped likelihood evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum LikelihoodError {
    // ---- Indexing ----
    /// Site index outside `[0, site_count)`.
    SiteOutOfRange { site: usize, site_count: usize },

    /// Pattern index outside `[0, pattern_count)`.
    PatternOutOfRange { pattern: usize, pattern_count: usize },

    // ---- Construction / binding ----
    /// The pattern source violated its own site -> pattern contract.
    InconsistentPatternSource { reason: String },

    /// An evaluator could not be bound to its collaborators.
    ModelResolution { reason: String },

    // ---- Injection dispatch ----
    /// The shared substitution model is not a variant the injector can
    /// drive.
    UnsupportedModel { found: SubstitutionModelKind },

    // ---- Evaluation ----
    /// A likelihood computation produced a non-finite or non-positive
    /// value.
    NumericalFailure { context: &'static str },

    // ---- Propagated ----
    /// A state-layer failure surfaced through parameter access.
    State(StateError),

    /// A substitution-layer failure surfaced during evaluation.
    Substitution(SubstitutionError),
}

impl std::error::Error for LikelihoodError {}

impl std::fmt::Display for LikelihoodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Indexing ----
            LikelihoodError::SiteOutOfRange { site, site_count } => {
                write!(f, "Site {site} is out of range for {site_count} sites.")
            }
            LikelihoodError::PatternOutOfRange { pattern, pattern_count } => {
                write!(f, "Pattern {pattern} is out of range for {pattern_count} patterns.")
            }
            // ---- Construction / binding ----
            LikelihoodError::InconsistentPatternSource { reason } => {
                write!(f, "Inconsistent pattern source: {reason}")
            }
            LikelihoodError::ModelResolution { reason } => {
                write!(f, "Cannot bind likelihood evaluator: {reason}")
            }
            // ---- Injection dispatch ----
            LikelihoodError::UnsupportedModel { found } => {
                write!(f, "Parameter injection requires a nucleotide-averaging model; found {found}.")
            }
            // ---- Evaluation ----
            LikelihoodError::NumericalFailure { context } => {
                write!(f, "Numerical failure in {context}.")
            }
            // ---- Propagated ----
            LikelihoodError::State(err) => write!(f, "{err}"),
            LikelihoodError::Substitution(err) => write!(f, "{err}"),
        }
    }
}

impl From<StateError> for LikelihoodError {
    fn from(err: StateError) -> LikelihoodError {
        LikelihoodError::State(err)
    }
}

impl From<SubstitutionError> for LikelihoodError {
    fn from(err: SubstitutionError) -> LikelihoodError {
        LikelihoodError::Substitution(err)
    }
}

/// Convert a [`LikelihoodError`] into a Python `ValueError`.
#[cfg(feature = "python-bindings")]
impl std::convert::From<LikelihoodError> for PyErr {
    fn from(err: LikelihoodError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Each variant renders a message carrying its distinguishing payload,
    // and wrapped lower-layer errors pass through unchanged.
    //
    // Given
    // -----
    // - One instance of every LikelihoodError variant.
    //
    // Expect
    // ------
    // - Display output contains the variant payload.
    fn display_messages_carry_variant_payloads() {
        // Arrange
        let cases: Vec<(LikelihoodError, &str)> = vec![
            (LikelihoodError::SiteOutOfRange { site: 9, site_count: 4 }, "Site 9"),
            (
                LikelihoodError::PatternOutOfRange { pattern: 3, pattern_count: 2 },
                "Pattern 3",
            ),
            (
                LikelihoodError::InconsistentPatternSource {
                    reason: "pattern 1 has no representative site".to_string(),
                },
                "representative",
            ),
            (
                LikelihoodError::ModelResolution {
                    reason: "column has 3 taxa but the tree has 4 leaves".to_string(),
                },
                "3 taxa",
            ),
            (
                LikelihoodError::UnsupportedModel { found: SubstitutionModelKind::JukesCantor },
                "Jukes-Cantor",
            ),
            (
                LikelihoodError::NumericalFailure { context: "site likelihood" },
                "site likelihood",
            ),
            (
                LikelihoodError::State(StateError::OutOfRange { index: 5, dimension: 5 }),
                "out of range",
            ),
            (
                LikelihoodError::Substitution(SubstitutionError::InvalidBranchLength {
                    length: -2.0,
                }),
                "-2",
            ),
        ];

        // Act & Assert
        for (err, needle) in cases {
            let rendered = err.to_string();
            assert!(
                rendered.contains(needle),
                "expected '{needle}' in message '{rendered}' for {err:?}"
            );
        }
    }
}
