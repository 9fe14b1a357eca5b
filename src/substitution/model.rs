//! Closed set of substitution models behind one tagged dispatch type.
//!
//! Purpose
//! -------
//! Give the likelihood layer a single [`SubstitutionModel`] type to share
//! and evaluate, with the set of supported models closed at compile time.
//! Collaborators that only work with a particular variant (the parameter
//! injector writes into [`NtdAveraging`] fields) match on the tag and fail
//! with a structured error carrying the [`SubstitutionModelKind`] they
//! found, instead of inspecting runtime types.
//!
//! Key behaviors
//! -------------
//! - [`JukesCantor`] is the closed-form baseline: uniform frequencies and
//!   the analytic transition probabilities, no decomposition and no cache,
//!   so `mark_stale` is a no-op.
//! - [`SubstitutionModel`] forwards `state_count`, `frequencies`,
//!   `transition_probabilities`, and `mark_stale` to the active variant.
use ndarray::{Array1, Array2};

use crate::substitution::errors::{SubstitutionError, SubstitutionResult};
use crate::substitution::ntd_averaging::{NtdAveraging, STATE_COUNT};

/// Discriminant of a [`SubstitutionModel`], used in error reporting when a
/// collaborator requires a specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionModelKind {
    NucleotideAveraging,
    JukesCantor,
}

impl std::fmt::Display for SubstitutionModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubstitutionModelKind::NucleotideAveraging => write!(f, "nucleotide-averaging"),
            SubstitutionModelKind::JukesCantor => write!(f, "Jukes-Cantor"),
        }
    }
}

/// Jukes-Cantor (JC69) nucleotide model with analytic transition
/// probabilities.
///
/// Parameter-free: uniform equilibrium frequencies and equal rates. Useful
/// as a baseline and as a cross-check for the averaging model at indicator
/// value 0.
#[derive(Debug, Clone, Default)]
pub struct JukesCantor;

impl JukesCantor {
    /// Number of character states.
    pub fn state_count(&self) -> usize {
        STATE_COUNT
    }

    /// Uniform equilibrium frequencies.
    pub fn frequencies(&self) -> Array1<f64> {
        Array1::from_elem(STATE_COUNT, 1.0 / STATE_COUNT as f64)
    }

    /// Closed-form `P(t)`: `1/4 + 3/4 e^{-4t/3}` on the diagonal and
    /// `1/4 - 1/4 e^{-4t/3}` elsewhere.
    pub fn transition_probabilities(&self, branch_length: f64) -> SubstitutionResult<Array2<f64>> {
        if !branch_length.is_finite() || branch_length < 0.0 {
            return Err(SubstitutionError::InvalidBranchLength { length: branch_length });
        }
        let decay = (-4.0 * branch_length / 3.0).exp();
        let p_same = 0.25 + 0.75 * decay;
        let p_diff = 0.25 - 0.25 * decay;
        Ok(Array2::from_shape_fn((STATE_COUNT, STATE_COUNT), |(i, j)| {
            if i == j {
                p_same
            } else {
                p_diff
            }
        }))
    }
}

/// Tagged substitution model shared between the sampler-facing parameter
/// layer and the likelihood layer.
#[derive(Debug)]
pub enum SubstitutionModel {
    NucleotideAveraging(NtdAveraging),
    JukesCantor(JukesCantor),
}

impl SubstitutionModel {
    /// The variant tag, for dispatch and error reporting.
    pub fn kind(&self) -> SubstitutionModelKind {
        match self {
            SubstitutionModel::NucleotideAveraging(_) => SubstitutionModelKind::NucleotideAveraging,
            SubstitutionModel::JukesCantor(_) => SubstitutionModelKind::JukesCantor,
        }
    }

    /// Number of character states.
    pub fn state_count(&self) -> usize {
        match self {
            SubstitutionModel::NucleotideAveraging(model) => model.state_count(),
            SubstitutionModel::JukesCantor(model) => model.state_count(),
        }
    }

    /// Equilibrium frequencies of the active variant.
    pub fn frequencies(&self) -> SubstitutionResult<Array1<f64>> {
        match self {
            SubstitutionModel::NucleotideAveraging(model) => model.resolved_frequencies(),
            SubstitutionModel::JukesCantor(model) => Ok(model.frequencies()),
        }
    }

    /// Transition probability matrix for a branch of the given length.
    pub fn transition_probabilities(&self, branch_length: f64) -> SubstitutionResult<Array2<f64>> {
        match self {
            SubstitutionModel::NucleotideAveraging(model) => {
                model.transition_probabilities(branch_length)
            }
            SubstitutionModel::JukesCantor(model) => model.transition_probabilities(branch_length),
        }
    }

    /// Flag cached evaluation state as out of date. No-op for variants
    /// without a cache.
    pub fn mark_stale(&self) {
        match self {
            SubstitutionModel::NucleotideAveraging(model) => model.mark_stale(),
            SubstitutionModel::JukesCantor(_) => {}
        }
    }
}
