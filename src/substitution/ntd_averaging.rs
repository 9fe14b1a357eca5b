//! Nucleotide model-averaging substitution model with indicator-gated
//! structure and a cached spectral decomposition.
//!
//! Purpose
//! -------
//! Implement a reversible 4-state nucleotide rate matrix whose structural
//! complexity is selected by a `model_choose` indicator, spanning the
//! hierarchy JC69 → K80 → HKY85 → TN93 → GTR. The model owns its named
//! parameters as [`RealParameter`]s so a sampler (or the likelihood layer's
//! injector) can quiet-write proposals directly into them, and it caches the
//! spectral decomposition of the rate matrix so repeated branch-length
//! evaluations between proposals reuse one eigendecomposition.
//!
//! Key behaviors
//! -------------
//! - Indicator thresholds on `model_choose` (value `c`):
//!   `c >= 1` enables the transition/transversion ratio `exp(log_kappa)`;
//!   `c >= 2` uses the empirical frequency parameter (uniform otherwise);
//!   `c >= 3` splits the C<->T transition rate by `exp(log_tn)`;
//!   `c >= 4` enables the GTR transversion exchangeabilities
//!   `exp(log_ac)`, `exp(log_at)`, `exp(log_gc)`. The G<->T rate is the
//!   reference and is always 1.
//! - The rate matrix is normalized so the expected substitution rate at
//!   equilibrium is 1; branch lengths are therefore in units of expected
//!   substitutions per site.
//! - Quiet parameter writes never invalidate the cached decomposition;
//!   staleness is an explicit, caller-driven signal via
//!   [`NtdAveraging::mark_stale`]. This keeps batched proposal writes cheap
//!   and makes recomputation points visible in calling code.
//!
//! Invariants & assumptions
//! ------------------------
//! - State order is A=0, C=1, G=2, T=3 throughout, matching the alignment
//!   encoding.
//! - Resolved frequencies are finite, strictly positive, and normalized to
//!   sum to 1 before matrix construction; violations are structured errors,
//!   never silent clamps.
//! - The decomposition uses the reversibility of the rate matrix: with
//!   `D = diag(pi)`, the matrix `D^{1/2} Q D^{-1/2}` is symmetric, so a
//!   symmetric eigensolver applies and eigenvalues are real.
//! - Interior mutability (`Cell` staleness flag, `RefCell` cache) makes
//!   evaluation possible through shared references; instances are
//!   single-owner and not thread-safe.
use std::cell::{Cell, RefCell};

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::state::bounds::Bounds;
use crate::state::real_parameter::RealParameter;
use crate::substitution::errors::{SubstitutionError, SubstitutionResult};

/// Number of nucleotide states.
pub const STATE_COUNT: usize = 4;

/// Cached spectral decomposition of the normalized rate matrix.
///
/// `P(t) = right * diag(exp(lambda * t)) * left`, with `right = D^{-1/2} V`
/// and `left = V^T D^{1/2}` for the symmetric eigendecomposition
/// `D^{1/2} Q D^{-1/2} = V diag(lambda) V^T`.
#[derive(Debug, Clone)]
struct Spectral {
    eigenvalues: DVector<f64>,
    right: DMatrix<f64>,
    left: DMatrix<f64>,
}

/// Reversible nucleotide substitution model with indicator-gated structure.
///
/// Owns its named parameters; collaborators write proposals into them
/// through the quiet setters and signal recomputation with
/// [`NtdAveraging::mark_stale`].
#[derive(Debug)]
pub struct NtdAveraging {
    log_kappa: RealParameter,
    log_tn: RealParameter,
    log_ac: RealParameter,
    log_at: RealParameter,
    log_gc: RealParameter,
    model_choose: RealParameter,
    frequencies: RealParameter,
    /// Set by `mark_stale`, cleared when the decomposition is refreshed.
    stale: Cell<bool>,
    spectral: RefCell<Option<Spectral>>,
}

impl NtdAveraging {
    /// Build the model from its named parameters.
    ///
    /// The five log-rate parameters and the indicator must be scalars; the
    /// frequency parameter must have dimension 4. Shape violations fail with
    /// [`SubstitutionError::ParameterShape`] naming the parameter.
    pub fn new(
        log_kappa: RealParameter, log_tn: RealParameter, log_ac: RealParameter,
        log_at: RealParameter, log_gc: RealParameter, model_choose: RealParameter,
        frequencies: RealParameter,
    ) -> SubstitutionResult<NtdAveraging> {
        let scalars: [(&'static str, &RealParameter); 6] = [
            ("log_kappa", &log_kappa),
            ("log_tn", &log_tn),
            ("log_ac", &log_ac),
            ("log_at", &log_at),
            ("log_gc", &log_gc),
            ("model_choose", &model_choose),
        ];
        for (name, parameter) in scalars {
            if parameter.dimension() != 1 {
                return Err(SubstitutionError::ParameterShape {
                    name,
                    expected: 1,
                    actual: parameter.dimension(),
                });
            }
        }
        if frequencies.dimension() != STATE_COUNT {
            return Err(SubstitutionError::ParameterShape {
                name: "frequencies",
                expected: STATE_COUNT,
                actual: frequencies.dimension(),
            });
        }
        Ok(NtdAveraging {
            log_kappa,
            log_tn,
            log_ac,
            log_at,
            log_gc,
            model_choose,
            frequencies,
            stale: Cell::new(true),
            spectral: RefCell::new(None),
        })
    }

    /// Convenience constructor from raw values.
    ///
    /// Log rates are unbounded; the indicator is bounded to `[0, 4]` and
    /// frequencies to `[0, 1]`.
    pub fn from_values(
        log_kappa: f64, log_tn: f64, log_ac: f64, log_at: f64, log_gc: f64, model_choose: f64,
        frequencies: [f64; STATE_COUNT],
    ) -> SubstitutionResult<NtdAveraging> {
        let unbounded = Bounds::unbounded();
        NtdAveraging::new(
            RealParameter::scalar("log_kappa", log_kappa, unbounded),
            RealParameter::scalar("log_tn", log_tn, unbounded),
            RealParameter::scalar("log_ac", log_ac, unbounded),
            RealParameter::scalar("log_at", log_at, unbounded),
            RealParameter::scalar("log_gc", log_gc, unbounded),
            RealParameter::scalar("model_choose", model_choose, Bounds::new(0.0, 4.0)?),
            RealParameter::new(
                "frequencies",
                Array1::from_vec(frequencies.to_vec()),
                Bounds::new(0.0, 1.0)?,
            ),
        )
    }

    /// Number of character states.
    pub fn state_count(&self) -> usize {
        STATE_COUNT
    }

    /// Current indicator value.
    pub fn model_choose(&self) -> SubstitutionResult<f64> {
        Ok(self.model_choose.value(0)?)
    }

    // ---- Quiet setters (no staleness, no dirty flags) ----------------------
    //
    // Proposal writes are batched: the caller writes every parameter it
    // touches, then calls `mark_stale` exactly once.

    /// Quiet-write `log_kappa`.
    pub fn set_log_kappa_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.log_kappa.set_quietly(0, value)?)
    }

    /// Quiet-write `log_tn`.
    pub fn set_log_tn_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.log_tn.set_quietly(0, value)?)
    }

    /// Quiet-write `log_ac`.
    pub fn set_log_ac_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.log_ac.set_quietly(0, value)?)
    }

    /// Quiet-write `log_at`.
    pub fn set_log_at_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.log_at.set_quietly(0, value)?)
    }

    /// Quiet-write `log_gc`.
    pub fn set_log_gc_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.log_gc.set_quietly(0, value)?)
    }

    /// Quiet-write the `model_choose` indicator.
    pub fn set_model_choose_quietly(&mut self, value: f64) -> SubstitutionResult<()> {
        Ok(self.model_choose.set_quietly(0, value)?)
    }

    /// Quiet-write one equilibrium frequency.
    pub fn set_frequency_quietly(&mut self, index: usize, value: f64) -> SubstitutionResult<()> {
        Ok(self.frequencies.set_quietly(index, value)?)
    }

    /// Flag the cached decomposition as out of date.
    ///
    /// The next transition-probability request recomputes the rate matrix
    /// and its decomposition from the current parameter values.
    pub fn mark_stale(&self) {
        self.stale.set(true);
    }

    /// Whether the next evaluation will recompute the decomposition.
    pub fn is_stale(&self) -> bool {
        self.stale.get() || self.spectral.borrow().is_none()
    }

    /// Equilibrium frequencies after indicator resolution: the empirical
    /// parameter (normalized) when `model_choose >= 2`, uniform otherwise.
    pub fn resolved_frequencies(&self) -> SubstitutionResult<Array1<f64>> {
        let c = self.model_choose.value(0)?;
        if c < 2.0 {
            return Ok(Array1::from_elem(STATE_COUNT, 1.0 / STATE_COUNT as f64));
        }
        let raw = self.frequencies.values();
        let mut total = 0.0;
        for (index, &value) in raw.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SubstitutionError::InvalidFrequency { index, value });
            }
            total += value;
        }
        Ok(raw.mapv(|value| value / total))
    }

    /// Build the normalized rate matrix from the current parameter values.
    ///
    /// Off-diagonal `Q[i][j] = r(i, j) * pi[j]` with indicator-gated
    /// exchangeabilities; diagonals make rows sum to zero; the whole matrix
    /// is scaled so the expected rate at equilibrium is 1.
    pub fn rate_matrix(&self) -> SubstitutionResult<Array2<f64>> {
        let c = self.model_choose.value(0)?;
        let pi = self.resolved_frequencies()?;

        let kappa = if c >= 1.0 { self.log_kappa.value(0)?.exp() } else { 1.0 };
        let kappa_ct = if c >= 3.0 { kappa * self.log_tn.value(0)?.exp() } else { kappa };
        let (r_ac, r_at, r_cg) = if c >= 4.0 {
            (
                self.log_ac.value(0)?.exp(),
                self.log_at.value(0)?.exp(),
                self.log_gc.value(0)?.exp(),
            )
        } else {
            (1.0, 1.0, 1.0)
        };
        // Symmetric exchangeabilities, state order A, C, G, T. G<->T is the
        // reference rate.
        let mut exchange = [[0.0_f64; STATE_COUNT]; STATE_COUNT];
        exchange[0][1] = r_ac;
        exchange[0][2] = kappa;
        exchange[0][3] = r_at;
        exchange[1][2] = r_cg;
        exchange[1][3] = kappa_ct;
        exchange[2][3] = 1.0;
        for i in 0..STATE_COUNT {
            for j in 0..i {
                exchange[i][j] = exchange[j][i];
            }
        }

        let mut q = Array2::zeros((STATE_COUNT, STATE_COUNT));
        for i in 0..STATE_COUNT {
            let mut row_sum = 0.0;
            for j in 0..STATE_COUNT {
                if i != j {
                    q[[i, j]] = exchange[i][j] * pi[j];
                    row_sum += q[[i, j]];
                }
            }
            q[[i, i]] = -row_sum;
        }

        // Normalize so branch lengths measure expected substitutions per
        // site: mu = -sum_i pi_i * Q_ii.
        let mut mu = 0.0;
        for i in 0..STATE_COUNT {
            mu -= pi[i] * q[[i, i]];
        }
        if !mu.is_finite() || mu <= 0.0 {
            return Err(SubstitutionError::NumericalFailure { context: "rate matrix normalization" });
        }
        q.mapv_inplace(|value| value / mu);
        Ok(q)
    }

    /// Transition probability matrix `P(t)` for a branch of length
    /// `branch_length` (expected substitutions per site).
    ///
    /// Refreshes the cached spectral decomposition if the model was marked
    /// stale (or never evaluated), then exponentiates the eigenvalues.
    /// Round-off negatives are clamped to zero; any non-finite entry is a
    /// [`SubstitutionError::NumericalFailure`].
    pub fn transition_probabilities(&self, branch_length: f64) -> SubstitutionResult<Array2<f64>> {
        if !branch_length.is_finite() || branch_length < 0.0 {
            return Err(SubstitutionError::InvalidBranchLength { length: branch_length });
        }
        if self.is_stale() {
            let spectral = self.decompose()?;
            *self.spectral.borrow_mut() = Some(spectral);
            self.stale.set(false);
        }
        let guard = self.spectral.borrow();
        let spectral = match guard.as_ref() {
            Some(spectral) => spectral,
            None => {
                return Err(SubstitutionError::NumericalFailure {
                    context: "transition probability cache",
                })
            }
        };

        let mut probabilities = Array2::zeros((STATE_COUNT, STATE_COUNT));
        for i in 0..STATE_COUNT {
            for j in 0..STATE_COUNT {
                let mut sum = 0.0;
                for k in 0..STATE_COUNT {
                    sum += spectral.right[(i, k)]
                        * (spectral.eigenvalues[k] * branch_length).exp()
                        * spectral.left[(k, j)];
                }
                if !sum.is_finite() {
                    return Err(SubstitutionError::NumericalFailure {
                        context: "transition probability exponentiation",
                    });
                }
                probabilities[[i, j]] = sum.max(0.0);
            }
        }
        Ok(probabilities)
    }

    /// Symmetrize-and-decompose the current rate matrix.
    fn decompose(&self) -> SubstitutionResult<Spectral> {
        let q = self.rate_matrix()?;
        let pi = self.resolved_frequencies()?;
        let sqrt_pi: Vec<f64> = pi.iter().map(|&p| p.sqrt()).collect();

        let mut symmetric = DMatrix::zeros(STATE_COUNT, STATE_COUNT);
        for i in 0..STATE_COUNT {
            for j in 0..STATE_COUNT {
                symmetric[(i, j)] = sqrt_pi[i] * q[[i, j]] / sqrt_pi[j];
            }
        }
        // Fold out round-off asymmetry before handing to the symmetric
        // eigensolver.
        let symmetric = (symmetric.clone() + symmetric.transpose()) * 0.5;
        let eigen = nalgebra::SymmetricEigen::new(symmetric);

        let mut right = DMatrix::zeros(STATE_COUNT, STATE_COUNT);
        let mut left = DMatrix::zeros(STATE_COUNT, STATE_COUNT);
        for i in 0..STATE_COUNT {
            for j in 0..STATE_COUNT {
                right[(i, j)] = eigen.eigenvectors[(i, j)] / sqrt_pi[i];
                left[(i, j)] = eigen.eigenvectors[(j, i)] * sqrt_pi[j];
            }
        }
        for k in 0..STATE_COUNT {
            if !eigen.eigenvalues[k].is_finite() {
                return Err(SubstitutionError::NumericalFailure {
                    context: "spectral decomposition",
                });
            }
        }
        Ok(Spectral { eigenvalues: eigen.eigenvalues, right, left })
    }
}
