//! Real-valued parameter vector with dirty tracking and checkpointing.
//!
//! Purpose
//! -------
//! Provide the leaf state node of the sampler: a named vector of `f64`
//! values with inclusive bounds, a per-value dirty flag array, and a shadow
//! buffer implementing the transactional store/restore contract a
//! Markov-chain sampler relies on when rejecting proposals.
//!
//! Key behaviors
//! -------------
//! - `set` writes a value and marks exactly that index dirty; `set_quietly`
//!   performs the identical write while leaving every dirty flag untouched
//!   (used to stage speculative values without triggering downstream cache
//!   invalidation).
//! - Writes do **not** re-check bounds; callers that need enforcement run
//!   [`RealParameter::validate`], which flags the first violation and never
//!   clamps.
//! - `store` copies the current values into a shadow buffer; `restore`
//!   copies them back bit-exactly. `restore` without a prior `store` is a
//!   programming error.
//! - A matrix facade (`matrix`, `matrix_value`, `set_matrix_value`)
//!   addresses the same flat storage row-major for matrix-shaped parameters.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dimension` is fixed at construction; the shadow buffer always matches
//!   it.
//! - `store` is idempotent when no mutation happened in between; `restore`
//!   can be called repeatedly after one `store` and always reproduces the
//!   stored values exactly.
//! - Dirty flags are pure bookkeeping: they are never consulted by this type
//!   itself and are cleared only through the explicit dirty-state API.
use crate::state::bounds::Bounds;
use crate::state::errors::{StateError, StateResult};
use crate::state::validation::{validate_index, validate_within_bounds};
use ndarray::Array1;

/// Named, bounded vector of real values with per-value dirty flags and a
/// shadow buffer for store/restore.
///
/// This is the leaf state node aggregated by
/// [`CompoundParameter`](crate::state::CompoundParameter); it also backs the
/// named sub-parameters of the substitution model.
#[derive(Debug, Clone, PartialEq)]
pub struct RealParameter {
    id: String,
    values: Array1<f64>,
    bounds: Bounds,
    dirty: Vec<bool>,
    shadow: Option<Array1<f64>>,
    /// Row length of the matrix facade; 1 for plain vectors.
    minor_dimension: usize,
}

impl RealParameter {
    /// Construct a parameter from its initial values and bounds.
    ///
    /// Initial values are accepted as-is; bound conformance is checked by
    /// [`RealParameter::validate`], not at construction (violations are
    /// flagged, never clamped).
    pub fn new(id: impl Into<String>, values: Array1<f64>, bounds: Bounds) -> RealParameter {
        let dimension = values.len();
        RealParameter {
            id: id.into(),
            values,
            bounds,
            dirty: vec![false; dimension],
            shadow: None,
            minor_dimension: 1,
        }
    }

    /// Construct a dimension-1 parameter holding a single scalar.
    pub fn scalar(id: impl Into<String>, value: f64, bounds: Bounds) -> RealParameter {
        RealParameter::new(id, Array1::from_elem(1, value), bounds)
    }

    /// Construct a `rows x cols` matrix parameter over row-major flat
    /// storage.
    ///
    /// Fails with [`StateError::DimensionMismatch`] if
    /// `values.len() != rows * cols`.
    pub fn matrix(
        id: impl Into<String>, rows: usize, cols: usize, values: Array1<f64>, bounds: Bounds,
    ) -> StateResult<RealParameter> {
        if values.len() != rows * cols {
            return Err(StateError::DimensionMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        let mut parameter = RealParameter::new(id, values, bounds);
        parameter.minor_dimension = cols.max(1);
        Ok(parameter)
    }

    /// Identifier used in diagnostics and bound-mismatch reporting.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of stored values.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Inclusive bound pair.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Read the value at `index`.
    pub fn value(&self, index: usize) -> StateResult<f64> {
        validate_index(index, self.values.len())?;
        Ok(self.values[index])
    }

    /// Borrow all values in storage order.
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Write `value` at `index` and mark exactly that index dirty.
    ///
    /// Bounds are not re-checked here; see [`RealParameter::validate`].
    pub fn set(&mut self, index: usize, value: f64) -> StateResult<()> {
        validate_index(index, self.values.len())?;
        self.values[index] = value;
        self.dirty[index] = true;
        Ok(())
    }

    /// Write `value` at `index` without touching any dirty flag.
    pub fn set_quietly(&mut self, index: usize, value: f64) -> StateResult<()> {
        validate_index(index, self.values.len())?;
        self.values[index] = value;
        Ok(())
    }

    /// Read the matrix-facade value at `(row, col)`.
    pub fn matrix_value(&self, row: usize, col: usize) -> StateResult<f64> {
        validate_index(col, self.minor_dimension)?;
        self.value(row * self.minor_dimension + col)
    }

    /// Write the matrix-facade value at `(row, col)`, marking it dirty.
    pub fn set_matrix_value(&mut self, row: usize, col: usize, value: f64) -> StateResult<()> {
        validate_index(col, self.minor_dimension)?;
        self.set(row * self.minor_dimension + col, value)
    }

    /// Check every value against the bounds; the first violation is
    /// reported as [`StateError::ValueOutOfBounds`]. Values are never
    /// clamped.
    pub fn validate(&self) -> StateResult<()> {
        validate_within_bounds(self.values.view(), &self.bounds)
    }

    /// Snapshot the current values into the shadow buffer.
    ///
    /// Idempotent when called twice without an intervening mutation.
    pub fn store(&mut self) {
        self.shadow = Some(self.values.clone());
    }

    /// Copy the shadow buffer back into the live values, bit-exactly.
    ///
    /// Dirty flags are left untouched; the sampler owns dirty-state
    /// bookkeeping across accept/reject. Fails with
    /// [`StateError::InvalidState`] if no `store` preceded this call.
    pub fn restore(&mut self) -> StateResult<()> {
        match &self.shadow {
            Some(shadow) => {
                self.values.assign(shadow);
                Ok(())
            }
            None => Err(StateError::InvalidState { reason: "restore called without a prior store" }),
        }
    }

    /// Whether the value at `index` has been marked dirty.
    pub fn is_dirty(&self, index: usize) -> StateResult<bool> {
        validate_index(index, self.dirty.len())?;
        Ok(self.dirty[index])
    }

    /// Indices currently marked dirty, in storage order.
    pub fn dirty_indices(&self) -> Vec<usize> {
        self.dirty.iter().enumerate().filter(|(_, &flag)| flag).map(|(i, _)| i).collect()
    }

    /// Set every dirty flag to `flag`.
    pub fn set_everything_dirty(&mut self, flag: bool) {
        self.dirty.iter_mut().for_each(|slot| *slot = flag);
    }

    /// Clear all dirty flags.
    pub fn clear_dirty(&mut self) {
        self.set_everything_dirty(false);
    }

    /// Independent clone: same id, bounds, and current values; fresh shadow
    /// buffer and clean dirty flags.
    pub fn copy(&self) -> RealParameter {
        RealParameter {
            id: self.id.clone(),
            values: self.values.clone(),
            bounds: self.bounds,
            dirty: vec![false; self.values.len()],
            shadow: None,
            minor_dimension: self.minor_dimension,
        }
    }
}

impl std::fmt::Display for RealParameter {
    /// Human-readable dump: `id[dimension] (lower,upper): v0 v1 ...`.
    /// Advisory format, not a stability contract.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}] {}:", self.id, self.values.len(), self.bounds)?;
        for value in self.values.iter() {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}
