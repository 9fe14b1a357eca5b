//! Compound parameter — one flat, addressable state node over many owned
//! real parameters.
//!
//! Purpose
//! -------
//! Aggregate an ordered list of [`RealParameter`] instances behind a single
//! flat dimension space so the sampler can propose, read, and revert values
//! through one handle, while dirty tracking records which sub-parameter a
//! write landed in for incremental-recompute hints.
//!
//! Key behaviors
//! -------------
//! - A flat-index lookup table `(owner, local)` is built once at
//!   construction from the sub-parameter dimensions and never resized;
//!   changing the compound's dimension is explicitly unsupported.
//! - All sub-parameters must share one `(lower, upper)` pair; a mismatch is
//!   a hard construction failure naming the offending sub-parameter. The
//!   check is pure (structured error, no output).
//! - `set` routes through the owner's *quiet* write and marks the owner
//!   dirty at the compound level; `set_quietly` routes the same write and
//!   touches no dirty state at all.
//! - `store`/`restore` fan out to every sub-parameter unconditionally —
//!   cheap because sub-parameters are small, and correct even if dirty
//!   tracking under-reports.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ownership is exclusive and arena-style: the compound owns storage for
//!   all sub-parameter state, referenced by stable indices, so `copy` is a
//!   structural clone with no aliasing hazards.
//! - `dimension() == Σ parameter(i).dimension()` always holds.
//! - Dirty state is explicit, queryable data (`dirty_parameters`,
//!   `last_dirty`), never ambient fields shared across unrelated call
//!   paths.
use crate::state::bounds::Bounds;
use crate::state::errors::{StateError, StateResult};
use crate::state::real_parameter::RealParameter;
use crate::state::validation::{validate_index, validate_shared_bounds};
use ndarray::Array1;

/// Ordered aggregation of exclusively-owned [`RealParameter`]s behind one
/// flat dimension space.
///
/// Built once from a validated, non-empty list; sub-parameters keep their
/// independent identity (id, per-value dirty flags) for collaborators that
/// reference them directly, but all write routing goes through the
/// compound.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundParameter {
    id: String,
    parameters: Vec<RealParameter>,
    /// Flat index -> (owner index, local index), built at construction.
    lookup: Vec<(usize, usize)>,
    bounds: Bounds,
    /// One dirty flag per owned sub-parameter.
    dirty: Vec<bool>,
    last_dirty: Option<usize>,
}

impl CompoundParameter {
    /// Build a compound from a non-empty, ordered sub-parameter list.
    ///
    /// Computes the total dimension, builds the flat-index lookup table, and
    /// verifies shared bounds before any value can be read.
    ///
    /// # Errors
    /// - [`StateError::EmptyCompound`] for an empty list.
    /// - [`StateError::BoundMismatch`] naming the first sub-parameter whose
    ///   bounds disagree with the first sub-parameter's pair.
    pub fn new(id: impl Into<String>, parameters: Vec<RealParameter>) -> StateResult<CompoundParameter> {
        let bounds = validate_shared_bounds(&parameters)?;
        let mut lookup = Vec::new();
        for (owner, parameter) in parameters.iter().enumerate() {
            for local in 0..parameter.dimension() {
                lookup.push((owner, local));
            }
        }
        let dirty = vec![false; parameters.len()];
        Ok(CompoundParameter { id: id.into(), parameters, lookup, bounds, dirty, last_dirty: None })
    }

    /// Identifier used in diagnostics.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Total flat dimension, `Σ` of the sub-parameter dimensions.
    pub fn dimension(&self) -> usize {
        self.lookup.len()
    }

    /// Number of owned sub-parameters.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Shared inclusive bound pair.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Borrow the sub-parameter at `index`.
    pub fn parameter(&self, index: usize) -> StateResult<&RealParameter> {
        validate_index(index, self.parameters.len())?;
        Ok(&self.parameters[index])
    }

    /// Resolve a flat index to its `(owner, local)` pair.
    pub fn resolve(&self, flat_index: usize) -> StateResult<(usize, usize)> {
        validate_index(flat_index, self.lookup.len())?;
        Ok(self.lookup[flat_index])
    }

    /// Read the value at `flat_index` through the lookup table.
    pub fn value(&self, flat_index: usize) -> StateResult<f64> {
        let (owner, local) = self.resolve(flat_index)?;
        self.parameters[owner].value(local)
    }

    /// All values flattened in sub-parameter order.
    pub fn values(&self) -> Array1<f64> {
        let mut flat = Vec::with_capacity(self.lookup.len());
        for parameter in &self.parameters {
            flat.extend(parameter.values().iter().copied());
        }
        Array1::from_vec(flat)
    }

    /// Write `value` at `flat_index`, marking the owning sub-parameter
    /// dirty at the compound level and recording it as last touched.
    ///
    /// The write is delegated to the owner's quiet primitive; sub-parameter
    /// per-value flags stay clean so downstream consumers see exactly one
    /// dirty signal per proposal, at compound granularity.
    pub fn set(&mut self, flat_index: usize, value: f64) -> StateResult<()> {
        let (owner, local) = self.resolve(flat_index)?;
        self.parameters[owner].set_quietly(local, value)?;
        self.dirty[owner] = true;
        self.last_dirty = Some(owner);
        Ok(())
    }

    /// Write `value` at `flat_index` without touching any dirty state,
    /// compound-level or sub-parameter-level.
    pub fn set_quietly(&mut self, flat_index: usize, value: f64) -> StateResult<()> {
        let (owner, local) = self.resolve(flat_index)?;
        self.parameters[owner].set_quietly(local, value)
    }

    /// Snapshot every sub-parameter unconditionally.
    pub fn store(&mut self) {
        for parameter in &mut self.parameters {
            parameter.store();
        }
    }

    /// Restore every sub-parameter unconditionally.
    ///
    /// Fails with [`StateError::InvalidState`] if any sub-parameter has no
    /// prior snapshot.
    pub fn restore(&mut self) -> StateResult<()> {
        for parameter in &mut self.parameters {
            parameter.restore()?;
        }
        Ok(())
    }

    /// Check every sub-parameter's values against the shared bounds.
    pub fn validate(&self) -> StateResult<()> {
        for parameter in &self.parameters {
            parameter.validate()?;
        }
        Ok(())
    }

    /// The compound dimension is derived, not settable.
    pub fn set_dimension(&mut self, _dimension: usize) -> StateResult<()> {
        Err(StateError::UnsupportedOperation { operation: "set_dimension" })
    }

    /// Intentionally unsupported; semantics were never defined upstream.
    pub fn assign_to(&self, _other: &mut CompoundParameter) -> StateResult<()> {
        Err(StateError::UnsupportedOperation { operation: "assign_to" })
    }

    /// Intentionally unsupported; semantics were never defined upstream.
    pub fn assign_from(&mut self, _other: &CompoundParameter) -> StateResult<()> {
        Err(StateError::UnsupportedOperation { operation: "assign_from" })
    }

    /// Deep-clone every sub-parameter in order and rebuild a fresh compound
    /// (new lookup table, clean dirty state).
    ///
    /// Fails if the rebuilt compound would be invalid, which cannot happen
    /// for a compound that was itself validly constructed but keeps the
    /// whole operation atomic.
    pub fn copy(&self) -> StateResult<CompoundParameter> {
        let clones = self.parameters.iter().map(|parameter| parameter.copy()).collect();
        CompoundParameter::new(self.id.clone(), clones)
    }

    /// Sub-parameter indices marked dirty since the last clear, in order.
    pub fn dirty_parameters(&self) -> Vec<usize> {
        self.dirty.iter().enumerate().filter(|(_, &flag)| flag).map(|(i, _)| i).collect()
    }

    /// Whether the sub-parameter at `index` is marked dirty.
    pub fn is_parameter_dirty(&self, index: usize) -> StateResult<bool> {
        validate_index(index, self.dirty.len())?;
        Ok(self.dirty[index])
    }

    /// The sub-parameter most recently touched by a loud write, if any.
    pub fn last_dirty(&self) -> Option<usize> {
        self.last_dirty
    }

    /// Clear compound-level dirty flags and the last-touched record.
    pub fn clear_dirty(&mut self) {
        self.dirty.iter_mut().for_each(|flag| *flag = false);
        self.last_dirty = None;
    }

    /// Set every dirty flag, compound-level and per-value in every
    /// sub-parameter, to `flag`.
    pub fn set_everything_dirty(&mut self, flag: bool) {
        self.dirty.iter_mut().for_each(|slot| *slot = flag);
        if !flag {
            self.last_dirty = None;
        }
        for parameter in &mut self.parameters {
            parameter.set_everything_dirty(flag);
        }
    }
}

impl std::fmt::Display for CompoundParameter {
    /// Human-readable dump: `id[dimension] (lower,upper): all values`.
    /// Advisory format, not a stability contract.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}] {}:", self.id, self.dimension(), self.bounds)?;
        for parameter in &self.parameters {
            for value in parameter.values().iter() {
                write!(f, " {value}")?;
            }
        }
        Ok(())
    }
}
