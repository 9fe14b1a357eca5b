//! rust_phylogeny — Bayesian phylogenetic inference core with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the sampler-facing parameter state to Python via the
//! `_rust_phylogeny` extension module. The crate implements the two pillars
//! of a single-chain inference engine: a composite parameter state with
//! transactional store/restore semantics ([`state`]), and
//! pattern-deduplicated likelihood evaluation with explicit quiet-write /
//! staleness-mark invalidation ([`likelihood`], [`substitution`], [`tree`]).
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`state`, `likelihood`, `substitution`,
//!   `tree`) as the public crate surface.
//! - Define the `#[pyclass]` wrapper and `#[pymodule]` initializer for the
//!   `_rust_phylogeny` Python extension when the `python-bindings` feature is
//!   enabled.
//! - Create and register the `state` Python submodule under `rust_phylogeny`
//!   so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input validation, and error mapping.
//! - Python-visible types mirror the invariants and signatures of their Rust
//!   counterparts (`CompoundParameter` in particular).
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_phylogeny.<submodule>` and are
//!   typically wrapped by thin pure-Python facades in a top-level
//!   `rust_phylogeny` package.
//! - Errors from core Rust code are propagated as rich error types
//!   internally and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on the inner modules and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports the `_rust_phylogeny` module defined
//!   here and wraps its classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   pipeline test in `tests/`; smoke tests for the PyO3 bindings verify
//!   construction and round trips from Python.

pub mod likelihood;
pub mod state;
pub mod substitution;
pub mod tree;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyList};

#[cfg(feature = "python-bindings")]
use crate::{state::compound_parameter::CompoundParameter, utils::build_compound_parameter};

/// CompoundState — Python-facing wrapper for the composite parameter state.
///
/// Purpose
/// -------
/// Expose [`CompoundParameter`] to Python callers while preserving the core
/// Rust invariants: flat-index routing, shared-bounds enforcement, quiet
/// writes, and transactional store/restore.
///
/// Key behaviors
/// -------------
/// - Construct from parallel sub-parameter ids and value arrays with one
///   shared bound pair.
/// - Forward reads, loud/quiet writes, store/restore, validation, and
///   dirty-state queries to the inner [`CompoundParameter`].
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `CompoundParameter(id, sub_ids, sub_values, lower=-inf, upper=inf)`:
/// - `id`: `str` — identifier for diagnostics.
/// - `sub_ids`: `list[str]` — one id per sub-parameter, in order.
/// - `sub_values`: `list` of 1-D float64 array-likes — initial values per
///   sub-parameter.
/// - `lower`, `upper`: `float` — shared inclusive bounds; default unbounded.
///
/// Fields
/// ------
/// - `inner`: [`CompoundParameter`]
///   Rust-side composite holding all sub-parameter state.
///
/// Invariants
/// ----------
/// - `inner` is always a validly constructed compound: non-empty, with
///   shared bounds verified at construction.
///
/// Notes
/// -----
/// - Native Rust callers should use [`CompoundParameter`] directly; this
///   type exists solely for the PyO3 binding surface.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "CompoundParameter", module = "rust_phylogeny.state")]
pub struct CompoundState {
    /// Underlying Rust composite parameter.
    pub inner: CompoundParameter,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl CompoundState {
    #[new]
    #[pyo3(
        signature = (id, sub_ids, sub_values, lower = f64::NEG_INFINITY, upper = f64::INFINITY),
        text_signature = "(id, sub_ids, sub_values, /, lower=-inf, upper=inf)"
    )]
    pub fn compound<'py>(
        py: Python<'py>, id: &str, sub_ids: Vec<String>, sub_values: &Bound<'py, PyList>,
        lower: f64, upper: f64,
    ) -> PyResult<Self> {
        let inner = build_compound_parameter(py, id, sub_ids, sub_values, lower, upper)?;
        Ok(CompoundState { inner })
    }

    /// Total flat dimension across all sub-parameters.
    #[getter]
    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    /// Number of owned sub-parameters.
    #[getter]
    pub fn parameter_count(&self) -> usize {
        self.inner.parameter_count()
    }

    /// Read the value at a flat index.
    pub fn value(&self, index: usize) -> PyResult<f64> {
        Ok(self.inner.value(index)?)
    }

    /// All values flattened in sub-parameter order.
    pub fn values(&self) -> Vec<f64> {
        self.inner.values().to_vec()
    }

    /// Write a value at a flat index, marking the owning sub-parameter
    /// dirty.
    pub fn set(&mut self, index: usize, value: f64) -> PyResult<()> {
        Ok(self.inner.set(index, value)?)
    }

    /// Write a value at a flat index without touching dirty state.
    pub fn set_quietly(&mut self, index: usize, value: f64) -> PyResult<()> {
        Ok(self.inner.set_quietly(index, value)?)
    }

    /// Snapshot every sub-parameter.
    pub fn store(&mut self) {
        self.inner.store();
    }

    /// Restore every sub-parameter to its last snapshot.
    pub fn restore(&mut self) -> PyResult<()> {
        Ok(self.inner.restore()?)
    }

    /// Check every value against the shared bounds.
    pub fn validate(&self) -> PyResult<()> {
        Ok(self.inner.validate()?)
    }

    /// Indices of sub-parameters marked dirty since the last clear.
    pub fn dirty_parameters(&self) -> Vec<usize> {
        self.inner.dirty_parameters()
    }

    /// The sub-parameter most recently touched by a loud write, if any.
    pub fn last_dirty(&self) -> Option<usize> {
        self.inner.last_dirty()
    }

    /// Clear all composite-level dirty state.
    pub fn clear_dirty(&mut self) {
        self.inner.clear_dirty();
    }

    /// Independent deep copy with clean dirty state.
    pub fn copy(&self) -> PyResult<Self> {
        Ok(CompoundState { inner: self.inner.copy()? })
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

/// _rust_phylogeny — PyO3 module initializer for the Python extension.
///
/// Purpose
/// -------
/// Define the `_rust_phylogeny` Python module and register its submodules
/// used by the public `rust_phylogeny` package.
///
/// Key behaviors
/// -------------
/// - Create the `state` submodule and attach it to the parent module.
/// - Register the submodule in `sys.modules` so it is importable via a
///   dotted path from Python.
///
/// Parameters
/// ----------
/// - `_py`: [`Python`]
///   GIL token provided by PyO3 during module initialization.
/// - `m`: `&Bound<PyModule>`
///   Module object representing `_rust_phylogeny`.
///
/// Returns
/// -------
/// `PyResult<()>`
///   `Ok(())` on success, or a Python exception if registration fails.
///
/// Notes
/// -----
/// - This function is invoked automatically by Python when importing the
///   compiled extension; it is not called directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_phylogeny<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let state_mod = PyModule::new(_py, "state")?;
    state(_py, m, &state_mod)?;

    // Manually add the submodule into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_phylogeny.state", state_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn state<'py>(
    _py: Python, rust_phylogeny: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<CompoundState>()?;
    rust_phylogeny.add_submodule(m)?;
    Ok(())
}
