//! state — sampler-facing parameter containers: real vectors, compounds,
//! bounds, validation, and errors.
//!
//! Purpose
//! -------
//! Provide the mutable state layer of the inference engine: named, bounded
//! real-parameter vectors with per-value dirty tracking, and the compound
//! parameter that aggregates many of them behind one flat dimension space.
//! This is the surface a Markov-chain sampler proposes against, and the
//! surface the likelihood layer's injector writes model values through.
//!
//! Key behaviors
//! -------------
//! - [`RealParameter`] stores a validated-on-demand vector of `f64` values
//!   with inclusive [`Bounds`], per-value dirty flags, and a shadow buffer
//!   implementing the transactional store/restore contract used across
//!   proposal accept/reject cycles. A row-major matrix facade addresses the
//!   same flat storage for matrix-shaped parameters.
//! - [`CompoundParameter`] owns an ordered list of sub-parameters, builds a
//!   flat-index lookup table once at construction, verifies shared bounds,
//!   and routes loud writes through quiet sub-parameter writes plus
//!   compound-granularity dirty marking.
//! - [`validation`] centralizes the index / bound / shared-bound checks so
//!   every container fails fast with the same structured errors.
//! - [`errors`] defines [`StateError`] and the [`StateResult`] alias, with a
//!   `PyErr` conversion under the `python-bindings` feature.
//!
//! Invariants & assumptions
//! ------------------------
//! - Indices are 0-based; bounds are inclusive on both ends; out-of-bounds
//!   values are flagged, never clamped.
//! - Quiet writes (`set_quietly`) change values only and touch no dirty
//!   state at any level; loud writes mark exactly one owner dirty.
//! - Store/restore round-trips are bit-exact; `restore` without a prior
//!   `store` is a contract violation surfaced as
//!   [`StateError::InvalidState`].
//! - Compound ownership is exclusive and arena-style: sub-parameters are
//!   owned by value, so copies are structural clones with no aliasing.
//!
//! Conventions
//! -----------
//! - This layer performs no I/O and no logging; bound verification returns
//!   structured errors naming the offender instead of printing.
//! - Operations the flat container cannot support (`set_dimension`,
//!   `assign_to`, `assign_from`) fail explicitly with
//!   [`StateError::UnsupportedOperation`] rather than being approximated.
//!
//! Downstream usage
//! ----------------
//! - The likelihood layer's injector quiet-writes substitution-model
//!   parameters through this surface before forcing a transition-matrix
//!   refresh; see `likelihood::ParameterInjector`.
//! - Python bindings wrap [`CompoundParameter`] and rely on the
//!   `StateError` → `PyErr` conversion defined in [`errors`].
//!
//! Testing notes
//! -------------
//! - Unit tests in [`real_parameter`] cover loud/quiet writes, bit-exact
//!   store/restore, bound-validation policy, the matrix facade, and copy
//!   independence.
//! - Unit tests in [`compound_parameter`] cover flat-index routing,
//!   dimension additivity, shared-bound enforcement, store/restore fan-out,
//!   unsupported operations, and deep copies.
//! - Unit tests in [`validation`] and [`errors`] cover the helpers and
//!   Display formatting respectively.

pub mod bounds;
pub mod compound_parameter;
pub mod errors;
pub mod real_parameter;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------
//
// The everyday types most users need. Validation helpers stay under
// `validation` for callers building their own containers.

pub use self::bounds::Bounds;
pub use self::compound_parameter::CompoundParameter;
pub use self::errors::{StateError, StateResult};
pub use self::real_parameter::RealParameter;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_phylogeny::state::prelude::*;
//
// to import the main parameter-state surface in a single line.

pub mod prelude {
    pub use super::{Bounds, CompoundParameter, RealParameter, StateError, StateResult};
}
