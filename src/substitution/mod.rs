//! substitution — nucleotide substitution models: tagged dispatch,
//! indicator-gated averaging, and errors.
//!
//! Purpose
//! -------
//! Provide the substitution-process side of likelihood evaluation: a closed
//! [`SubstitutionModel`] dispatch enum, the indicator-gated
//! [`NtdAveraging`] model spanning JC69 through GTR, and the analytic
//! [`JukesCantor`] baseline. The likelihood layer shares one model instance
//! across all per-pattern evaluators and asks it for transition probability
//! matrices per branch.
//!
//! Key behaviors
//! -------------
//! - [`NtdAveraging`] owns its named parameters as `RealParameter`s, gates
//!   structure on a `model_choose` indicator, and caches the spectral
//!   decomposition of its normalized rate matrix. Staleness is an explicit
//!   caller signal (`mark_stale`); quiet parameter writes never invalidate
//!   the cache on their own.
//! - [`JukesCantor`] evaluates the closed-form transition probabilities
//!   with no cache.
//! - [`SubstitutionModel`] forwards evaluation to the active variant and
//!   exposes a [`SubstitutionModelKind`] tag so collaborators needing a
//!   specific variant can fail with a structured error.
//!
//! Invariants & assumptions
//! ------------------------
//! - State order is A=0, C=1, G=2, T=3; branch lengths are expected
//!   substitutions per site (rate matrices are normalized to unit expected
//!   rate).
//! - Models are single-owner, interior-mutable, and not thread-safe.
//!
//! Conventions
//! -----------
//! - No I/O and no logging; all failures are [`SubstitutionError`] values.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`ntd_averaging`] cover indicator gating, rate-matrix
//!   structure, stochasticity of `P(t)`, the analytic JC69 cross-check at
//!   indicator 0, and staleness semantics.
//! - Unit tests in [`model`] cover enum forwarding and the closed-form
//!   Jukes-Cantor probabilities.

pub mod errors;
pub mod model;
pub mod ntd_averaging;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{SubstitutionError, SubstitutionResult};
pub use self::model::{JukesCantor, SubstitutionModel, SubstitutionModelKind};
pub use self::ntd_averaging::{NtdAveraging, STATE_COUNT};
