//! likelihood — pattern-deduplicated likelihood evaluation: indexing,
//! per-column evaluators, caching, and proposal injection.
//!
//! Purpose
//! -------
//! Evaluate the phylogenetic likelihood of alignment columns with the
//! minimum necessary computation: identical columns share one pattern and
//! one lazily-bound evaluator, proposal batches are quiet-written into the
//! shared substitution model with exactly one staleness mark, and every
//! log-likelihood is an explicit return value.
//!
//! Key behaviors
//! -------------
//! - [`PatternIndex`] freezes and re-verifies a [`PatternSource`]'s
//!   `site -> pattern` map with first-occurrence representative sites.
//! - [`SiteLikelihood`] runs Felsenstein pruning over one column, scaling
//!   every branch length by the shared site-rate scalar.
//! - [`PatternLikelihoodCache`] holds one evaluator slot per pattern,
//!   binding each on first use; sites sharing a pattern share one instance.
//! - [`ParameterInjector`] writes a proposal batch quietly into the
//!   nucleotide-averaging model, marks it stale exactly once, and
//!   evaluates; the rate-only path skips the staleness mark because the
//!   rate is read at evaluation time.
//! - [`CompressedAlignment`] is the in-crate [`PatternSource`] used by
//!   tests, demos, and single-chain setups.
//!
//! Invariants & assumptions
//! ------------------------
//! - No automatic dependency tracking: callers coordinate quiet writes and
//!   staleness marks (normally through the injector); the cache only
//!   evaluates.
//! - Shared collaborators use `Rc` / `RefCell`; everything here is
//!   single-owner within one chain and not thread-safe. Multi-chain use
//!   requires independent clones of the whole stack.
//! - Pattern and evaluator state are deterministic functions of the source
//!   and collaborators; rebuilding from the same inputs reproduces the same
//!   index, evaluator assignment, and values.
//!
//! Conventions
//! -----------
//! - Sites, patterns, taxa, and nodes are 0-based. State codes at or above
//!   `state_count` are ambiguity/gap codes.
//! - No I/O and no logging; all failures are [`LikelihoodError`] values,
//!   with state- and substitution-layer errors wrapped, not flattened.
//!
//! Downstream usage
//! ----------------
//! - Typical single-chain flow:
//!   1. Build a [`CompressedAlignment`] and a
//!      [`FixedTree`](crate::tree::FixedTree).
//!   2. Share a [`SubstitutionModel`](crate::substitution::SubstitutionModel)
//!      and a scalar site-rate
//!      [`RealParameter`](crate::state::RealParameter) behind
//!      `Rc<RefCell<...>>`.
//!   3. Build a [`PatternLikelihoodCache`] over them, then a
//!      [`ParameterInjector`].
//!   4. Per proposal, call `apply` / `apply_with_rate` /
//!      `apply_rate_only` and use the returned log-likelihood in the
//!      acceptance ratio.
//!
//! Testing notes
//! -------------
//! - Unit tests beside each type cover indexing determinism, pruning
//!   numerics against closed forms, lazy shared evaluators, injection
//!   sensitivity/idempotence, and the dispatch/rejection paths. The
//!   end-to-end pipeline test lives in
//!   `tests/integration_likelihood_pipeline.rs`.

pub mod alignment;
pub mod errors;
pub mod injector;
pub mod pattern_cache;
pub mod pattern_index;
pub mod site_likelihood;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::alignment::CompressedAlignment;
pub use self::errors::{LikelihoodError, LikelihoodResult};
pub use self::injector::ParameterInjector;
pub use self::pattern_cache::PatternLikelihoodCache;
pub use self::pattern_index::PatternIndex;
pub use self::site_likelihood::SiteLikelihood;
pub use self::traits::{PatternSource, SiteColumn, TreeTopology};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_phylogeny::likelihood::prelude::*;
//
// to import the main likelihood surface in a single line.

pub mod prelude {
    pub use super::{
        CompressedAlignment, LikelihoodError, LikelihoodResult, ParameterInjector, PatternIndex,
        PatternLikelihoodCache, PatternSource, SiteColumn, SiteLikelihood, TreeTopology,
    };
}
