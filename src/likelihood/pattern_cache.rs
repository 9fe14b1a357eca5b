//! Lazily-built, pattern-deduplicated cache of per-column evaluators.
//!
//! Purpose
//! -------
//! Hold one [`SiteLikelihood`] evaluator slot per distinct pattern,
//! building each on first use from the pattern's representative column and
//! the shared tree / model / site-rate collaborators. Site-level requests
//! resolve through the [`PatternIndex`], so all sites sharing a pattern
//! share one evaluator instance (observable via `is_built` /
//! `built_count`).
//!
//! Key behaviors
//! -------------
//! - Construction verifies the pattern source through
//!   [`PatternIndex::from_source`] but builds no evaluators.
//! - Evaluator build failures (arity mismatch, bad collaborator shapes)
//!   surface on the evaluate call that first touches the pattern; the slot
//!   stays empty so the error repeats on retry rather than caching a broken
//!   evaluator.
//! - No dependency tracking: callers quiet-write parameters and mark the
//!   model stale themselves (usually through
//!   [`ParameterInjector`](crate::likelihood::ParameterInjector)); the
//!   cache just evaluates.
use std::cell::RefCell;
use std::rc::Rc;

use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::pattern_index::PatternIndex;
use crate::likelihood::site_likelihood::SiteLikelihood;
use crate::likelihood::traits::{PatternSource, TreeTopology};
use crate::state::real_parameter::RealParameter;
use crate::substitution::model::SubstitutionModel;

/// Per-pattern evaluator cache over a verified pattern index.
pub struct PatternLikelihoodCache {
    index: PatternIndex,
    source: Rc<dyn PatternSource>,
    tree: Rc<dyn TreeTopology>,
    model: Rc<RefCell<SubstitutionModel>>,
    site_rate: Rc<RefCell<RealParameter>>,
    evaluators: RefCell<Vec<Option<Rc<SiteLikelihood>>>>,
}

impl PatternLikelihoodCache {
    /// Build the cache, verifying the source's site -> pattern contract.
    ///
    /// No evaluators are bound yet; each is built lazily on the first
    /// evaluation touching its pattern.
    pub fn new(
        source: Rc<dyn PatternSource>, tree: Rc<dyn TreeTopology>,
        model: Rc<RefCell<SubstitutionModel>>, site_rate: Rc<RefCell<RealParameter>>,
    ) -> LikelihoodResult<PatternLikelihoodCache> {
        let index = PatternIndex::from_source(source.as_ref())?;
        let evaluators = RefCell::new(vec![None; index.pattern_count()]);
        Ok(PatternLikelihoodCache { index, source, tree, model, site_rate, evaluators })
    }

    /// The verified site -> pattern index.
    pub fn pattern_index(&self) -> &PatternIndex {
        &self.index
    }

    /// Number of distinct patterns.
    pub fn pattern_count(&self) -> usize {
        self.index.pattern_count()
    }

    /// Number of alignment sites.
    pub fn site_count(&self) -> usize {
        self.index.site_count()
    }

    /// Whether the evaluator for `pattern` has been built.
    pub fn is_built(&self, pattern: usize) -> LikelihoodResult<bool> {
        if pattern >= self.index.pattern_count() {
            return Err(LikelihoodError::PatternOutOfRange {
                pattern,
                pattern_count: self.index.pattern_count(),
            });
        }
        Ok(self.evaluators.borrow()[pattern].is_some())
    }

    /// Number of evaluators built so far.
    pub fn built_count(&self) -> usize {
        self.evaluators.borrow().iter().filter(|slot| slot.is_some()).count()
    }

    /// Evaluate the log-likelihood of one pattern, binding its evaluator
    /// on first use.
    pub fn evaluate(&self, pattern: usize) -> LikelihoodResult<f64> {
        self.evaluator(pattern)?.evaluate()
    }

    /// Evaluate the log-likelihood of one site, resolving its pattern
    /// first.
    pub fn evaluate_site(&self, site: usize) -> LikelihoodResult<f64> {
        let pattern = self.index.pattern_of(site)?;
        self.evaluate(pattern)
    }

    /// Fetch or lazily bind the evaluator for `pattern`.
    fn evaluator(&self, pattern: usize) -> LikelihoodResult<Rc<SiteLikelihood>> {
        if pattern >= self.index.pattern_count() {
            return Err(LikelihoodError::PatternOutOfRange {
                pattern,
                pattern_count: self.index.pattern_count(),
            });
        }
        if let Some(evaluator) = &self.evaluators.borrow()[pattern] {
            return Ok(Rc::clone(evaluator));
        }
        let representative = self.index.representative(pattern)?;
        let column = self.source.column(representative)?;
        let evaluator = Rc::new(SiteLikelihood::bind(
            column,
            Rc::clone(&self.tree),
            Rc::clone(&self.model),
            Rc::clone(&self.site_rate),
        )?);
        self.evaluators.borrow_mut()[pattern] = Some(Rc::clone(&evaluator));
        Ok(evaluator)
    }
}

impl std::fmt::Debug for PatternLikelihoodCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternLikelihoodCache")
            .field("pattern_count", &self.pattern_count())
            .field("built_count", &self.built_count())
            .finish_non_exhaustive()
    }
}
