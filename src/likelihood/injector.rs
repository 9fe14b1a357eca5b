//! Batched quiet-write injection of proposal values into the shared model.
//!
//! Purpose
//! -------
//! Bridge the sampler's proposal vectors and the shared substitution model:
//! write a whole batch of model parameters quietly (no dirty flags, no
//! cache invalidation per write), issue exactly one staleness mark, then
//! evaluate the requested site through the pattern cache. This keeps the
//! invalidation contract explicit and cheap: one decomposition refresh per
//! proposal, regardless of how many parameters moved.
//!
//! Key behaviors
//! -------------
//! - Injection requires the nucleotide-averaging model variant; any other
//!   variant fails with [`LikelihoodError::UnsupportedModel`] carrying the
//!   tag that was found, before any write happens.
//! - Write order is fixed: log kappa, log TN ratio, log AC, log AT, log GC
//!   (read from the first five entries of the proposal parameter), the
//!   model-selector scalar, then up to four frequency components.
//! - [`ParameterInjector::apply_rate_only`] skips the staleness mark: the
//!   site-rate scalar is read at evaluation time, not baked into the cached
//!   decomposition, so a rate-only proposal reuses the decomposition as-is.
use std::cell::RefCell;
use std::rc::Rc;

use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::pattern_cache::PatternLikelihoodCache;
use crate::state::real_parameter::RealParameter;
use crate::substitution::model::SubstitutionModel;

/// Maximum number of frequency components consumed from a proposal.
const MAX_FREQUENCIES: usize = 4;

/// Writes proposal batches into the shared model and evaluates through the
/// cache.
pub struct ParameterInjector {
    model: Rc<RefCell<SubstitutionModel>>,
    site_rate: Rc<RefCell<RealParameter>>,
    cache: Rc<PatternLikelihoodCache>,
}

impl ParameterInjector {
    /// Wire the injector to the shared model, site-rate scalar, and cache.
    ///
    /// The model and site-rate handles must be the same ones the cache's
    /// evaluators were bound to; the injector performs no re-binding.
    pub fn new(
        model: Rc<RefCell<SubstitutionModel>>, site_rate: Rc<RefCell<RealParameter>>,
        cache: Rc<PatternLikelihoodCache>,
    ) -> ParameterInjector {
        ParameterInjector { model, site_rate, cache }
    }

    /// Inject a proposal batch and evaluate one site.
    ///
    /// `model_parameters` supplies the five log rates at indices 0-4;
    /// `model_code` is the model-selector value; `frequencies` supplies up
    /// to four equilibrium-frequency components. Exactly one staleness mark
    /// follows the batch.
    pub fn apply(
        &self, model_parameters: &RealParameter, model_code: f64, frequencies: &[f64],
        site: usize,
    ) -> LikelihoodResult<f64> {
        self.inject(model_parameters, model_code, frequencies)?;
        self.model.borrow().mark_stale();
        self.cache.evaluate_site(site)
    }

    /// Inject a proposal batch including the site-rate scalar, then
    /// evaluate one site.
    pub fn apply_with_rate(
        &self, model_parameters: &RealParameter, model_code: f64, frequencies: &[f64],
        rate: f64, site: usize,
    ) -> LikelihoodResult<f64> {
        self.inject(model_parameters, model_code, frequencies)?;
        self.site_rate.borrow_mut().set_quietly(0, rate)?;
        self.model.borrow().mark_stale();
        self.cache.evaluate_site(site)
    }

    /// Quiet-write only the site-rate scalar and evaluate one site.
    ///
    /// No staleness mark: the rate scales branch lengths at evaluation
    /// time and is not part of the cached decomposition.
    pub fn apply_rate_only(&self, rate: f64, site: usize) -> LikelihoodResult<f64> {
        self.site_rate.borrow_mut().set_quietly(0, rate)?;
        self.cache.evaluate_site(site)
    }

    /// The cache this injector evaluates through.
    pub fn cache(&self) -> &PatternLikelihoodCache {
        &self.cache
    }

    /// Quiet-write the batch into the averaging model, in fixed order.
    fn inject(
        &self, model_parameters: &RealParameter, model_code: f64, frequencies: &[f64],
    ) -> LikelihoodResult<()> {
        let mut model = self.model.borrow_mut();
        match &mut *model {
            SubstitutionModel::NucleotideAveraging(averaging) => {
                averaging.set_log_kappa_quietly(model_parameters.value(0)?)?;
                averaging.set_log_tn_quietly(model_parameters.value(1)?)?;
                averaging.set_log_ac_quietly(model_parameters.value(2)?)?;
                averaging.set_log_at_quietly(model_parameters.value(3)?)?;
                averaging.set_log_gc_quietly(model_parameters.value(4)?)?;
                averaging.set_model_choose_quietly(model_code)?;
                for (index, &frequency) in
                    frequencies.iter().take(MAX_FREQUENCIES).enumerate()
                {
                    averaging.set_frequency_quietly(index, frequency)?;
                }
                Ok(())
            }
            other => Err(LikelihoodError::UnsupportedModel { found: other.kind() }),
        }
    }
}

impl std::fmt::Debug for ParameterInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterInjector").finish_non_exhaustive()
    }
}
