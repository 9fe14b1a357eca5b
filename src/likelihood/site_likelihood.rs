//! Per-pattern likelihood evaluator: Felsenstein pruning over one column.
//!
//! Purpose
//! -------
//! Evaluate the log-likelihood of a single alignment column given the
//! shared tree, substitution model, and site-rate scalar. One evaluator is
//! bound per pattern by the cache; sites sharing a pattern share the bound
//! instance, and the column data it closes over never changes after
//! binding.
//!
//! Key behaviors
//! -------------
//! - `bind` resolves the evaluator against its collaborators up front:
//!   column arity vs. tree leaves, taxon indices in range, site-rate shape.
//!   Resolution failures are structured errors before any numeric work.
//! - `evaluate` walks the tree in postorder, initializing leaf partials
//!   from the column (one-hot for concrete states, all-ones for
//!   ambiguity/gap codes) and combining child partials through the model's
//!   transition probabilities, with every branch length scaled by the
//!   current site rate. The root partials are folded against the
//!   equilibrium frequencies and the log of the result is the explicit
//!   return value.
//! - No dependency tracking: the evaluator reads whatever the shared model
//!   and rate currently hold. Callers coordinate quiet writes and staleness
//!   marks before evaluating.
//!
//! Invariants & assumptions
//! ------------------------
//! - The partials scratch matrix is reused across evaluations through a
//!   `RefCell`; evaluators are single-owner and not thread-safe.
//! - A non-positive or non-finite column likelihood is a
//!   [`LikelihoodError::NumericalFailure`], never a silent NaN.
use std::cell::RefCell;
use std::rc::Rc;

use ndarray::Array2;

use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::traits::{SiteColumn, TreeTopology};
use crate::state::real_parameter::RealParameter;
use crate::substitution::model::SubstitutionModel;

/// Bound evaluator for one alignment column.
pub struct SiteLikelihood {
    column: SiteColumn,
    tree: Rc<dyn TreeTopology>,
    model: Rc<RefCell<SubstitutionModel>>,
    site_rate: Rc<RefCell<RealParameter>>,
    /// Scratch partials, one row per tree node.
    partials: RefCell<Array2<f64>>,
}

impl SiteLikelihood {
    /// Bind a column to the shared tree, model, and site-rate scalar.
    ///
    /// # Errors
    /// [`LikelihoodError::ModelResolution`] when the column's taxon count
    /// disagrees with the tree's leaf count, a leaf names a taxon outside
    /// the column, or the site-rate parameter is not a scalar.
    pub fn bind(
        column: SiteColumn, tree: Rc<dyn TreeTopology>, model: Rc<RefCell<SubstitutionModel>>,
        site_rate: Rc<RefCell<RealParameter>>,
    ) -> LikelihoodResult<SiteLikelihood> {
        let leaf_count = tree.leaf_count();
        if column.taxon_count() != leaf_count {
            return Err(LikelihoodError::ModelResolution {
                reason: format!(
                    "column has {} taxa but the tree has {leaf_count} leaves",
                    column.taxon_count()
                ),
            });
        }
        for node in 0..tree.node_count() {
            if let Some(taxon) = tree.leaf_taxon(node) {
                if taxon >= column.taxon_count() {
                    return Err(LikelihoodError::ModelResolution {
                        reason: format!(
                            "leaf {node} names taxon {taxon}, past {} column entries",
                            column.taxon_count()
                        ),
                    });
                }
            }
        }
        {
            let rate = site_rate.borrow();
            if rate.dimension() != 1 {
                return Err(LikelihoodError::ModelResolution {
                    reason: format!(
                        "site-rate parameter '{}' must be a scalar; dimension is {}",
                        rate.id(),
                        rate.dimension()
                    ),
                });
            }
        }
        let state_count = model.borrow().state_count();
        let partials = RefCell::new(Array2::zeros((tree.node_count(), state_count)));
        Ok(SiteLikelihood { column, tree, model, site_rate, partials })
    }

    /// The column this evaluator is bound to.
    pub fn column(&self) -> &SiteColumn {
        &self.column
    }

    /// Prune the tree for this column and return the log-likelihood.
    ///
    /// Reads the current model and site rate; callers must have pushed any
    /// parameter updates (and marked the model stale) beforehand.
    pub fn evaluate(&self) -> LikelihoodResult<f64> {
        let model = self.model.borrow();
        let state_count = model.state_count();
        let rate = self.site_rate.borrow().value(0)?;
        if !rate.is_finite() || rate < 0.0 {
            return Err(LikelihoodError::NumericalFailure { context: "site rate scalar" });
        }

        let mut partials = self.partials.borrow_mut();
        for &node in self.tree.postorder() {
            match self.tree.leaf_taxon(node) {
                Some(taxon) => {
                    let code = self.column.states()[taxon];
                    for state in 0..state_count {
                        partials[[node, state]] =
                            if code >= state_count || code == state { 1.0 } else { 0.0 };
                    }
                }
                None => {
                    let mut combined = vec![1.0; state_count];
                    for &child in self.tree.children(node) {
                        let distance = self.tree.branch_length(child) * rate;
                        let probabilities = model.transition_probabilities(distance)?;
                        let child_partials = partials.row(child).to_owned();
                        for (state, slot) in combined.iter_mut().enumerate() {
                            let mut sum = 0.0;
                            for child_state in 0..state_count {
                                sum += probabilities[[state, child_state]]
                                    * child_partials[child_state];
                            }
                            *slot *= sum;
                        }
                    }
                    for state in 0..state_count {
                        partials[[node, state]] = combined[state];
                    }
                }
            }
        }

        let frequencies = model.frequencies()?;
        let root = self.tree.root();
        let mut likelihood = 0.0;
        for state in 0..state_count {
            likelihood += frequencies[state] * partials[[root, state]];
        }
        if !likelihood.is_finite() || likelihood <= 0.0 {
            return Err(LikelihoodError::NumericalFailure { context: "site likelihood" });
        }
        Ok(likelihood.ln())
    }
}

impl std::fmt::Debug for SiteLikelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteLikelihood").field("column", &self.column).finish_non_exhaustive()
    }
}
