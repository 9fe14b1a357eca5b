//! Capability traits for the likelihood layer's external collaborators.
//!
//! Purpose
//! -------
//! Decouple pattern-scoped likelihood evaluation from how alignments and
//! trees are produced. The cache and evaluators consume a [`PatternSource`]
//! (deduplicated alignment columns) and a [`TreeTopology`] (rooted tree with
//! branch lengths) through these traits only; concrete implementations live
//! in [`crate::likelihood::alignment`] and [`crate::tree`].
//!
//! Conventions
//! -----------
//! - Sites, patterns, taxa, and tree nodes are all 0-based indices.
//! - State codes at or above `state_count` encode ambiguity/gaps; the
//!   evaluator treats them as fully ambiguous observations.
//! - Both traits are read-only for this layer and must be stable for the
//!   lifetime of any evaluator bound to them.
use crate::likelihood::errors::LikelihoodResult;

/// One alignment column: the encoded character state observed at each
/// taxon, in taxon order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteColumn {
    states: Vec<usize>,
}

impl SiteColumn {
    /// Wrap the per-taxon state codes of one column.
    pub fn new(states: Vec<usize>) -> SiteColumn {
        SiteColumn { states }
    }

    /// Number of taxa in the column.
    pub fn taxon_count(&self) -> usize {
        self.states.len()
    }

    /// The per-taxon state codes in taxon order.
    pub fn states(&self) -> &[usize] {
        &self.states
    }
}

/// Deduplicated alignment view: a total `site -> pattern` map plus per-site
/// column access.
///
/// Contract: `pattern_index_of(site) < pattern_count()` for every valid
/// site, every pattern has at least one site, and the mapping is stable.
/// [`PatternIndex`](crate::likelihood::PatternIndex) re-verifies the
/// contract at construction and fails with `InconsistentPatternSource` on
/// violations.
pub trait PatternSource {
    /// Number of alignment sites (columns).
    fn site_count(&self) -> usize;

    /// Number of distinct patterns, `<= site_count`.
    fn pattern_count(&self) -> usize;

    /// Pattern holding the given site. Callers must pass a valid site.
    fn pattern_index_of(&self, site: usize) -> usize;

    /// Number of character states in the encoding.
    fn state_count(&self) -> usize;

    /// The encoded column at `site`, one state code per taxon.
    fn column(&self, site: usize) -> LikelihoodResult<SiteColumn>;
}

/// Rooted tree with branch lengths and taxon-indexed leaves, read-only for
/// likelihood evaluation.
///
/// `postorder()` must list every node exactly once with children before
/// their parent; `branch_length(node)` is the length of the branch above
/// `node` (unused for the root).
pub trait TreeTopology {
    /// Total number of nodes (leaves and internal).
    fn node_count(&self) -> usize;

    /// Index of the root node.
    fn root(&self) -> usize;

    /// All nodes, children before parents, root last.
    fn postorder(&self) -> &[usize];

    /// Child node indices of `node` (empty for leaves).
    fn children(&self, node: usize) -> &[usize];

    /// Length of the branch above `node`, in expected substitutions per
    /// site.
    fn branch_length(&self, node: usize) -> f64;

    /// The taxon observed at `node`, if it is a leaf.
    fn leaf_taxon(&self, node: usize) -> Option<usize>;

    /// Number of leaves.
    fn leaf_count(&self) -> usize {
        (0..self.node_count()).filter(|&node| self.leaf_taxon(node).is_some()).count()
    }
}
