//! Column-deduplicating alignment container implementing [`PatternSource`].
//!
//! Purpose
//! -------
//! Provide the in-crate pattern source used by tests, demos, and
//! single-chain setups: an encoded alignment whose identical columns are
//! collapsed into unique patterns at construction, in first-occurrence
//! order, so downstream evaluation pays per pattern instead of per site.
//!
//! Key behaviors
//! -------------
//! - Built from per-taxon encoded sequences (rows); columns are compared as
//!   whole per-taxon state vectors, so ambiguity codes participate in
//!   deduplication like any other code.
//! - Pattern numbering is deterministic: patterns appear in the order their
//!   first site occurs.
//! - State codes at or above `state_count` are accepted and passed through
//!   as ambiguity/gap codes; the evaluator resolves them.
use std::collections::HashMap;

use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::traits::{PatternSource, SiteColumn};

/// Encoded alignment with deduplicated columns.
#[derive(Debug, Clone)]
pub struct CompressedAlignment {
    state_count: usize,
    taxon_count: usize,
    /// Unique columns in first-occurrence order, one state per taxon each.
    patterns: Vec<Vec<usize>>,
    site_to_pattern: Vec<usize>,
}

impl CompressedAlignment {
    /// Build from per-taxon encoded sequences.
    ///
    /// All sequences must be non-empty and of equal length;
    /// `state_count >= 2`. Violations fail with
    /// [`LikelihoodError::InconsistentPatternSource`].
    pub fn from_sequences(
        sequences: &[Vec<usize>], state_count: usize,
    ) -> LikelihoodResult<CompressedAlignment> {
        if state_count < 2 {
            return Err(inconsistent(format!(
                "an encoding needs at least 2 states; got {state_count}"
            )));
        }
        let taxon_count = sequences.len();
        if taxon_count == 0 {
            return Err(inconsistent("an alignment requires at least one taxon".to_string()));
        }
        let site_count = sequences[0].len();
        if site_count == 0 {
            return Err(inconsistent("an alignment requires at least one site".to_string()));
        }
        for (taxon, sequence) in sequences.iter().enumerate() {
            if sequence.len() != site_count {
                return Err(inconsistent(format!(
                    "taxon {taxon} has {} sites but taxon 0 has {site_count}",
                    sequence.len()
                )));
            }
        }

        let mut patterns: Vec<Vec<usize>> = Vec::new();
        let mut site_to_pattern = Vec::with_capacity(site_count);
        let mut seen: HashMap<Vec<usize>, usize> = HashMap::new();
        for site in 0..site_count {
            let column: Vec<usize> =
                sequences.iter().map(|sequence| sequence[site]).collect();
            let pattern = match seen.get(&column) {
                Some(&pattern) => pattern,
                None => {
                    let pattern = patterns.len();
                    seen.insert(column.clone(), pattern);
                    patterns.push(column);
                    pattern
                }
            };
            site_to_pattern.push(pattern);
        }

        Ok(CompressedAlignment { state_count, taxon_count, patterns, site_to_pattern })
    }

    /// Number of taxa (rows).
    pub fn taxon_count(&self) -> usize {
        self.taxon_count
    }
}

fn inconsistent(reason: String) -> LikelihoodError {
    LikelihoodError::InconsistentPatternSource { reason }
}

impl PatternSource for CompressedAlignment {
    fn site_count(&self) -> usize {
        self.site_to_pattern.len()
    }

    fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn pattern_index_of(&self, site: usize) -> usize {
        self.site_to_pattern[site]
    }

    fn state_count(&self) -> usize {
        self.state_count
    }

    fn column(&self, site: usize) -> LikelihoodResult<SiteColumn> {
        if site >= self.site_to_pattern.len() {
            return Err(LikelihoodError::SiteOutOfRange {
                site,
                site_count: self.site_to_pattern.len(),
            });
        }
        Ok(SiteColumn::new(self.patterns[self.site_to_pattern[site]].clone()))
    }
}
