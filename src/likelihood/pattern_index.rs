//! Verified site -> pattern map with per-pattern representative sites.
//!
//! Purpose
//! -------
//! Freeze a [`PatternSource`]'s deduplication bookkeeping into a compact,
//! re-verified index: a total `site -> pattern` map and, for each pattern,
//! the first site that exhibits it. The cache resolves site-level requests
//! through this index and binds one evaluator per pattern to its
//! representative column.
//!
//! Key behaviors
//! -------------
//! - Construction walks every site once; representatives are assigned
//!   first-occurrence-wins, ties broken by site order, so the index is
//!   deterministic for a given source.
//! - The source's contract is re-verified: a site mapping to a pattern at
//!   or past `pattern_count`, or a pattern left with no representative,
//!   fails construction with a structured reason.
use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};
use crate::likelihood::traits::PatternSource;

/// Sentinel for a pattern not yet assigned a representative during
/// construction.
const UNASSIGNED: usize = usize::MAX;

/// Immutable site -> pattern map with per-pattern representative sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternIndex {
    site_to_pattern: Vec<usize>,
    representatives: Vec<usize>,
}

impl PatternIndex {
    /// Build and verify the index from a pattern source.
    ///
    /// # Errors
    /// [`LikelihoodError::InconsistentPatternSource`] if the source maps a
    /// site past its own pattern count or declares a pattern no site
    /// exhibits.
    pub fn from_source(source: &dyn PatternSource) -> LikelihoodResult<PatternIndex> {
        let site_count = source.site_count();
        let pattern_count = source.pattern_count();
        let mut site_to_pattern = Vec::with_capacity(site_count);
        let mut representatives = vec![UNASSIGNED; pattern_count];
        for site in 0..site_count {
            let pattern = source.pattern_index_of(site);
            if pattern >= pattern_count {
                return Err(LikelihoodError::InconsistentPatternSource {
                    reason: format!(
                        "site {site} maps to pattern {pattern}, past {pattern_count} patterns"
                    ),
                });
            }
            if representatives[pattern] == UNASSIGNED {
                representatives[pattern] = site;
            }
            site_to_pattern.push(pattern);
        }
        if let Some(pattern) = representatives.iter().position(|&site| site == UNASSIGNED) {
            return Err(LikelihoodError::InconsistentPatternSource {
                reason: format!("pattern {pattern} has no representative site"),
            });
        }
        Ok(PatternIndex { site_to_pattern, representatives })
    }

    /// Number of alignment sites.
    pub fn site_count(&self) -> usize {
        self.site_to_pattern.len()
    }

    /// Number of distinct patterns.
    pub fn pattern_count(&self) -> usize {
        self.representatives.len()
    }

    /// Pattern holding the given site.
    pub fn pattern_of(&self, site: usize) -> LikelihoodResult<usize> {
        if site >= self.site_to_pattern.len() {
            return Err(LikelihoodError::SiteOutOfRange {
                site,
                site_count: self.site_to_pattern.len(),
            });
        }
        Ok(self.site_to_pattern[site])
    }

    /// First site exhibiting the given pattern.
    pub fn representative(&self, pattern: usize) -> LikelihoodResult<usize> {
        if pattern >= self.representatives.len() {
            return Err(LikelihoodError::PatternOutOfRange {
                pattern,
                pattern_count: self.representatives.len(),
            });
        }
        Ok(self.representatives[pattern])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::likelihood::traits::SiteColumn;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Deterministic mapping and first-occurrence representatives.
    // - Re-verification of the source contract at construction.
    // - Out-of-range site and pattern queries.
    //
    // They intentionally DO NOT cover:
    // - Evaluator binding to representative columns (covered in
    //   pattern_cache tests).
    // -------------------------------------------------------------------------

    /// Hand-rolled source whose mapping can be made deliberately broken.
    struct StubSource {
        site_to_pattern: Vec<usize>,
        pattern_count: usize,
    }

    impl PatternSource for StubSource {
        fn site_count(&self) -> usize {
            self.site_to_pattern.len()
        }
        fn pattern_count(&self) -> usize {
            self.pattern_count
        }
        fn pattern_index_of(&self, site: usize) -> usize {
            self.site_to_pattern[site]
        }
        fn state_count(&self) -> usize {
            4
        }
        fn column(&self, _site: usize) -> LikelihoodResult<SiteColumn> {
            Ok(SiteColumn::new(vec![0]))
        }
    }

    #[test]
    // Purpose
    // -------
    // The index reproduces the source's mapping and picks the first
    // occurrence of each pattern as its representative.
    //
    // Given
    // -----
    // - Five sites mapping to patterns [0, 1, 0, 2, 1].
    //
    // Expect
    // ------
    // - `pattern_of` matches the mapping; representatives are sites
    //   [0, 1, 3].
    fn representatives_are_first_occurrences() {
        // Arrange
        let source = StubSource { site_to_pattern: vec![0, 1, 0, 2, 1], pattern_count: 3 };

        // Act
        let index = PatternIndex::from_source(&source).unwrap();

        // Assert
        assert_eq!(index.site_count(), 5);
        assert_eq!(index.pattern_count(), 3);
        for (site, expected) in [(0, 0), (1, 1), (2, 0), (3, 2), (4, 1)] {
            assert_eq!(index.pattern_of(site).unwrap(), expected);
        }
        assert_eq!(index.representative(0).unwrap(), 0);
        assert_eq!(index.representative(1).unwrap(), 1);
        assert_eq!(index.representative(2).unwrap(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Rebuilding from the same source yields an identical index.
    //
    // Given
    // -----
    // - The same stub source indexed twice.
    //
    // Expect
    // ------
    // - Structurally equal indices.
    fn construction_is_deterministic() {
        // Arrange
        let source = StubSource { site_to_pattern: vec![1, 0, 1, 0], pattern_count: 2 };

        // Act
        let first = PatternIndex::from_source(&source).unwrap();
        let second = PatternIndex::from_source(&source).unwrap();

        // Assert
        assert_eq!(first, second);
    }

    #[test]
    // Purpose
    // -------
    // A site mapping past the declared pattern count fails construction.
    //
    // Given
    // -----
    // - Site 1 maps to pattern 5 with only 2 patterns declared.
    //
    // Expect
    // ------
    // - `Err(LikelihoodError::InconsistentPatternSource { .. })` naming the
    //   site.
    fn mapping_past_pattern_count_fails_construction() {
        // Arrange
        let source = StubSource { site_to_pattern: vec![0, 5], pattern_count: 2 };

        // Act
        let result = PatternIndex::from_source(&source);

        // Assert
        match result {
            Err(LikelihoodError::InconsistentPatternSource { reason }) => {
                assert!(reason.contains("site 1"), "unexpected reason: {reason}");
            }
            other => panic!("expected InconsistentPatternSource, got: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // A declared pattern no site exhibits fails construction.
    //
    // Given
    // -----
    // - Three patterns declared but only patterns 0 and 2 used.
    //
    // Expect
    // ------
    // - `Err(LikelihoodError::InconsistentPatternSource { .. })` naming
    //   pattern 1.
    fn unrepresented_pattern_fails_construction() {
        // Arrange
        let source = StubSource { site_to_pattern: vec![0, 2, 0], pattern_count: 3 };

        // Act
        let result = PatternIndex::from_source(&source);

        // Assert
        match result {
            Err(LikelihoodError::InconsistentPatternSource { reason }) => {
                assert!(reason.contains("pattern 1"), "unexpected reason: {reason}");
            }
            other => panic!("expected InconsistentPatternSource, got: {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range site and pattern queries fail with their dedicated
    // variants.
    //
    // Given
    // -----
    // - A two-site, one-pattern index.
    //
    // Expect
    // ------
    // - `SiteOutOfRange` for site 2, `PatternOutOfRange` for pattern 1.
    fn out_of_range_queries_fail_with_dedicated_variants() {
        // Arrange
        let source = StubSource { site_to_pattern: vec![0, 0], pattern_count: 1 };
        let index = PatternIndex::from_source(&source).unwrap();

        // Act & Assert
        assert!(matches!(
            index.pattern_of(2),
            Err(LikelihoodError::SiteOutOfRange { site: 2, site_count: 2 })
        ));
        assert!(matches!(
            index.representative(1),
            Err(LikelihoodError::PatternOutOfRange { pattern: 1, pattern_count: 1 })
        ));
    }
}
