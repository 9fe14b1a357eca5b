//! Integration tests for the composite-state and likelihood pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end single-chain flow: from a compressed
//!   alignment and a fixed tree, through shared substitution-model and
//!   site-rate handles, to pattern-deduplicated likelihood evaluation and
//!   batched proposal injection.
//! - Exercise realistic model regimes (indicator-gated structure,
//!   empirical frequencies, rate scaling) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `state`:
//!   - `CompoundParameter` flat routing and transactional store/restore
//!     driving real proposals.
//! - `likelihood`:
//!   - `CompressedAlignment` deduplication feeding `PatternLikelihoodCache`
//!     with lazily-shared evaluators.
//!   - `ParameterInjector` apply / apply_with_rate / apply_rate_only
//!     ordering and invalidation semantics.
//! - `substitution`:
//!   - `NtdAveraging` against the analytic `JukesCantor` baseline at
//!     indicator 0.
//! - `tree`:
//!   - `FixedTree` construction and postorder consumption by pruning.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of low-level building blocks (bounds checks,
//!   index validation, rate-matrix structure) — these are covered by unit
//!   tests.
//! - Python bindings — those are expected to be tested at a higher
//!   integration or system level.
use std::cell::RefCell;
use std::rc::Rc;

use ndarray::array;
use rust_phylogeny::{
    likelihood::{
        alignment::CompressedAlignment, injector::ParameterInjector,
        pattern_cache::PatternLikelihoodCache, traits::TreeTopology,
    },
    state::{bounds::Bounds, compound_parameter::CompoundParameter, real_parameter::RealParameter},
    substitution::{
        model::{JukesCantor, SubstitutionModel},
        ntd_averaging::NtdAveraging,
    },
    tree::FixedTree,
};

/// Purpose
/// -------
/// Build the shared four-taxon tree ((0,1),(2,3)) used across the pipeline
/// tests.
///
/// Returns
/// -------
/// - Nodes 0-3 are leaves for taxa 0-3, nodes 4 and 5 their cherries, node
///   6 the root; branch lengths are moderate (0.05 - 0.3 expected
///   substitutions per site) so likelihoods stay well away from under- and
///   overflow.
fn four_taxon_tree() -> Rc<dyn TreeTopology> {
    let tree = FixedTree::new(
        vec![Some(4), Some(4), Some(5), Some(5), Some(6), Some(6), None],
        vec![0.1, 0.2, 0.3, 0.1, 0.05, 0.15, 0.0],
        vec![Some(0), Some(1), Some(2), Some(3), None, None, None],
    )
    .expect("the fixture tree is structurally valid");
    Rc::new(tree)
}

/// Purpose
/// -------
/// Build a four-taxon, six-site alignment with deliberate column repeats.
///
/// Returns
/// -------
/// - Columns (in A=0, C=1, G=2, T=3 encoding):
///   sites 0, 2, 5 -> (A, A, G, G); sites 1, 4 -> (C, C, C, C);
///   site 3 -> (T, C, T, C). Three distinct patterns with site counts
///   3, 2, and 1.
fn six_site_alignment() -> CompressedAlignment {
    CompressedAlignment::from_sequences(
        &[
            vec![0, 1, 0, 3, 1, 0],
            vec![0, 1, 0, 1, 1, 0],
            vec![2, 1, 2, 3, 1, 2],
            vec![2, 1, 2, 1, 1, 2],
        ],
        4,
    )
    .expect("the fixture alignment is rectangular and non-empty")
}

/// Purpose
/// -------
/// Wire a full evaluation stack around the given substitution model.
///
/// Returns
/// -------
/// - The shared model and site-rate handles plus the pattern cache bound
///   over the six-site alignment and the four-taxon tree, all sharing the
///   same `Rc`s so injector writes are visible to every evaluator.
fn build_stack(
    model: SubstitutionModel,
) -> (Rc<RefCell<SubstitutionModel>>, Rc<RefCell<RealParameter>>, Rc<PatternLikelihoodCache>) {
    let model = Rc::new(RefCell::new(model));
    let site_rate =
        Rc::new(RefCell::new(RealParameter::scalar("site_rate", 1.0, Bounds::unbounded())));
    let cache = Rc::new(
        PatternLikelihoodCache::new(
            Rc::new(six_site_alignment()),
            four_taxon_tree(),
            Rc::clone(&model),
            Rc::clone(&site_rate),
        )
        .expect("the fixture source satisfies the pattern contract"),
    );
    (model, site_rate, cache)
}

fn averaging_model() -> SubstitutionModel {
    SubstitutionModel::NucleotideAveraging(
        NtdAveraging::from_values(0.4, 0.1, -0.2, 0.2, -0.1, 0.0, [0.25; 4])
            .expect("the fixture parameters are well-shaped"),
    )
}

#[test]
// Purpose
// -------
// Sites sharing a pattern share one lazily-built evaluator, and the total
// alignment log-likelihood decomposes into pattern values weighted by
// their site counts.
//
// Given
// -----
// - The six-site / three-pattern fixture under Jukes-Cantor.
//
// Expect
// ------
// - After evaluating every site, exactly 3 evaluators exist; repeated
//   sites reproduce their pattern's value exactly; the per-site sum equals
//   the weighted per-pattern sum.
fn pattern_deduplication_carries_through_the_pipeline() {
    // Arrange
    let (_, _, cache) = build_stack(SubstitutionModel::JukesCantor(JukesCantor));
    assert_eq!(cache.pattern_count(), 3);
    assert_eq!(cache.built_count(), 0);

    // Act
    let per_site: Vec<f64> =
        (0..cache.site_count()).map(|site| cache.evaluate_site(site).unwrap()).collect();

    // Assert
    assert_eq!(cache.built_count(), 3);
    assert_eq!(per_site[0], per_site[2]);
    assert_eq!(per_site[0], per_site[5]);
    assert_eq!(per_site[1], per_site[4]);
    let by_sites: f64 = per_site.iter().sum();
    let by_patterns = 3.0 * cache.evaluate(0).unwrap()
        + 2.0 * cache.evaluate(1).unwrap()
        + cache.evaluate(2).unwrap();
    assert!((by_sites - by_patterns).abs() < 1e-12);
}

#[test]
// Purpose
// -------
// At indicator 0 the averaging model reproduces the analytic Jukes-Cantor
// likelihood for every pattern, through the full pipeline.
//
// Given
// -----
// - Two stacks over the same alignment and tree: one averaging model with
//   model_choose 0, one Jukes-Cantor.
//
// Expect
// ------
// - Per-site log-likelihoods agree to tight tolerance.
fn averaging_model_at_indicator_zero_matches_jukes_cantor() {
    // Arrange
    let (_, _, averaging_cache) = build_stack(averaging_model());
    let (_, _, jc_cache) = build_stack(SubstitutionModel::JukesCantor(JukesCantor));

    // Act & Assert
    for site in 0..averaging_cache.site_count() {
        let averaging = averaging_cache.evaluate_site(site).unwrap();
        let jc = jc_cache.evaluate_site(site).unwrap();
        assert!(
            (averaging - jc).abs() < 1e-8,
            "site {site}: averaging {averaging} vs analytic {jc}"
        );
    }
}

#[test]
// Purpose
// -------
// Injection is idempotent per proposal, sensitive to parameter moves, and
// the rate-only path scales without touching the cached decomposition.
//
// Given
// -----
// - An injector over the averaging model; proposals differing in log
//   kappa; rate-only applications at 2.0 and back to 1.0.
//
// Expect
// ------
// - Repeats reproduce values exactly; the kappa move and the rate move
//   both shift the likelihood; restoring the rate restores the value.
fn injection_is_idempotent_sensitive_and_rate_scalable() {
    // Arrange
    let (model, site_rate, cache) = build_stack(averaging_model());
    let injector = ParameterInjector::new(model, site_rate, Rc::clone(&cache));
    let frequencies = [0.3, 0.2, 0.3, 0.2];
    let proposal = |log_kappa: f64| {
        RealParameter::new(
            "proposal",
            array![log_kappa, 0.1, -0.2, 0.2, -0.1],
            Bounds::unbounded(),
        )
    };

    // Act
    let baseline = injector.apply(&proposal(0.4), 3.0, &frequencies, 3).unwrap();
    let repeat = injector.apply(&proposal(0.4), 3.0, &frequencies, 3).unwrap();
    let kappa_move = injector.apply(&proposal(1.6), 3.0, &frequencies, 3).unwrap();
    let rate_move = injector.apply_rate_only(2.0, 3).unwrap();
    let rate_restored = injector.apply_rate_only(1.0, 3).unwrap();

    // Assert
    assert_eq!(baseline, repeat);
    assert!((kappa_move - repeat).abs() > 1e-9, "kappa move must shift the likelihood");
    assert!((rate_move - kappa_move).abs() > 1e-9, "rate move must shift the likelihood");
    assert_eq!(rate_restored, kappa_move);
}

#[test]
// Purpose
// -------
// A composite parameter drives real proposals end to end: flat writes
// route to the right sub-parameter, and store/restore round-trips the
// exact likelihood.
//
// Given
// -----
// - A compound of three sub-parameters with dimensions [2, 3, 1] holding
//   the five log rates (split 2 + 3) and the model selector; a proposal
//   that moves flat index 3 (the middle sub-parameter) after a store.
//
// Expect
// ------
// - Only the middle sub-parameter is dirty after the move; the moved
//   state yields a different likelihood; restoring and re-applying
//   reproduces the stored likelihood exactly.
fn composite_state_round_trips_through_the_likelihood() {
    // Arrange
    let bounds = Bounds::new(-10.0, 10.0).unwrap();
    let mut state = CompoundParameter::new(
        "model_state",
        vec![
            RealParameter::new("transitions", array![0.4, 0.1], bounds),
            RealParameter::new("transversions", array![-0.2, 0.2, -0.1], bounds),
            RealParameter::scalar("model_choose", 4.0, bounds),
        ],
    )
    .unwrap();
    let (model, site_rate, cache) = build_stack(averaging_model());
    let injector = ParameterInjector::new(model, site_rate, Rc::clone(&cache));
    let apply_state = |state: &CompoundParameter| {
        let values = state.values();
        let rates = RealParameter::new(
            "proposal",
            values.slice(ndarray::s![0..5]).to_owned(),
            Bounds::unbounded(),
        );
        injector.apply(&rates, values[5], &[0.3, 0.2, 0.3, 0.2], 0).unwrap()
    };

    // Act
    state.store();
    let stored = apply_state(&state);
    state.set(3, 1.8).unwrap();
    let moved = apply_state(&state);
    state.restore().unwrap();
    let restored = apply_state(&state);

    // Assert
    assert_eq!(state.dirty_parameters(), vec![1]);
    assert_eq!(state.last_dirty(), Some(1));
    assert!((moved - stored).abs() > 1e-9, "the AT exchangeability move must register");
    assert_eq!(restored, stored);
}

#[test]
// Purpose
// -------
// Rebuilding the whole stack from the same inputs reproduces identical
// pattern assignment and likelihoods.
//
// Given
// -----
// - Two independently built Jukes-Cantor stacks over the same fixtures.
//
// Expect
// ------
// - Identical pattern indices for every site and bitwise-equal per-site
//   log-likelihoods.
fn pipeline_is_deterministic_across_rebuilds() {
    // Arrange
    let (_, _, first) = build_stack(SubstitutionModel::JukesCantor(JukesCantor));
    let (_, _, second) = build_stack(SubstitutionModel::JukesCantor(JukesCantor));

    // Act & Assert
    for site in 0..first.site_count() {
        assert_eq!(
            first.pattern_index().pattern_of(site).unwrap(),
            second.pattern_index().pattern_of(site).unwrap()
        );
        assert_eq!(first.evaluate_site(site).unwrap(), second.evaluate_site(site).unwrap());
    }
}
