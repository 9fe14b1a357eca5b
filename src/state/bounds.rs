//! Inclusive bound pairs shared by real and compound parameters.
//!
//! A [`Bounds`] value is validated once at construction; all later checks
//! (`contains`, shared-bounds verification) can assume `lower <= upper` and
//! no NaNs. Bounds take part in equality checks when compound parameters
//! verify that every sub-parameter shares one pair, so the type derives
//! `PartialEq` on the raw floats (±∞ compares equal to itself, which is the
//! desired behavior for unbounded parameters).
use crate::state::errors::StateResult;
use crate::state::validation::validate_bounds;

/// Inclusive `[lower, upper]` bound pair for a real-valued parameter.
///
/// Invariants (checked by [`Bounds::new`]):
/// - neither bound is NaN,
/// - `lower <= upper` (infinities allowed on either side).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    lower: f64,
    upper: f64,
}

impl Bounds {
    /// Create a validated bound pair.
    ///
    /// Returns [`crate::state::StateError::InvalidBounds`] if either bound is
    /// NaN or if `lower > upper`.
    pub fn new(lower: f64, upper: f64) -> StateResult<Bounds> {
        validate_bounds(lower, upper)?;
        Ok(Bounds { lower, upper })
    }

    /// The fully unbounded pair `(-inf, +inf)`.
    pub fn unbounded() -> Bounds {
        Bounds { lower: f64::NEG_INFINITY, upper: f64::INFINITY }
    }

    /// Lower (inclusive) bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper (inclusive) bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Whether `value` lies inside the inclusive range. NaN is never inside.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.lower, self.upper)
    }
}
