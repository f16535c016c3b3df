use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::criteria::{Criterion, CRITERIA_COUNT};

/// A validated 1-5 rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Midpoint substituted for missing ratings under the neutral policy
    pub const NEUTRAL: Rating = Rating(3);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    /// Accept a raw numeric cell only if it is a whole number in 1-5.
    pub fn from_raw(value: f64) -> Option<Self> {
        if value.fract() != 0.0 || !value.is_finite() {
            return None;
        }
        if value < Self::MIN as f64 || value > Self::MAX as f64 {
            return None;
        }
        Some(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

/// Default weight for a criterion the user never set.
pub const DEFAULT_WEIGHT: f64 = 10.0;
/// Upper bound used by interactive sliders; the scorer itself accepts any finite value.
pub const MAX_SLIDER_WEIGHT: f64 = 50.0;

/// One weight per criterion, indexed by [`Criterion::index`].
///
/// Values are raw user input; [`crate::scoring::rank_programs`] rejects negative
/// or non-finite entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weights([f64; CRITERIA_COUNT]);

impl Default for Weights {
    fn default() -> Self {
        Self::uniform(DEFAULT_WEIGHT)
    }
}

impl Weights {
    pub fn uniform(weight: f64) -> Self {
        Self([weight; CRITERIA_COUNT])
    }

    /// Build from a list in [`Criterion::ALL`] order
    pub fn from_array(weights: [f64; CRITERIA_COUNT]) -> Self {
        Self(weights)
    }

    pub fn get(&self, criterion: Criterion) -> f64 {
        self.0[criterion.index()]
    }

    pub fn set(&mut self, criterion: Criterion, weight: f64) {
        self.0[criterion.index()] = weight;
    }

    pub fn with(mut self, criterion: Criterion, weight: f64) -> Self {
        self.set(criterion, weight);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Criterion, f64)> + '_ {
        Criterion::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Every weight multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.map(|w| w * factor))
    }
}

/// A named program and its raw ratings as entered by the user.
///
/// Ratings are kept as raw numbers so out-of-range or fractional input can be
/// reported precisely at validation time. A criterion absent from the map is
/// a missing rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramRatings {
    pub name: String,
    #[serde(default)]
    pub ratings: BTreeMap<Criterion, f64>,
}

impl ProgramRatings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ratings: BTreeMap::new(),
        }
    }

    /// Build with every criterion set from an array in [`Criterion::ALL`] order
    pub fn with_ratings(name: impl Into<String>, ratings: [u8; CRITERIA_COUNT]) -> Self {
        let mut program = Self::new(name);
        for (criterion, value) in Criterion::ALL.into_iter().zip(ratings) {
            program.ratings.insert(criterion, value as f64);
        }
        program
    }

    pub fn rate(mut self, criterion: Criterion, value: f64) -> Self {
        self.ratings.insert(criterion, value);
        self
    }

    pub fn rating(&self, criterion: Criterion) -> Option<f64> {
        self.ratings.get(&criterion).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::new(0).is_none());
        assert_eq!(Rating::new(1).map(Rating::value), Some(1));
        assert_eq!(Rating::new(5).map(Rating::value), Some(5));
        assert!(Rating::new(6).is_none());
    }

    #[test]
    fn test_rating_from_raw_rejects_fractions() {
        assert_eq!(Rating::from_raw(4.0).map(Rating::value), Some(4));
        assert!(Rating::from_raw(4.5).is_none());
        assert!(Rating::from_raw(f64::NAN).is_none());
        assert!(Rating::from_raw(-1.0).is_none());
    }

    #[test]
    fn test_default_weights() {
        let weights = Weights::default();
        assert_eq!(weights.total(), 90.0);
        assert_eq!(weights.get(Criterion::Schedule), DEFAULT_WEIGHT);
    }

    #[test]
    fn test_weights_set_and_scale() {
        let weights = Weights::uniform(1.0).with(Criterion::Schedule, 4.0);
        assert_eq!(weights.total(), 12.0);
        assert_eq!(weights.scaled(2.0).get(Criterion::Schedule), 8.0);
    }

    #[test]
    fn test_program_with_ratings() {
        let program = ProgramRatings::with_ratings("A", [1, 2, 3, 4, 5, 1, 2, 3, 4]);
        assert_eq!(program.ratings.len(), 9);
        assert_eq!(program.rating(Criterion::LocationFit), Some(5.0));
    }
}
