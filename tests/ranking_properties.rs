//! Property-based tests for the ranking engine.
//!
//! Ratings and weights are drawn as small integers. Scaled weights are not
//! exact in floating point, so scores are compared with a small tolerance.

use proptest::prelude::*;
use residency_ranker::scoring::{
    rank_programs, Criterion, ProgramRatings, ScoreScale, ScoringOptions, Weights, CRITERIA_COUNT,
};

/// Scores this close are the same score with rounding noise
const TIE_TOLERANCE: f64 = 1e-9;

fn weights_strategy() -> impl Strategy<Value = Weights> {
    prop::array::uniform9(0u32..=50)
        .prop_filter("at least one positive weight", |w| w.iter().any(|v| *v > 0))
        .prop_map(|w| Weights::from_array(w.map(f64::from)))
}

fn programs_strategy() -> impl Strategy<Value = Vec<ProgramRatings>> {
    prop::collection::vec(prop::array::uniform9(1u8..=5), 0..12).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, ratings)| ProgramRatings::with_ratings(format!("Program {:02}", i), ratings))
            .collect()
    })
}

fn names(ranking: &residency_ranker::scoring::Ranking) -> Vec<String> {
    ranking.entries.iter().map(|e| e.name.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn ranking_is_sorted_by_score_then_name(
        programs in programs_strategy(),
        weights in weights_strategy(),
    ) {
        let ranking = rank_programs(&programs, &weights, &ScoringOptions::default()).unwrap();
        prop_assert_eq!(ranking.len(), programs.len());

        for (i, entry) in ranking.entries.iter().enumerate() {
            prop_assert_eq!(entry.rank, i + 1);
        }
        for pair in ranking.entries.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let tied = (a.result.score - b.result.score).abs() <= TIE_TOLERANCE;
            prop_assert!(
                (!tied && a.result.score > b.result.score) || (tied && a.name < b.name),
                "{} ({}) placed before {} ({})",
                a.name, a.result.score, b.name, b.result.score
            );
        }
    }

    #[test]
    fn ranking_ignores_input_order(
        programs in programs_strategy(),
        weights in weights_strategy(),
    ) {
        let options = ScoringOptions::default();
        let first = rank_programs(&programs, &weights, &options).unwrap();
        let again = rank_programs(&programs, &weights, &options).unwrap();
        prop_assert_eq!(&first, &again);

        let mut reversed = programs.clone();
        reversed.reverse();
        let from_reversed = rank_programs(&reversed, &weights, &options).unwrap();
        prop_assert_eq!(first, from_reversed);
    }

    #[test]
    fn scaling_weights_keeps_order_and_scores(
        programs in programs_strategy(),
        weights in weights_strategy(),
        factor in prop::sample::select(vec![0.1, 0.25, 0.3, 0.5, 2.0, 3.0, 4.0, 8.0]),
    ) {
        let options = ScoringOptions::default();
        let base = rank_programs(&programs, &weights, &options).unwrap();
        let scaled = rank_programs(&programs, &weights.scaled(factor), &options).unwrap();

        prop_assert_eq!(names(&base), names(&scaled));
        for (a, b) in base.entries.iter().zip(&scaled.entries) {
            prop_assert!((a.result.score - b.result.score).abs() <= TIE_TOLERANCE);
        }
    }

    #[test]
    fn raising_a_rating_never_lowers_score(
        ratings in prop::array::uniform9(1u8..=4),
        weights in weights_strategy(),
        index in 0..CRITERIA_COUNT,
    ) {
        let criterion = Criterion::ALL[index];
        let before = ProgramRatings::with_ratings("Before", ratings);
        let after = before.clone().rate(criterion, f64::from(ratings[index] + 1));
        let options = ScoringOptions::default();

        let low = rank_programs(&[before], &weights, &options).unwrap();
        let high = rank_programs(&[after], &weights, &options).unwrap();
        prop_assert!(high.entries[0].result.score >= low.entries[0].result.score);
    }

    #[test]
    fn average_scores_stay_within_rating_bounds(
        programs in programs_strategy(),
        weights in weights_strategy(),
    ) {
        let ranking = rank_programs(&programs, &weights, &ScoringOptions::default()).unwrap();
        prop_assert_eq!(ranking.max_score, 5.0);
        for entry in &ranking.entries {
            prop_assert!((1.0..=5.0).contains(&entry.result.score));
        }
    }

    #[test]
    fn points_scores_stay_within_total_weight(
        programs in programs_strategy(),
        weights in weights_strategy(),
    ) {
        let options = ScoringOptions {
            scale: ScoreScale::Points,
            ..ScoringOptions::default()
        };
        let ranking = rank_programs(&programs, &weights, &options).unwrap();
        prop_assert_eq!(ranking.max_score, weights.total());
        for entry in &ranking.entries {
            prop_assert!(entry.result.score >= 0.0);
            prop_assert!(entry.result.score <= weights.total());
        }
    }

    #[test]
    fn missing_rating_scores_as_neutral(
        ratings in prop::array::uniform9(1u8..=5),
        weights in weights_strategy(),
        index in 0..CRITERIA_COUNT,
    ) {
        let criterion = Criterion::ALL[index];
        let mut partial = ProgramRatings::with_ratings("Partial", ratings);
        partial.ratings.remove(&criterion);
        let neutral = ProgramRatings::with_ratings("Partial", ratings).rate(criterion, 3.0);
        let options = ScoringOptions::default();

        let with_gap = rank_programs(&[partial], &weights, &options).unwrap();
        let filled = rank_programs(&[neutral], &weights, &options).unwrap();

        prop_assert!(with_gap.entries[0].result.incomplete);
        prop_assert!(!filled.entries[0].result.incomplete);
        prop_assert_eq!(with_gap.entries[0].result.score, filled.entries[0].result.score);
        prop_assert_eq!(with_gap.warnings.len(), 1);
    }
}

#[test]
fn uniform_extremes_hit_the_bounds() {
    let weights = Weights::from_array([5.0, 4.0, 3.0, 3.0, 2.0, 3.0, 1.0, 2.0, 4.0]);
    let programs = [
        ProgramRatings::with_ratings("Lowest", [1; CRITERIA_COUNT]),
        ProgramRatings::with_ratings("Highest", [5; CRITERIA_COUNT]),
    ];
    let ranking = rank_programs(&programs, &weights, &ScoringOptions::default()).unwrap();
    assert_eq!(ranking.entries[0].name, "Highest");
    assert_eq!(ranking.entries[0].result.score, 5.0);
    assert_eq!(ranking.entries[1].result.score, 1.0);
}
