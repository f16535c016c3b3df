use serde::Serialize;
use std::cmp::Ordering;

use super::config::{ScoreScale, ScoringOptions};
use super::criteria::Criterion;
use super::error::{ScoringWarning, ValidationErrors};
use super::types::{ProgramRatings, Rating, Weights};
use super::validation::{validate_input, ValidatedProgram};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionContribution {
    pub criterion: Criterion,
    pub weight: f64,
    pub rating: Rating,
    /// Rating was missing and filled with the neutral value
    pub substituted: bool,
    /// weight × rating
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total_weight: f64,
    pub contributions: Vec<CriterionContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub incomplete: bool,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProgram {
    /// 1-based position in the ranking
    pub rank: usize,
    pub name: String,
    #[serde(flatten)]
    pub result: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub scale: ScoreScale,
    /// Highest score any program could reach under the current weights
    pub max_score: f64,
    pub entries: Vec<RankedProgram>,
    pub warnings: Vec<ScoringWarning>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry at a 1-based rank
    pub fn get_rank(&self, rank: usize) -> Option<&RankedProgram> {
        rank.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    pub fn find(&self, name: &str) -> Option<&RankedProgram> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Resolve a 1-based rank or a program name (exact, then ignoring case)
    pub fn lookup(&self, query: &str) -> Option<&RankedProgram> {
        let query = query.trim();
        if let Ok(rank) = query.parse::<usize>() {
            return self.get_rank(rank);
        }
        self.find(query).or_else(|| {
            self.entries
                .iter()
                .find(|e| e.name.to_lowercase() == query.to_lowercase())
        })
    }
}

/// Maximum achievable score for a scale and weight set.
pub fn max_score(weights: &Weights, scale: ScoreScale) -> f64 {
    match scale {
        ScoreScale::Average => Rating::MAX as f64,
        ScoreScale::Points => weights.total(),
    }
}

/// Score one validated program. Weights must already be validated
/// (non-negative, positive total).
pub fn calculate_score(
    program: &ValidatedProgram,
    weights: &Weights,
    scale: ScoreScale,
) -> ScoreResult {
    let total_weight = weights.total();

    let contributions: Vec<CriterionContribution> = Criterion::ALL
        .into_iter()
        .map(|criterion| {
            let weight = weights.get(criterion);
            let rating = program.rating(criterion);
            CriterionContribution {
                criterion,
                weight,
                rating,
                substituted: program.is_substituted(criterion),
                contribution: weight * rating.as_f64(),
            }
        })
        .collect();

    let weighted_sum: f64 = contributions.iter().map(|c| c.contribution).sum();

    let score = match scale {
        ScoreScale::Average => weighted_sum / total_weight,
        ScoreScale::Points => weighted_sum / Rating::MAX as f64,
    };

    ScoreResult {
        score,
        incomplete: program.is_incomplete(),
        breakdown: ScoreBreakdown {
            total_weight,
            contributions,
        },
    }
}

/// Steps per unit of the maximum score used when ordering.
const ORDERING_STEPS: f64 = 1e9;

/// Score quantized relative to the maximum, so rounding noise from
/// weight arithmetic compares equal and falls through to the name.
fn ordering_key(score: f64, max: f64) -> i64 {
    (score / max * ORDERING_STEPS).round() as i64
}

/// Validate, score and order every program.
///
/// Sorted by score descending, ties by name ascending. Pure: the same input
/// always yields the same ranking.
pub fn rank_programs(
    programs: &[ProgramRatings],
    weights: &Weights,
    options: &ScoringOptions,
) -> Result<Ranking, ValidationErrors> {
    let input = validate_input(programs, weights, options.missing_ratings)?;

    let mut scored: Vec<(String, ScoreResult)> = input
        .programs
        .iter()
        .map(|program| {
            (
                program.name.clone(),
                calculate_score(program, weights, options.scale),
            )
        })
        .collect();

    let max = max_score(weights, options.scale);
    scored.sort_by(|a, b| {
        // Primary: score descending
        let score_cmp = ordering_key(b.1.score, max).cmp(&ordering_key(a.1.score, max));
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        // Tie-breaker: name ascending
        a.0.cmp(&b.0)
    });

    let entries = scored
        .into_iter()
        .enumerate()
        .map(|(i, (name, result))| RankedProgram {
            rank: i + 1,
            name,
            result,
        })
        .collect();

    Ok(Ranking {
        scale: options.scale,
        max_score: max,
        entries,
        warnings: input.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{MissingRatingPolicy, ScoringError};

    fn example_weights() -> Weights {
        Weights::from_array([5.0, 4.0, 3.0, 3.0, 2.0, 3.0, 1.0, 2.0, 4.0])
    }

    fn rank(programs: &[ProgramRatings], weights: &Weights) -> Ranking {
        rank_programs(programs, weights, &ScoringOptions::default()).unwrap()
    }

    #[test]
    fn test_example_scenario_a_before_b() {
        let a = ProgramRatings::with_ratings("A", [5, 5, 4, 3, 2, 4, 3, 3, 5]);
        let b = ProgramRatings::with_ratings("B", [3, 3, 3, 3, 5, 3, 3, 3, 3]);
        let ranking = rank(&[b, a], &example_weights());

        assert_eq!(ranking.entries[0].name, "A");
        assert_eq!(ranking.entries[1].name, "B");
        // A: 111 / 27, B: 85 / 27
        assert!((ranking.entries[0].result.score - 111.0 / 27.0).abs() < 1e-9);
        assert!((ranking.entries[1].result.score - 85.0 / 27.0).abs() < 1e-9);
        assert_eq!(ranking.entries[0].rank, 1);
        assert_eq!(ranking.entries[1].rank, 2);
    }

    #[test]
    fn test_contributions_are_weight_times_rating() {
        let a = ProgramRatings::with_ratings("A", [5, 5, 4, 3, 2, 4, 3, 3, 5]);
        let ranking = rank(&[a], &example_weights());
        let breakdown = &ranking.entries[0].result.breakdown;

        assert_eq!(breakdown.total_weight, 27.0);
        assert_eq!(breakdown.contributions.len(), 9);
        let happiness = &breakdown.contributions[0];
        assert_eq!(happiness.criterion, Criterion::ResidentHappiness);
        assert_eq!(happiness.contribution, 25.0);
        let sum: f64 = breakdown.contributions.iter().map(|c| c.contribution).sum();
        assert_eq!(sum, 111.0);
    }

    #[test]
    fn test_all_ones_and_all_fives_hit_bounds() {
        let low = ProgramRatings::with_ratings("Low", [1; 9]);
        let high = ProgramRatings::with_ratings("High", [5; 9]);
        let ranking = rank(&[low, high], &example_weights());

        assert_eq!(ranking.entries[0].result.score, 5.0);
        assert_eq!(ranking.entries[1].result.score, 1.0);
        assert_eq!(ranking.max_score, 5.0);
    }

    #[test]
    fn test_ties_broken_by_name() {
        let programs = vec![
            ProgramRatings::with_ratings("Zeta", [4; 9]),
            ProgramRatings::with_ratings("Alpha", [4; 9]),
            ProgramRatings::with_ratings("Mid", [4; 9]),
        ];
        let ranking = rank(&programs, &Weights::default());
        let names: Vec<&str> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_ties_survive_non_exact_weight_scaling() {
        // Equal weighted sums; scaling by 0.1 leaves the scores a few ulps apart
        let weights = Weights::from_array([13.0, 35.0, 26.0, 10.0, 32.0, 44.0, 25.0, 32.0, 33.0]);
        let programs = vec![
            ProgramRatings::with_ratings("B", [2, 1, 1, 3, 5, 5, 4, 3, 1]),
            ProgramRatings::with_ratings("A", [4, 1, 3, 2, 4, 4, 3, 3, 2]),
        ];

        for factor in [1.0, 0.1, 0.3, 3.0, 7.0] {
            let ranking = rank(&programs, &weights.scaled(factor));
            let names: Vec<&str> = ranking.entries.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["A", "B"], "factor {}", factor);
        }
    }

    #[test]
    fn test_ordering_key_separates_real_differences() {
        assert_eq!(ordering_key(2.9040000000000004, 5.0), ordering_key(2.904, 5.0));
        assert!(ordering_key(2.905, 5.0) > ordering_key(2.904, 5.0));
        assert_eq!(ordering_key(5.0, 5.0), 1_000_000_000);
    }

    #[test]
    fn test_points_scale_sums_rating_fractions() {
        let a = ProgramRatings::with_ratings("A", [5, 5, 4, 3, 2, 4, 3, 3, 5]);
        let options = ScoringOptions {
            missing_ratings: MissingRatingPolicy::Neutral,
            scale: ScoreScale::Points,
        };
        let ranking = rank_programs(&[a], &example_weights(), &options).unwrap();
        // sum(rating / 5 * weight) = 111 / 5
        assert!((ranking.entries[0].result.score - 22.2).abs() < 1e-9);
        assert_eq!(ranking.max_score, 27.0);
    }

    #[test]
    fn test_zero_weight_criterion_ignored() {
        let weights = Weights::uniform(0.0).with(Criterion::Schedule, 1.0);
        let a = ProgramRatings::with_ratings("A", [1, 1, 5, 1, 1, 1, 1, 1, 1]);
        let b = ProgramRatings::with_ratings("B", [5, 5, 2, 5, 5, 5, 5, 5, 5]);
        let ranking = rank(&[a, b], &weights);
        assert_eq!(ranking.entries[0].name, "A");
        assert_eq!(ranking.entries[0].result.score, 5.0);
    }

    #[test]
    fn test_neutral_substitution_flags_incomplete() {
        let mut program = ProgramRatings::with_ratings("Mercy", [5; 9]);
        program.ratings.remove(&Criterion::Schedule);
        let ranking = rank(&[program], &Weights::uniform(1.0));
        let entry = &ranking.entries[0];

        assert!(entry.result.incomplete);
        // (8 * 5 + 3) / 9
        assert!((entry.result.score - 43.0 / 9.0).abs() < 1e-9);
        assert!(entry.result.breakdown.contributions[2].substituted);
        assert_eq!(ranking.warnings.len(), 1);
    }

    #[test]
    fn test_reject_policy_names_program_and_criterion() {
        let mut program = ProgramRatings::with_ratings("Mercy", [5; 9]);
        program.ratings.remove(&Criterion::ResearchSupport);
        let options = ScoringOptions {
            missing_ratings: MissingRatingPolicy::Reject,
            scale: ScoreScale::Average,
        };
        let errors = rank_programs(&[program], &Weights::default(), &options).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ScoringError::IncompleteRatings {
                program: "Mercy".to_string(),
                criterion: Criterion::ResearchSupport,
            }]
        );
    }

    #[test]
    fn test_empty_program_list() {
        let ranking = rank(&[], &Weights::default());
        assert!(ranking.is_empty());
        assert!(ranking.get_rank(1).is_none());
    }

    #[test]
    fn test_get_rank_is_one_based() {
        let programs = vec![
            ProgramRatings::with_ratings("A", [5; 9]),
            ProgramRatings::with_ratings("B", [1; 9]),
        ];
        let ranking = rank(&programs, &Weights::default());
        assert!(ranking.get_rank(0).is_none());
        assert_eq!(ranking.get_rank(2).map(|e| e.name.as_str()), Some("B"));
        assert!(ranking.find("A").is_some());
    }

    #[test]
    fn test_lookup_by_rank_or_name() {
        let programs = vec![
            ProgramRatings::with_ratings("Mercy General", [5; 9]),
            ProgramRatings::with_ratings("County", [1; 9]),
        ];
        let ranking = rank(&programs, &Weights::default());
        assert_eq!(ranking.lookup("2").map(|e| e.name.as_str()), Some("County"));
        assert_eq!(ranking.lookup(" county ").map(|e| e.rank), Some(2));
        assert_eq!(ranking.lookup("Mercy General").map(|e| e.rank), Some(1));
        assert!(ranking.lookup("3").is_none());
        assert!(ranking.lookup("Elsewhere").is_none());
    }
}
