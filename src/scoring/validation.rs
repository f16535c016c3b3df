use std::collections::HashSet;

use super::config::{MissingRatingPolicy, ScoringConfig};
use super::criteria::{Criterion, CRITERIA_COUNT};
use super::error::{ScoringError, ScoringWarning, ValidationErrors};
use super::types::{ProgramRatings, Rating, Weights};

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref weights) = config.weights {
        for criterion in Criterion::ALL {
            if let Some(weight) = weights.get(criterion) {
                if !weight.is_finite() || weight < 0.0 {
                    errors.push(format!(
                        "scoring.weights.{}: must be non-negative, got {}",
                        criterion.key(),
                        weight
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        let total = config.weights().total();
        if !total.is_finite() {
            errors.push(format!(
                "scoring.weights: total weight must be finite, got {}",
                total
            ));
        } else if total <= 0.0 {
            errors.push("scoring.weights: at least one weight must be positive".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A program whose ratings passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProgram {
    pub name: String,
    /// Ratings in [`Criterion::ALL`] order
    pub ratings: [Rating; CRITERIA_COUNT],
    /// Which ratings were filled with the neutral value
    pub substituted: [bool; CRITERIA_COUNT],
}

impl ValidatedProgram {
    pub fn rating(&self, criterion: Criterion) -> Rating {
        self.ratings[criterion.index()]
    }

    pub fn is_substituted(&self, criterion: Criterion) -> bool {
        self.substituted[criterion.index()]
    }

    pub fn is_incomplete(&self) -> bool {
        self.substituted.iter().any(|s| *s)
    }
}

/// Input that is safe to score, plus any degradation warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub programs: Vec<ValidatedProgram>,
    pub warnings: Vec<ScoringWarning>,
}

/// Check weights and every program's ratings before scoring.
///
/// All problems are collected so the caller can report them together.
pub fn validate_input(
    programs: &[ProgramRatings],
    weights: &Weights,
    policy: MissingRatingPolicy,
) -> Result<ValidatedInput, ValidationErrors> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut weights_valid = true;
    for (criterion, weight) in weights.iter() {
        if !weight.is_finite() || weight < 0.0 {
            weights_valid = false;
            errors.push(ScoringError::InvalidWeight {
                criterion,
                value: weight,
            });
        }
    }
    if weights_valid {
        let total = weights.total();
        if !total.is_finite() {
            errors.push(ScoringError::TotalWeightOverflow { total });
        } else if total <= 0.0 {
            errors.push(ScoringError::ZeroTotalWeight);
        }
    }

    let mut seen_names = HashSet::new();
    let mut validated = Vec::with_capacity(programs.len());

    for (i, program) in programs.iter().enumerate() {
        let trimmed = program.name.trim();
        if trimmed.is_empty() {
            errors.push(ScoringError::EmptyProgramName { position: i + 1 });
        } else if !seen_names.insert(trimmed.to_lowercase()) {
            errors.push(ScoringError::DuplicateProgramName {
                name: trimmed.to_string(),
            });
        }

        let mut ratings = [Rating::NEUTRAL; CRITERIA_COUNT];
        let mut substituted = [false; CRITERIA_COUNT];

        for criterion in Criterion::ALL {
            match program.rating(criterion) {
                Some(raw) => match Rating::from_raw(raw) {
                    Some(rating) => ratings[criterion.index()] = rating,
                    None => errors.push(ScoringError::InvalidRating {
                        program: program.name.clone(),
                        criterion,
                        value: raw,
                    }),
                },
                None => match policy {
                    MissingRatingPolicy::Neutral => {
                        substituted[criterion.index()] = true;
                        warnings.push(ScoringWarning::NeutralSubstituted {
                            program: program.name.clone(),
                            criterion,
                        });
                    }
                    MissingRatingPolicy::Reject => {
                        errors.push(ScoringError::IncompleteRatings {
                            program: program.name.clone(),
                            criterion,
                        });
                    }
                },
            }
        }

        validated.push(ValidatedProgram {
            name: trimmed.to_string(),
            ratings,
            substituted,
        });
    }

    if errors.is_empty() {
        Ok(ValidatedInput {
            programs: validated,
            warnings,
        })
    } else {
        Err(ValidationErrors(errors))
    }
}
