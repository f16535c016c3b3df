use std::fmt;

use super::criteria::Criterion;
use super::types::Rating;

/// Input problems detected before any score is computed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("program '{program}': {criterion} rating {value} is not a whole number from 1 to 5")]
    InvalidRating {
        program: String,
        criterion: Criterion,
        value: f64,
    },

    #[error("weight for {criterion} must be a non-negative number, got {value}")]
    InvalidWeight { criterion: Criterion, value: f64 },

    #[error("program '{program}' has no rating for {criterion}")]
    IncompleteRatings { program: String, criterion: Criterion },

    #[error("program name '{name}' is used more than once")]
    DuplicateProgramName { name: String },

    #[error("program #{position} has an empty name")]
    EmptyProgramName { position: usize },

    #[error("all weights are zero; at least one criterion needs a positive weight")]
    ZeroTotalWeight,

    #[error("weights add up to {total}; the total must be a finite number")]
    TotalWeightOverflow { total: f64 },
}

/// Every [`ScoringError`] found in one validation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<ScoringError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ScoringError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [only] => write!(f, "{}", only),
            errors => {
                write!(f, "{} input errors", errors.len())?;
                for error in errors {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationErrors {}

/// Non-fatal input degradation reported alongside a ranking.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringWarning {
    NeutralSubstituted {
        program: String,
        criterion: Criterion,
    },
}

impl fmt::Display for ScoringWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringWarning::NeutralSubstituted { program, criterion } => write!(
                f,
                "program '{}' has no rating for {}, using neutral {}",
                program,
                criterion,
                Rating::NEUTRAL.value()
            ),
        }
    }
}
