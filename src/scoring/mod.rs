pub mod config;
pub mod criteria;
pub mod engine;
pub mod error;
pub mod types;
pub mod validation;

pub use config::*;
pub use criteria::{Criterion, UnknownCriterion, CRITERIA_COUNT};
pub use engine::{
    calculate_score, max_score, rank_programs, CriterionContribution, RankedProgram, Ranking,
    ScoreBreakdown, ScoreResult,
};
pub use error::{ScoringError, ScoringWarning, ValidationErrors};
pub use types::{ProgramRatings, Rating, Weights, DEFAULT_WEIGHT, MAX_SLIDER_WEIGHT};
pub use validation::{validate_input, validate_scoring, ValidatedInput, ValidatedProgram};
