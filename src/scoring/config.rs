use serde::{Deserialize, Serialize};

use super::criteria::Criterion;
use super::types::{Weights, DEFAULT_WEIGHT};

/// Main scoring configuration.
///
/// Controls the weight of each criterion and how incomplete input is treated.
/// Every field is optional; omitted values fall back to the defaults.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   missing_ratings: neutral
///   scale: average
///   weights:
///     resident_happiness: 5
///     case_exposure: 4
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Per-criterion importance; unset criteria weigh 10
    #[serde(default)]
    pub weights: Option<WeightsConfig>,

    /// What to do when a program lacks a rating (default: neutral)
    #[serde(default)]
    pub missing_ratings: Option<MissingRatingPolicy>,

    /// Scale of the reported score (default: average)
    #[serde(default)]
    pub scale: Option<ScoreScale>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(WeightsConfig::default()),
            missing_ratings: Some(MissingRatingPolicy::Neutral),
            scale: Some(ScoreScale::Average),
        }
    }
}

impl ScoringConfig {
    /// Effective weights, filling unset criteria with the default weight
    pub fn weights(&self) -> Weights {
        self.weights
            .as_ref()
            .map(WeightsConfig::to_weights)
            .unwrap_or_default()
    }

    pub fn options(&self) -> ScoringOptions {
        ScoringOptions {
            missing_ratings: self.missing_ratings.unwrap_or_default(),
            scale: self.scale.unwrap_or_default(),
        }
    }
}

/// Weights block: one optional field per criterion.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WeightsConfig {
    #[serde(default)]
    pub resident_happiness: Option<f64>,
    #[serde(default)]
    pub case_exposure: Option<f64>,
    #[serde(default)]
    pub schedule: Option<f64>,
    #[serde(default)]
    pub fellowship_match: Option<f64>,
    #[serde(default)]
    pub location_fit: Option<f64>,
    #[serde(default)]
    pub faculty_culture: Option<f64>,
    #[serde(default)]
    pub salary_col: Option<f64>,
    #[serde(default)]
    pub research_support: Option<f64>,
    #[serde(default)]
    pub program_reputation: Option<f64>,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self::from_weights(&Weights::default())
    }
}

impl WeightsConfig {
    /// Configured value for a criterion, if any
    pub fn get(&self, criterion: Criterion) -> Option<f64> {
        match criterion {
            Criterion::ResidentHappiness => self.resident_happiness,
            Criterion::CaseExposure => self.case_exposure,
            Criterion::Schedule => self.schedule,
            Criterion::FellowshipMatch => self.fellowship_match,
            Criterion::LocationFit => self.location_fit,
            Criterion::FacultyCulture => self.faculty_culture,
            Criterion::SalaryVsCostOfLiving => self.salary_col,
            Criterion::ResearchSupport => self.research_support,
            Criterion::ProgramReputation => self.program_reputation,
        }
    }

    fn slot(&mut self, criterion: Criterion) -> &mut Option<f64> {
        match criterion {
            Criterion::ResidentHappiness => &mut self.resident_happiness,
            Criterion::CaseExposure => &mut self.case_exposure,
            Criterion::Schedule => &mut self.schedule,
            Criterion::FellowshipMatch => &mut self.fellowship_match,
            Criterion::LocationFit => &mut self.location_fit,
            Criterion::FacultyCulture => &mut self.faculty_culture,
            Criterion::SalaryVsCostOfLiving => &mut self.salary_col,
            Criterion::ResearchSupport => &mut self.research_support,
            Criterion::ProgramReputation => &mut self.program_reputation,
        }
    }

    pub fn set(&mut self, criterion: Criterion, weight: f64) {
        *self.slot(criterion) = Some(weight);
    }

    /// Every criterion set explicitly
    pub fn from_weights(weights: &Weights) -> Self {
        let mut config = Self::empty();
        for (criterion, weight) in weights.iter() {
            config.set(criterion, weight);
        }
        config
    }

    pub fn empty() -> Self {
        Self {
            resident_happiness: None,
            case_exposure: None,
            schedule: None,
            fellowship_match: None,
            location_fit: None,
            faculty_culture: None,
            salary_col: None,
            research_support: None,
            program_reputation: None,
        }
    }

    pub fn to_weights(&self) -> Weights {
        let mut weights = Weights::uniform(DEFAULT_WEIGHT);
        for criterion in Criterion::ALL {
            if let Some(weight) = self.get(criterion) {
                weights.set(criterion, weight);
            }
        }
        weights
    }
}

/// Policy for a program that lacks a rating on some criterion.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatingPolicy {
    /// Substitute the neutral rating 3 and flag the result as incomplete
    #[default]
    Neutral,
    /// Fail validation with an incomplete-ratings error
    Reject,
}

/// How the composite score is expressed.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// Weighted average of ratings, always within 1-5
    #[default]
    Average,
    /// Sum of `rating / 5 * weight`, ranging up to the total weight
    Points,
}

/// Resolved scoring options passed to the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringOptions {
    pub missing_ratings: MissingRatingPolicy,
    pub scale: ScoreScale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scoring_config() {
        let config = ScoringConfig::default();

        assert_eq!(config.missing_ratings, Some(MissingRatingPolicy::Neutral));
        assert_eq!(config.scale, Some(ScoreScale::Average));
        assert_eq!(config.weights(), Weights::default());
    }

    #[test]
    fn test_scoring_config_serde_roundtrip() {
        let config = ScoringConfig::default();
        let yaml = serde_saphyr::to_string(&config).unwrap();
        let parsed: ScoringConfig = serde_saphyr::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_weights_parse() {
        let yaml = r#"
weights:
  resident_happiness: 5
  salary_col: 1
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        let weights = config.weights();
        assert_eq!(weights.get(Criterion::ResidentHappiness), 5.0);
        assert_eq!(weights.get(Criterion::SalaryVsCostOfLiving), 1.0);
        assert_eq!(weights.get(Criterion::Schedule), DEFAULT_WEIGHT);
        assert!(config.missing_ratings.is_none());
    }

    #[test]
    fn test_full_scoring_config_parse() {
        let yaml = r#"
missing_ratings: reject
scale: points
weights:
  resident_happiness: 5
  case_exposure: 4
  schedule: 3
  fellowship_match: 3
  location_fit: 2
  faculty_culture: 3
  salary_col: 1
  research_support: 2
  program_reputation: 4
"#;
        let config: ScoringConfig = serde_saphyr::from_str(yaml).unwrap();
        let options = config.options();
        assert_eq!(options.missing_ratings, MissingRatingPolicy::Reject);
        assert_eq!(options.scale, ScoreScale::Points);
        assert_eq!(config.weights().total(), 27.0);
    }

    #[test]
    fn test_empty_scoring_config_parse() {
        let config: ScoringConfig = serde_saphyr::from_str("{}").unwrap();
        assert!(config.weights.is_none());
        assert_eq!(config.options(), ScoringOptions::default());
        assert_eq!(config.weights(), Weights::default());
    }

    #[test]
    fn test_unknown_weight_key_rejected() {
        let yaml = r#"
weights:
  weather: 5
"#;
        assert!(serde_saphyr::from_str::<ScoringConfig>(yaml).is_err());
    }

    #[test]
    fn test_weights_config_roundtrip_through_weights() {
        let weights = Weights::uniform(2.0).with(Criterion::LocationFit, 7.0);
        let config = WeightsConfig::from_weights(&weights);
        assert_eq!(config.location_fit, Some(7.0));
        assert_eq!(config.to_weights(), weights);
    }
}
