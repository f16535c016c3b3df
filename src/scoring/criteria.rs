use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The nine fixed dimensions every program is rated on.
///
/// Declaration order is the display order used by sheets, tables and the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    ResidentHappiness,
    CaseExposure,
    Schedule,
    FellowshipMatch,
    LocationFit,
    FacultyCulture,
    #[serde(rename = "salary_col")]
    SalaryVsCostOfLiving,
    ResearchSupport,
    ProgramReputation,
}

/// Number of criteria. Arrays indexed by [`Criterion::index`] use this length.
pub const CRITERIA_COUNT: usize = 9;

impl Criterion {
    pub const ALL: [Criterion; CRITERIA_COUNT] = [
        Criterion::ResidentHappiness,
        Criterion::CaseExposure,
        Criterion::Schedule,
        Criterion::FellowshipMatch,
        Criterion::LocationFit,
        Criterion::FacultyCulture,
        Criterion::SalaryVsCostOfLiving,
        Criterion::ResearchSupport,
        Criterion::ProgramReputation,
    ];

    /// Position in [`Criterion::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-facing label, also the sheet column header
    pub fn label(self) -> &'static str {
        match self {
            Criterion::ResidentHappiness => "Resident Happiness",
            Criterion::CaseExposure => "Case Exposure",
            Criterion::Schedule => "Schedule",
            Criterion::FellowshipMatch => "Fellowship Match Strength",
            Criterion::LocationFit => "Location Fit",
            Criterion::FacultyCulture => "Faculty Culture/Feedback",
            Criterion::SalaryVsCostOfLiving => "Salary vs. Cost of Living",
            Criterion::ResearchSupport => "Research Support",
            Criterion::ProgramReputation => "Program Reputation",
        }
    }

    /// Config/JSON key (matches the serde representation)
    pub fn key(self) -> &'static str {
        match self {
            Criterion::ResidentHappiness => "resident_happiness",
            Criterion::CaseExposure => "case_exposure",
            Criterion::Schedule => "schedule",
            Criterion::FellowshipMatch => "fellowship_match",
            Criterion::LocationFit => "location_fit",
            Criterion::FacultyCulture => "faculty_culture",
            Criterion::SalaryVsCostOfLiving => "salary_col",
            Criterion::ResearchSupport => "research_support",
            Criterion::ProgramReputation => "program_reputation",
        }
    }

    /// Compact label for narrow table columns
    pub fn short_label(self) -> &'static str {
        match self {
            Criterion::ResidentHappiness => "Happy",
            Criterion::CaseExposure => "Cases",
            Criterion::Schedule => "Sched",
            Criterion::FellowshipMatch => "Fellow",
            Criterion::LocationFit => "Loc",
            Criterion::FacultyCulture => "Faculty",
            Criterion::SalaryVsCostOfLiving => "$/COL",
            Criterion::ResearchSupport => "Research",
            Criterion::ProgramReputation => "Rep",
        }
    }

    /// Parse a label, key or known header alias, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Criterion> {
        let needle = s.trim();
        if needle.eq_ignore_ascii_case("Salary:COL") {
            return Some(Criterion::SalaryVsCostOfLiving);
        }
        Criterion::ALL.into_iter().find(|c| {
            needle.eq_ignore_ascii_case(c.label()) || needle.eq_ignore_ascii_case(c.key())
        })
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown criterion '{0}'")]
pub struct UnknownCriterion(pub String);

impl FromStr for Criterion {
    type Err = UnknownCriterion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criterion::parse(s).ok_or_else(|| UnknownCriterion(s.to_string()))
    }
}
