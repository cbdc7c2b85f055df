//! Step model for the notice sequence.
//!
//! Two encodings exist and must not be mixed up:
//! - the step *index*, 0-based, in `[0, 5]` (0 = not started, 5 = all done);
//! - the *stored* value, 1-based, in `[1, 6]`, used by the `current_step`
//!   column and the `assessmentCurrentStep_<id>` cache key.

use serde::{Deserialize, Serialize};

pub const STEP_NAMES: [&str; 6] = [
    "Not Started",
    "Conditional Job Offer",
    "Individualized Assessment",
    "Preliminary Job Offer Revocation",
    "Individual Reassessment",
    "Final Revocation Notice",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStep {
    NotStarted,
    ConditionalOffer,
    IndividualizedAssessment,
    PreliminaryRevocation,
    IndividualReassessment,
    FinalRevocation,
}

impl AssessmentStep {
    pub const ALL: [AssessmentStep; 6] = [
        AssessmentStep::NotStarted,
        AssessmentStep::ConditionalOffer,
        AssessmentStep::IndividualizedAssessment,
        AssessmentStep::PreliminaryRevocation,
        AssessmentStep::IndividualReassessment,
        AssessmentStep::FinalRevocation,
    ];

    pub const LAST: AssessmentStep = AssessmentStep::FinalRevocation;

    pub fn index(self) -> u8 {
        match self {
            AssessmentStep::NotStarted => 0,
            AssessmentStep::ConditionalOffer => 1,
            AssessmentStep::IndividualizedAssessment => 2,
            AssessmentStep::PreliminaryRevocation => 3,
            AssessmentStep::IndividualReassessment => 4,
            AssessmentStep::FinalRevocation => 5,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        STEP_NAMES[self.index() as usize]
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() as i64 + 1)
    }

    /// True once every notice in the sequence has been issued.
    pub fn is_last(self) -> bool {
        self == Self::LAST
    }

    pub fn to_stored(self) -> i32 {
        self.index() as i32 + 1
    }

    /// Converts a 1-based stored value. Out-of-range values yield `None`.
    pub fn from_stored(stored: i64) -> Option<Self> {
        Self::from_index(stored - 1)
    }

    /// Parses a 1-based stored value from its string form (cache payloads).
    pub fn parse_stored(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(Self::from_stored)
    }
}

/// Name for a 0-based index; anything outside `[0, 5]` reads as "Not Started".
pub fn step_name(index: i64) -> &'static str {
    AssessmentStep::from_index(index)
        .unwrap_or(AssessmentStep::NotStarted)
        .name()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalDecision {
    Hired,
    Revoked,
}

impl FinalDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            FinalDecision::Hired => "hired",
            FinalDecision::Revoked => "revoked",
        }
    }
}
