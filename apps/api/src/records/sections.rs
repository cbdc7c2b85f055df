//! Restorative Record sections and their typed payloads.
//!
//! Every section table stores its payload as JSONB. Payloads are parsed into
//! the typed struct for their section and re-serialized before they are
//! written, so stored JSON always has the canonical shape.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::records::validation::{require_date_order, require_text, require_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSection {
    Introduction,
    Awards,
    Skills,
    Education,
    Employment,
    CommunityEngagements,
    Hobbies,
    Mentors,
    MicroCredentials,
    RehabPrograms,
}

impl RecordSection {
    pub const ALL: [RecordSection; 10] = [
        RecordSection::Introduction,
        RecordSection::Awards,
        RecordSection::Skills,
        RecordSection::Education,
        RecordSection::Employment,
        RecordSection::CommunityEngagements,
        RecordSection::Hobbies,
        RecordSection::Mentors,
        RecordSection::MicroCredentials,
        RecordSection::RehabPrograms,
    ];

    /// Table name. Also the path segment and JSON key for the section.
    pub fn table(self) -> &'static str {
        match self {
            RecordSection::Introduction => "introduction",
            RecordSection::Awards => "awards",
            RecordSection::Skills => "skills",
            RecordSection::Education => "education",
            RecordSection::Employment => "employment",
            RecordSection::CommunityEngagements => "community_engagements",
            RecordSection::Hobbies => "hobbies",
            RecordSection::Mentors => "mentors",
            RecordSection::MicroCredentials => "micro_credentials",
            RecordSection::RehabPrograms => "rehab_programs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecordSection::Introduction => "Introduction",
            RecordSection::Awards => "Awards",
            RecordSection::Skills => "Skills",
            RecordSection::Education => "Education",
            RecordSection::Employment => "Employment History",
            RecordSection::CommunityEngagements => "Community Engagement",
            RecordSection::Hobbies => "Hobbies & Interests",
            RecordSection::Mentors => "Mentors & Recommendations",
            RecordSection::MicroCredentials => "Micro-credentials & Certifications",
            RecordSection::RehabPrograms => "Rehabilitative Programs",
        }
    }

    /// Sections holding at most one row per candidate.
    pub fn is_singleton(self) -> bool {
        matches!(self, RecordSection::Introduction | RecordSection::Skills)
    }

    /// Parses, validates and canonicalizes a payload for this section.
    pub fn normalize(self, data: Value) -> Result<Value, AppError> {
        match self {
            RecordSection::Introduction => normalize::<IntroductionData>(data),
            RecordSection::Awards => normalize::<AwardData>(data),
            RecordSection::Skills => normalize::<SkillsData>(data),
            RecordSection::Education => normalize::<EducationData>(data),
            RecordSection::Employment => normalize::<EmploymentData>(data),
            RecordSection::CommunityEngagements => normalize::<CommunityEngagementData>(data),
            RecordSection::Hobbies => normalize::<HobbyData>(data),
            RecordSection::Mentors => normalize::<MentorData>(data),
            RecordSection::MicroCredentials => normalize::<MicroCredentialData>(data),
            RecordSection::RehabPrograms => normalize::<RehabProgramData>(data),
        }
    }
}

impl fmt::Display for RecordSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for RecordSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.table() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown record section '{s}'")))
    }
}

/// Payload-level checks beyond what deserialization enforces.
pub trait SectionData: Serialize + DeserializeOwned {
    fn validate(&self) -> Result<(), String>;
}

fn normalize<T: SectionData>(data: Value) -> Result<Value, AppError> {
    let parsed: T = serde_json::from_value(data)
        .map_err(|e| AppError::Validation(format!("Invalid section payload: {e}")))?;
    parsed.validate().map_err(AppError::Validation)?;
    serde_json::to_value(&parsed).map_err(|e| AppError::Internal(e.into()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntroductionData {
    pub narrative: String,
    pub languages: Option<Vec<String>>,
    pub portfolio_url: Option<String>,
    pub video_url: Option<String>,
}

impl SectionData for IntroductionData {
    fn validate(&self) -> Result<(), String> {
        require_text("narrative", &self.narrative)?;
        require_url("portfolio_url", self.portfolio_url.as_deref())?;
        require_url("video_url", self.video_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardData {
    pub name: String,
    pub award_type: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl SectionData for AwardData {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsData {
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub hard_skills: Vec<String>,
    pub other_skills: Option<String>,
}

impl SectionData for SkillsData {
    fn validate(&self) -> Result<(), String> {
        let has_other = self
            .other_skills
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if self.soft_skills.is_empty() && self.hard_skills.is_empty() && !has_other {
            return Err("at least one skill is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationData {
    pub school_name: String,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_enrolled: bool,
    pub grade: Option<String>,
    pub description: Option<String>,
}

impl SectionData for EducationData {
    fn validate(&self) -> Result<(), String> {
        require_text("school_name", &self.school_name)?;
        require_date_order(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmploymentData {
    pub employer: String,
    pub title: String,
    pub employment_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub currently_employed: bool,
    pub description: Option<String>,
}

impl SectionData for EmploymentData {
    fn validate(&self) -> Result<(), String> {
        require_text("employer", &self.employer)?;
        require_text("title", &self.title)?;
        if self.currently_employed && self.end_date.is_some() {
            return Err("end_date must be empty for current employment".to_string());
        }
        require_date_order(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityEngagementData {
    pub organization: String,
    pub role: Option<String>,
    pub engagement_type: Option<String>,
    pub details: Option<String>,
    pub website: Option<String>,
}

impl SectionData for CommunityEngagementData {
    fn validate(&self) -> Result<(), String> {
        require_text("organization", &self.organization)?;
        require_url("website", self.website.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HobbyData {
    pub name: String,
    pub description: Option<String>,
}

impl SectionData for HobbyData {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentorData {
    pub name: String,
    pub company: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub recommendation: Option<String>,
}

impl SectionData for MentorData {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            if !crate::records::validation::is_valid_email(email) {
                return Err(format!("'{email}' is not a valid email address"));
            }
        }
        require_url("linkedin_url", self.linkedin_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroCredentialData {
    pub name: String,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

impl SectionData for MicroCredentialData {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name)?;
        require_date_order(self.issue_date, self.expiry_date)?;
        require_url("credential_url", self.credential_url.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehabProgramData {
    pub program: String,
    pub program_type: Option<String>,
    pub provider: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub details: Option<String>,
}

impl SectionData for RehabProgramData {
    fn validate(&self) -> Result<(), String> {
        require_text("program", &self.program)?;
        require_date_order(self.start_date, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_section_from_path_segment() {
        assert_eq!(
            "community_engagements".parse::<RecordSection>().unwrap(),
            RecordSection::CommunityEngagements
        );
        assert!("resumes".parse::<RecordSection>().is_err());
    }

    #[test]
    fn test_every_section_round_trips_its_table_name() {
        for section in RecordSection::ALL {
            assert_eq!(section.table().parse::<RecordSection>().unwrap(), section);
        }
    }

    #[test]
    fn test_employment_requires_title() {
        let err = RecordSection::Employment
            .normalize(json!({"employer": "Acme", "title": " "}))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(m) if m.contains("title")));
    }

    #[test]
    fn test_current_employment_has_no_end_date() {
        let err = RecordSection::Employment
            .normalize(json!({
                "employer": "Acme",
                "title": "Cook",
                "currently_employed": true,
                "end_date": "2023-01-01"
            }))
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let v = RecordSection::RehabPrograms
            .normalize(json!({"program": "Anger management", "start_date": "2021-03-01"}))
            .unwrap();
        assert_eq!(v["completed"], json!(false));
        assert_eq!(v["start_date"], json!("2021-03-01"));
    }

    #[test]
    fn test_education_dates_ordered() {
        assert!(RecordSection::Education
            .normalize(json!({
                "school_name": "City College",
                "start_date": "2022-01-01",
                "end_date": "2021-01-01"
            }))
            .is_err());
    }

    #[test]
    fn test_skills_need_one_entry() {
        assert!(RecordSection::Skills.normalize(json!({})).is_err());
        assert!(RecordSection::Skills
            .normalize(json!({"hard_skills": ["forklift"]}))
            .is_ok());
    }

    #[test]
    fn test_mentor_email_checked() {
        assert!(RecordSection::Mentors
            .normalize(json!({"name": "Sam", "email": "nope"}))
            .is_err());
        assert!(RecordSection::Mentors
            .normalize(json!({"name": "Sam", "email": ""}))
            .is_ok());
    }

    #[test]
    fn test_malformed_payload_is_validation_error() {
        let err = RecordSection::Awards.normalize(json!({"date": 5})).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
