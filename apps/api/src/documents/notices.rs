//! Typed notice payloads and rendering.
//!
//! Each notice kind belongs to exactly one assessment step. Rendering is a
//! pure function of the payload, so stored fields always reproduce the
//! archived document.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::assessment::steps::AssessmentStep;
use crate::documents::templates::{
    FINAL_REVOCATION_TEMPLATE, INDIVIDUALIZED_ASSESSMENT_TEMPLATE,
    INDIVIDUAL_REASSESSMENT_TEMPLATE, OFFER_LETTER_TEMPLATE, PRELIMINARY_REVOCATION_TEMPLATE,
};
use crate::records::validation::{is_valid_email, require_text};

/// Minimum response window after a preliminary revocation notice.
pub const RESPONSE_WINDOW_BUSINESS_DAYS: u32 = 5;

const NOT_PROVIDED: &str = "None provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    OfferLetter,
    IndividualizedAssessment,
    PreliminaryRevocation,
    IndividualReassessment,
    FinalRevocation,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::OfferLetter => "offer_letter",
            NoticeKind::IndividualizedAssessment => "individualized_assessment",
            NoticeKind::PreliminaryRevocation => "preliminary_revocation",
            NoticeKind::IndividualReassessment => "individual_reassessment",
            NoticeKind::FinalRevocation => "final_revocation",
        }
    }

    pub fn step(self) -> AssessmentStep {
        match self {
            NoticeKind::OfferLetter => AssessmentStep::ConditionalOffer,
            NoticeKind::IndividualizedAssessment => AssessmentStep::IndividualizedAssessment,
            NoticeKind::PreliminaryRevocation => AssessmentStep::PreliminaryRevocation,
            NoticeKind::IndividualReassessment => AssessmentStep::IndividualReassessment,
            NoticeKind::FinalRevocation => AssessmentStep::FinalRevocation,
        }
    }

    pub fn for_step(step: AssessmentStep) -> Option<Self> {
        match step {
            AssessmentStep::NotStarted => None,
            AssessmentStep::ConditionalOffer => Some(NoticeKind::OfferLetter),
            AssessmentStep::IndividualizedAssessment => Some(NoticeKind::IndividualizedAssessment),
            AssessmentStep::PreliminaryRevocation => Some(NoticeKind::PreliminaryRevocation),
            AssessmentStep::IndividualReassessment => Some(NoticeKind::IndividualReassessment),
            AssessmentStep::FinalRevocation => Some(NoticeKind::FinalRevocation),
        }
    }
}

/// Fields shared by every notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeHeader {
    pub candidate_name: String,
    pub employer_name: String,
    pub position: String,
    pub date: NaiveDate,
}

impl NoticeHeader {
    fn validate(&self) -> Result<(), String> {
        require_text("candidate_name", &self.candidate_name)?;
        require_text("employer_name", &self.employer_name)?;
        require_text("position", &self.position)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub contact_name: String,
    pub contact_email: String,
}

impl Contact {
    fn validate(&self) -> Result<(), String> {
        require_text("contact_name", &self.contact_name)?;
        if !is_valid_email(&self.contact_email) {
            return Err(format!(
                "'{}' is not a valid contact email",
                self.contact_email
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferLetterFields {
    #[serde(flatten)]
    pub header: NoticeHeader,
    #[serde(flatten)]
    pub contact: Contact,
    pub start_date: Option<NaiveDate>,
    pub compensation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualizedAssessmentFields {
    #[serde(flatten)]
    pub header: NoticeHeader,
    pub nature_and_gravity: String,
    pub time_elapsed: String,
    pub job_duties: String,
    pub rehabilitation_evidence: Option<String>,
    pub conclusion: String,
    pub assessor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreliminaryRevocationFields {
    #[serde(flatten)]
    pub header: NoticeHeader,
    #[serde(flatten)]
    pub contact: Contact,
    pub convictions: Vec<String>,
    pub reasoning: String,
    pub response_deadline: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassessmentOutcome {
    ProceedWithOffer,
    RevokeOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualReassessmentFields {
    #[serde(flatten)]
    pub header: NoticeHeader,
    pub response_received: bool,
    pub response_summary: Option<String>,
    pub additional_evidence: Option<String>,
    pub outcome: ReassessmentOutcome,
    pub outcome_explanation: String,
    pub assessor_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalRevocationFields {
    #[serde(flatten)]
    pub header: NoticeHeader,
    #[serde(flatten)]
    pub contact: Contact,
    pub convictions: Vec<String>,
    pub reasoning: String,
    pub candidate_response_considered: bool,
    /// Internal reconsideration or appeal procedure, if the employer offers one.
    pub reconsideration_process: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    OfferLetter(OfferLetterFields),
    IndividualizedAssessment(IndividualizedAssessmentFields),
    PreliminaryRevocation(PreliminaryRevocationFields),
    IndividualReassessment(IndividualReassessmentFields),
    FinalRevocation(FinalRevocationFields),
}

impl Notice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Notice::OfferLetter(_) => NoticeKind::OfferLetter,
            Notice::IndividualizedAssessment(_) => NoticeKind::IndividualizedAssessment,
            Notice::PreliminaryRevocation(_) => NoticeKind::PreliminaryRevocation,
            Notice::IndividualReassessment(_) => NoticeKind::IndividualReassessment,
            Notice::FinalRevocation(_) => NoticeKind::FinalRevocation,
        }
    }

    pub fn header(&self) -> &NoticeHeader {
        match self {
            Notice::OfferLetter(f) => &f.header,
            Notice::IndividualizedAssessment(f) => &f.header,
            Notice::PreliminaryRevocation(f) => &f.header,
            Notice::IndividualReassessment(f) => &f.header,
            Notice::FinalRevocation(f) => &f.header,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.header().validate()?;
        match self {
            Notice::OfferLetter(f) => {
                f.contact.validate()?;
                if let Some(start) = f.start_date {
                    if start < f.header.date {
                        return Err("start_date cannot precede the offer date".to_string());
                    }
                }
                Ok(())
            }
            Notice::IndividualizedAssessment(f) => {
                require_text("nature_and_gravity", &f.nature_and_gravity)?;
                require_text("time_elapsed", &f.time_elapsed)?;
                require_text("job_duties", &f.job_duties)?;
                require_text("conclusion", &f.conclusion)?;
                require_text("assessor_name", &f.assessor_name)
            }
            Notice::PreliminaryRevocation(f) => {
                f.contact.validate()?;
                require_convictions(&f.convictions)?;
                require_text("reasoning", &f.reasoning)?;
                let earliest = add_business_days(f.header.date, RESPONSE_WINDOW_BUSINESS_DAYS);
                if f.response_deadline < earliest {
                    return Err(format!(
                        "response_deadline must allow at least {RESPONSE_WINDOW_BUSINESS_DAYS} business days (no earlier than {earliest})"
                    ));
                }
                Ok(())
            }
            Notice::IndividualReassessment(f) => {
                if f.response_received
                    && f.response_summary.as_deref().map_or(true, |s| s.trim().is_empty())
                {
                    return Err("response_summary is required when a response was received".to_string());
                }
                require_text("outcome_explanation", &f.outcome_explanation)?;
                require_text("assessor_name", &f.assessor_name)
            }
            Notice::FinalRevocation(f) => {
                f.contact.validate()?;
                require_convictions(&f.convictions)?;
                require_text("reasoning", &f.reasoning)
            }
        }
    }
}

fn require_convictions(convictions: &[String]) -> Result<(), String> {
    if convictions.iter().all(|c| c.trim().is_empty()) {
        return Err("at least one conviction must be listed".to_string());
    }
    Ok(())
}

/// Adds `days` business days (Mon-Fri) to `from`. Holidays are not modeled.
pub fn add_business_days(from: NaiveDate, days: u32) -> NaiveDate {
    let mut date = from;
    let mut remaining = days;
    while remaining > 0 {
        date += Duration::days(1);
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    date
}

fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| format!("- {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_not_provided(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_PROVIDED)
}

/// Fills `{key}` placeholders in one left-to-right pass. Inserted values are
/// never rescanned, and unknown `{...}` tokens are left as written.
fn fill(template: &str, header: &NoticeHeader, extra: &[(&str, String)]) -> String {
    let mut values: HashMap<&str, String> = HashMap::from([
        ("candidate_name", header.candidate_name.trim().to_string()),
        ("employer_name", header.employer_name.trim().to_string()),
        ("position", header.position.trim().to_string()),
        ("date", format_date(header.date)),
    ]);
    values.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => match values.get(&after[..close]) {
                Some(value) => {
                    out.push_str(value);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            },
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn contact_fields(contact: &Contact) -> [(&'static str, String); 2] {
    [
        ("contact_name", contact.contact_name.trim().to_string()),
        ("contact_email", contact.contact_email.trim().to_string()),
    ]
}

/// Renders a notice to Markdown.
pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::OfferLetter(f) => {
            let start_date_clause = f
                .start_date
                .map(|d| format!(", with an anticipated start date of {}", format_date(d)))
                .unwrap_or_default();
            let compensation_clause = f
                .compensation
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|c| format!(" at a compensation of {c}"))
                .unwrap_or_default();
            let mut extra = contact_fields(&f.contact).to_vec();
            extra.push(("start_date_clause", start_date_clause));
            extra.push(("compensation_clause", compensation_clause));
            fill(OFFER_LETTER_TEMPLATE, &f.header, &extra)
        }
        Notice::IndividualizedAssessment(f) => fill(
            INDIVIDUALIZED_ASSESSMENT_TEMPLATE,
            &f.header,
            &[
                ("nature_and_gravity", f.nature_and_gravity.trim().to_string()),
                ("time_elapsed", f.time_elapsed.trim().to_string()),
                ("job_duties", f.job_duties.trim().to_string()),
                (
                    "rehabilitation_evidence",
                    or_not_provided(f.rehabilitation_evidence.as_deref()).to_string(),
                ),
                ("conclusion", f.conclusion.trim().to_string()),
                ("assessor_name", f.assessor_name.trim().to_string()),
            ],
        ),
        Notice::PreliminaryRevocation(f) => {
            let mut extra = contact_fields(&f.contact).to_vec();
            extra.push(("convictions", bullet_list(&f.convictions)));
            extra.push(("reasoning", f.reasoning.trim().to_string()));
            extra.push(("response_deadline", format_date(f.response_deadline)));
            fill(PRELIMINARY_REVOCATION_TEMPLATE, &f.header, &extra)
        }
        Notice::IndividualReassessment(f) => {
            let response_summary = if f.response_received {
                or_not_provided(f.response_summary.as_deref()).to_string()
            } else {
                "No response was received within the response period.".to_string()
            };
            let outcome = match f.outcome {
                ReassessmentOutcome::ProceedWithOffer => "The conditional offer stands.",
                ReassessmentOutcome::RevokeOffer => "The conditional offer will be revoked.",
            };
            fill(
                INDIVIDUAL_REASSESSMENT_TEMPLATE,
                &f.header,
                &[
                    ("response_summary", response_summary),
                    (
                        "additional_evidence",
                        or_not_provided(f.additional_evidence.as_deref()).to_string(),
                    ),
                    (
                        "outcome",
                        format!("{outcome} {}", f.outcome_explanation.trim()),
                    ),
                    ("assessor_name", f.assessor_name.trim().to_string()),
                ],
            )
        }
        Notice::FinalRevocation(f) => {
            let response_clause = if f.candidate_response_considered {
                "We considered the information you submitted in response to our preliminary notice before making this decision."
            } else {
                "We did not receive a response to our preliminary notice within the response period."
            };
            let reconsideration_clause = match f
                .reconsideration_process
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
            {
                Some(process) => format!("You may request reconsideration of this decision: {process}"),
                None => format!("{} does not offer an internal reconsideration process.", f.header.employer_name.trim()),
            };
            let mut extra = contact_fields(&f.contact).to_vec();
            extra.push(("convictions", bullet_list(&f.convictions)));
            extra.push(("reasoning", f.reasoning.trim().to_string()));
            extra.push(("response_clause", response_clause.to_string()));
            extra.push(("reconsideration_clause", reconsideration_clause));
            fill(FINAL_REVOCATION_TEMPLATE, &f.header, &extra)
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn preliminary(deadline: NaiveDate) -> Notice {
        serde_json::from_value(json!({
            "kind": "preliminary_revocation",
            "candidate_name": "Jordan Reyes",
            "employer_name": "Acme Logistics",
            "position": "Warehouse Associate",
            "date": "2024-03-01",
            "contact_name": "Pat Lee",
            "contact_email": "pat@acme.example",
            "convictions": ["2015 - Burglary (PC 459)"],
            "reasoning": "Position involves unsupervised access to inventory.",
            "response_deadline": deadline
        }))
        .unwrap()
    }

    #[test]
    fn test_business_days_skip_weekend() {
        // Friday + 5 business days = next Friday
        assert_eq!(add_business_days(date(2024, 3, 1), 5), date(2024, 3, 8));
        // Wednesday + 3 = Monday
        assert_eq!(add_business_days(date(2024, 3, 6), 3), date(2024, 3, 11));
        assert_eq!(add_business_days(date(2024, 3, 6), 0), date(2024, 3, 6));
    }

    #[test]
    fn test_kind_step_mapping_is_bijective() {
        for step in &AssessmentStep::ALL[1..] {
            let kind = NoticeKind::for_step(*step).unwrap();
            assert_eq!(kind.step(), *step);
        }
        assert_eq!(NoticeKind::for_step(AssessmentStep::NotStarted), None);
    }

    #[test]
    fn test_preliminary_deadline_must_allow_window() {
        assert!(preliminary(date(2024, 3, 8)).validate().is_ok());
        let err = preliminary(date(2024, 3, 7)).validate().unwrap_err();
        assert!(err.contains("2024-03-08"), "{err}");
    }

    #[test]
    fn test_preliminary_render_interpolates_everything() {
        let md = render_notice(&preliminary(date(2024, 3, 8)));
        assert!(md.contains("Dear Jordan Reyes,"));
        assert!(md.contains("- 2015 - Burglary (PC 459)"));
        assert!(md.contains("**Your response is due by March 8, 2024.**"));
        assert!(md.contains("pat@acme.example"));
        assert!(!md.contains('{'), "unfilled placeholder in:\n{md}");
    }

    #[test]
    fn test_braces_in_user_text_render_verbatim() {
        let mut notice = preliminary(date(2024, 3, 8));
        if let Notice::PreliminaryRevocation(f) = &mut notice {
            f.header.candidate_name = "Jordan {reasoning}".to_string();
            f.reasoning = "Reply by {response_deadline} to {contact_email}".to_string();
        }
        let md = render_notice(&notice);
        assert!(md.contains("Dear Jordan {reasoning},"), "{md}");
        assert!(md.contains("Reply by {response_deadline} to {contact_email}"), "{md}");
    }

    #[test]
    fn test_fill_leaves_unknown_and_unclosed_tokens() {
        let header = NoticeHeader {
            candidate_name: "Sam".to_string(),
            employer_name: "Acme".to_string(),
            position: "Driver".to_string(),
            date: date(2024, 3, 1),
        };
        assert_eq!(
            fill("{candidate_name} {unknown} {position", &header, &[]),
            "Sam {unknown} {position"
        );
    }

    #[test]
    fn test_offer_letter_optional_clauses() {
        let notice: Notice = serde_json::from_value(json!({
            "kind": "offer_letter",
            "candidate_name": "Jordan Reyes",
            "employer_name": "Acme Logistics",
            "position": "Driver",
            "date": "2024-02-01",
            "contact_name": "Pat Lee",
            "contact_email": "pat@acme.example",
            "start_date": "2024-02-15"
        }))
        .unwrap();
        assert!(notice.validate().is_ok());
        let md = render_notice(&notice);
        assert!(md.contains("**Driver**, with an anticipated start date of February 15, 2024."));
        assert!(!md.contains("compensation of"));
        assert!(!md.contains('{'));
    }

    #[test]
    fn test_offer_start_before_offer_rejected() {
        let notice: Notice = serde_json::from_value(json!({
            "kind": "offer_letter",
            "candidate_name": "J",
            "employer_name": "A",
            "position": "P",
            "date": "2024-02-01",
            "contact_name": "Pat",
            "contact_email": "pat@acme.example",
            "start_date": "2024-01-15"
        }))
        .unwrap();
        assert!(notice.validate().is_err());
    }

    #[test]
    fn test_reassessment_requires_summary_when_response_received() {
        let notice: Notice = serde_json::from_value(json!({
            "kind": "individual_reassessment",
            "candidate_name": "J",
            "employer_name": "A",
            "position": "P",
            "date": "2024-03-15",
            "response_received": true,
            "outcome": "proceed_with_offer",
            "outcome_explanation": "Certificate of rehabilitation provided.",
            "assessor_name": "Pat"
        }))
        .unwrap();
        assert!(notice.validate().is_err());
    }

    #[test]
    fn test_final_revocation_without_reconsideration() {
        let notice: Notice = serde_json::from_value(json!({
            "kind": "final_revocation",
            "candidate_name": "Jordan Reyes",
            "employer_name": "Acme Logistics",
            "position": "Driver",
            "date": "2024-03-20",
            "contact_name": "Pat Lee",
            "contact_email": "pat@acme.example",
            "convictions": ["2019 - DUI"],
            "reasoning": "Role requires a clean driving record.",
            "candidate_response_considered": false
        }))
        .unwrap();
        assert!(notice.validate().is_ok());
        let md = render_notice(&notice);
        assert!(md.contains("Acme Logistics does not offer an internal reconsideration process."));
        assert!(md.contains("did not receive a response"));
        assert_eq!(notice.kind().step(), AssessmentStep::FinalRevocation);
    }

    #[test]
    fn test_empty_convictions_rejected() {
        let mut notice = preliminary(date(2024, 3, 8));
        if let Notice::PreliminaryRevocation(f) = &mut notice {
            f.convictions = vec!["  ".to_string()];
        }
        assert!(notice.validate().is_err());
    }
}
