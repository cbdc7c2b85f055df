use serde::{Deserialize, Serialize};

use crate::records::sections::RecordSection;
use crate::records::store::SectionEntries;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Complete,
    Partial,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionHealth {
    pub section: RecordSection,
    pub score: f64,
    pub entry_count: usize,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub sections: Vec<SectionHealth>,
    pub total_entries: usize,
    pub missing_sections: Vec<RecordSection>,
}

/// Weight and the entry count at which a section counts as complete.
const SECTION_WEIGHTS: &[(RecordSection, f64, usize)] = &[
    (RecordSection::Introduction, 0.20, 1),
    (RecordSection::Employment, 0.15, 2),
    (RecordSection::Education, 0.10, 1),
    (RecordSection::Skills, 0.10, 1),
    (RecordSection::RehabPrograms, 0.15, 1),
    (RecordSection::Mentors, 0.10, 1),
    (RecordSection::CommunityEngagements, 0.07, 1),
    (RecordSection::MicroCredentials, 0.06, 1),
    (RecordSection::Awards, 0.04, 1),
    (RecordSection::Hobbies, 0.03, 1),
];

pub fn compute_completeness_report(record: &[SectionEntries]) -> CompletenessReport {
    let mut sections = Vec::with_capacity(SECTION_WEIGHTS.len());
    let mut missing_sections = Vec::new();
    let mut weighted_score_sum = 0.0;
    let mut total_entries = 0;

    for &(section, weight, target) in SECTION_WEIGHTS {
        let entry_count = record
            .iter()
            .find(|s| s.section == section)
            .map(|s| s.entries.len())
            .unwrap_or(0);
        total_entries += entry_count;

        let score = (entry_count as f64 / target as f64).clamp(0.0, 1.0);
        let status = match entry_count {
            0 => SectionStatus::Missing,
            n if n >= target => SectionStatus::Complete,
            _ => SectionStatus::Partial,
        };

        let mut recommendations = Vec::new();
        match status {
            SectionStatus::Missing => {
                missing_sections.push(section);
                recommendations.push(format!(
                    "Add your {} to give employers a fuller picture",
                    section.label().to_lowercase()
                ));
            }
            SectionStatus::Partial => recommendations.push(format!(
                "Add {} more {} entr{} to complete this section",
                target - entry_count,
                section.label().to_lowercase(),
                if target - entry_count == 1 { "y" } else { "ies" }
            )),
            SectionStatus::Complete => {}
        }

        weighted_score_sum += score * weight;
        sections.push(SectionHealth {
            section,
            score,
            entry_count,
            status,
            recommendations,
        });
    }

    let total_weight: f64 = SECTION_WEIGHTS.iter().map(|(_, w, _)| w).sum();
    let overall_score = if total_weight > 0.0 {
        (weighted_score_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    CompletenessReport {
        overall_score,
        sections,
        total_entries,
        missing_sections,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::models::record::RecordEntryRow;

    fn entries(section: RecordSection, n: usize) -> SectionEntries {
        SectionEntries {
            section,
            label: section.label(),
            entries: (0..n)
                .map(|_| RecordEntryRow {
                    id: Uuid::new_v4(),
                    user_id: Uuid::nil(),
                    data: json!({}),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = SECTION_WEIGHTS.iter().map(|(_, w, _)| w).sum();
        assert!((total - 1.0).abs() < 1e-9, "total was {total}");
    }

    #[test]
    fn test_weights_cover_every_section() {
        for section in RecordSection::ALL {
            assert!(SECTION_WEIGHTS.iter().any(|(s, _, _)| *s == section));
        }
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let report = compute_completeness_report(&[]);
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.missing_sections.len(), RecordSection::ALL.len());
    }

    #[test]
    fn test_full_record_scores_one() {
        let record: Vec<_> = RecordSection::ALL
            .into_iter()
            .map(|s| entries(s, 2))
            .collect();
        let report = compute_completeness_report(&record);
        assert!((report.overall_score - 1.0).abs() < 1e-9);
        assert!(report.missing_sections.is_empty());
        assert_eq!(report.total_entries, 20);
    }

    #[test]
    fn test_single_job_is_partial() {
        let report = compute_completeness_report(&[entries(RecordSection::Employment, 1)]);
        let employment = report
            .sections
            .iter()
            .find(|s| s.section == RecordSection::Employment)
            .unwrap();
        assert_eq!(employment.status, SectionStatus::Partial);
        assert!((employment.score - 0.5).abs() < 1e-9);
        assert!(employment.recommendations[0].contains("1 more"));
        assert!((report.overall_score - 0.075).abs() < 1e-9);
    }
}
