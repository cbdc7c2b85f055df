//! HR dashboard: every candidate visible to an admin, bucketed by progress.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::access::handlers::HrAdminQuery;
use crate::access::permissions::{granting_candidates, require_hr_admin};
use crate::assessment::classification::{classify, Bucket};
use crate::assessment::steps::AssessmentStep;
use crate::assessment::tracker::{get_statuses, resolve_with_cache};
use crate::errors::AppError;
use crate::invites::service::{list_invites, outstanding_invites};
use crate::models::invite::SentInviteRow;
use crate::models::profile::UserProfileRow;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub step_index: u8,
    pub step_name: &'static str,
    pub final_decision: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct Dashboard {
    pub invites_sent: Vec<SentInviteRow>,
    pub not_started: Vec<CandidateSummary>,
    pub in_progress: Vec<CandidateSummary>,
    pub completed: Vec<CandidateSummary>,
}

/// Candidate progress as loaded for the dashboard.
pub struct CandidateProgress {
    pub profile: UserProfileRow,
    pub step: AssessmentStep,
    pub final_decision: Option<String>,
}

pub fn build_dashboard(
    candidates: Vec<CandidateProgress>,
    invites: &[SentInviteRow],
) -> Dashboard {
    let profiles: Vec<UserProfileRow> = candidates.iter().map(|c| c.profile.clone()).collect();
    let mut dashboard = Dashboard {
        invites_sent: outstanding_invites(invites, &profiles),
        ..Default::default()
    };

    for candidate in candidates {
        let bucket = classify(candidate.step, candidate.final_decision.as_deref());
        let summary = CandidateSummary {
            user_id: candidate.profile.id,
            name: candidate.profile.display_name(),
            email: candidate.profile.email,
            step_index: candidate.step.index(),
            step_name: candidate.step.name(),
            final_decision: candidate.final_decision,
        };
        match bucket {
            Bucket::NotStarted => dashboard.not_started.push(summary),
            Bucket::InProgress => dashboard.in_progress.push(summary),
            Bucket::Completed => dashboard.completed.push(summary),
        }
    }

    dashboard
}

/// GET /api/v1/hr/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    Query(params): Query<HrAdminQuery>,
) -> Result<Json<Dashboard>, AppError> {
    require_hr_admin(&state.db, params.hr_admin_id).await?;

    let profiles = granting_candidates(&state.db, params.hr_admin_id).await?;
    let ids: Vec<Uuid> = profiles.iter().map(|p| p.id).collect();
    let mut statuses = get_statuses(&state.db, &ids).await?;

    let mut candidates = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let status = statuses.remove(&profile.id);
        let resolved = resolve_with_cache(state.cache.as_ref(), profile.id, status.as_ref()).await;
        candidates.push(CandidateProgress {
            profile,
            step: resolved.step,
            final_decision: status.and_then(|s| s.final_decision),
        });
    }

    let invites = list_invites(&state.db, state.cache.as_ref(), params.hr_admin_id).await?;
    Ok(Json(build_dashboard(candidates, &invites)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn candidate(email: &str, step: AssessmentStep, decision: Option<&str>) -> CandidateProgress {
        CandidateProgress {
            profile: UserProfileRow {
                id: Uuid::new_v4(),
                email: email.to_string(),
                first_name: Some("Sam".to_string()),
                last_name: None,
                phone: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            step,
            final_decision: decision.map(String::from),
        }
    }

    fn invite(email: &str) -> SentInviteRow {
        SentInviteRow {
            id: Uuid::new_v4(),
            hr_admin_id: Uuid::nil(),
            email: email.to_string(),
            status: "sent".to_string(),
            last_error: None,
            send_count: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_candidates_land_in_buckets() {
        let dashboard = build_dashboard(
            vec![
                candidate("a@x.com", AssessmentStep::NotStarted, None),
                candidate("b@x.com", AssessmentStep::PreliminaryRevocation, None),
                candidate("c@x.com", AssessmentStep::FinalRevocation, None),
                candidate("d@x.com", AssessmentStep::ConditionalOffer, Some("hired")),
            ],
            &[],
        );
        assert_eq!(dashboard.not_started.len(), 1);
        assert_eq!(dashboard.in_progress.len(), 1);
        assert_eq!(dashboard.in_progress[0].step_name, "Preliminary Job Offer Revocation");
        assert_eq!(dashboard.completed.len(), 2);
    }

    #[test]
    fn test_invites_sent_excludes_joined() {
        let dashboard = build_dashboard(
            vec![candidate("joined@x.com", AssessmentStep::NotStarted, None)],
            &[invite("joined@x.com"), invite("waiting@x.com")],
        );
        assert_eq!(dashboard.invites_sent.len(), 1);
        assert_eq!(dashboard.invites_sent[0].email, "waiting@x.com");
        assert_eq!(dashboard.not_started[0].name, "Sam");
    }
}
