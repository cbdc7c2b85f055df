//! Work Opportunity Tax Credit pre-screening survey.
//!
//! One survey per candidate. Answers are stored as JSONB; the target groups a
//! candidate self-identifies into are derived on read.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::WotcSurveyRow;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WotcAnswers {
    pub snap_recipient: Option<bool>,
    pub tanf_recipient: Option<bool>,
    pub veteran: Option<bool>,
    /// Convicted of a felony and hired within a year of conviction or release.
    pub ex_felon: Option<bool>,
    pub vocational_rehab_referral: Option<bool>,
    pub ssi_recipient: Option<bool>,
    pub long_term_unemployed: Option<bool>,
    pub designated_community_resident: Option<bool>,
    pub summer_youth: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
    SnapRecipient,
    TanfRecipient,
    Veteran,
    ExFelon,
    VocationalRehabilitation,
    SsiRecipient,
    LongTermUnemployed,
    DesignatedCommunityResident,
    SummerYouth,
}

impl WotcAnswers {
    pub fn answered_count(&self) -> usize {
        self.flags().iter().filter(|(_, a)| a.is_some()).count()
    }

    /// Target groups answered "yes".
    pub fn target_groups(&self) -> Vec<TargetGroup> {
        self.flags()
            .into_iter()
            .filter(|(_, answer)| *answer == Some(true))
            .map(|(group, _)| group)
            .collect()
    }

    fn flags(&self) -> [(TargetGroup, Option<bool>); 9] {
        [
            (TargetGroup::SnapRecipient, self.snap_recipient),
            (TargetGroup::TanfRecipient, self.tanf_recipient),
            (TargetGroup::Veteran, self.veteran),
            (TargetGroup::ExFelon, self.ex_felon),
            (
                TargetGroup::VocationalRehabilitation,
                self.vocational_rehab_referral,
            ),
            (TargetGroup::SsiRecipient, self.ssi_recipient),
            (TargetGroup::LongTermUnemployed, self.long_term_unemployed),
            (
                TargetGroup::DesignatedCommunityResident,
                self.designated_community_resident,
            ),
            (TargetGroup::SummerYouth, self.summer_youth),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WotcSurveyView {
    pub survey: WotcSurveyRow,
    pub target_groups: Vec<TargetGroup>,
}

impl WotcSurveyView {
    pub fn from_row(survey: WotcSurveyRow) -> Self {
        // Rows written by this service always parse; anything else reads as unanswered.
        let answers: WotcAnswers = serde_json::from_value(survey.answers.clone()).unwrap_or_default();
        Self {
            target_groups: answers.target_groups(),
            survey,
        }
    }
}

pub async fn submit_survey(
    pool: &PgPool,
    user_id: Uuid,
    answers: &WotcAnswers,
) -> Result<WotcSurveyRow, AppError> {
    if answers.answered_count() == 0 {
        return Err(AppError::Validation(
            "at least one survey question must be answered".to_string(),
        ));
    }
    let answers_json =
        serde_json::to_value(answers).map_err(|e| AppError::Internal(e.into()))?;

    let row = sqlx::query_as::<_, WotcSurveyRow>(
        r#"
        INSERT INTO wotc_surveys (id, user_id, answers) VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO UPDATE SET answers = EXCLUDED.answers, updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&answers_json)
    .fetch_one(pool)
    .await?;

    info!("WOTC survey saved for user {user_id}");
    Ok(row)
}

pub async fn get_survey(pool: &PgPool, user_id: Uuid) -> Result<Option<WotcSurveyRow>, sqlx::Error> {
    sqlx::query_as::<_, WotcSurveyRow>("SELECT * FROM wotc_surveys WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
