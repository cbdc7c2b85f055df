use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::assessment::steps::AssessmentStep;

/// Dashboard bucket for a candidate who has granted access.
/// Invited-but-not-joined candidates are tracked separately by `pending_invites`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    NotStarted,
    InProgress,
    Completed,
}

/// A blank or whitespace-only decision counts as unset.
pub fn has_final_decision(final_decision: Option<&str>) -> bool {
    final_decision.is_some_and(|d| !d.trim().is_empty())
}

/// Completed: final decision recorded, or every notice issued.
/// Otherwise step 0 is NotStarted and steps 1-4 are InProgress.
pub fn classify(step: AssessmentStep, final_decision: Option<&str>) -> Bucket {
    if has_final_decision(final_decision) || step.is_last() {
        return Bucket::Completed;
    }
    match step {
        AssessmentStep::NotStarted => Bucket::NotStarted,
        _ => Bucket::InProgress,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Invited emails with no matching granted-access profile.
/// Comparison is case-insensitive on trimmed addresses; the result keeps the
/// first spelling of each invited address, in invite order, without duplicates.
pub fn pending_invites<'a, I, G>(invited: I, granted: G) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
    G: IntoIterator<Item = &'a str>,
{
    let granted: HashSet<String> = granted.into_iter().map(normalize_email).collect();
    let mut seen = HashSet::new();
    invited
        .into_iter()
        .filter(|email| {
            let key = normalize_email(email);
            !key.is_empty() && !granted.contains(&key) && seen.insert(key)
        })
        .map(|email| email.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_decision_wins_regardless_of_step() {
        for step in AssessmentStep::ALL {
            assert_eq!(classify(step, Some("hired")), Bucket::Completed);
        }
    }

    #[test]
    fn test_last_step_without_decision_is_completed() {
        assert_eq!(classify(AssessmentStep::FinalRevocation, None), Bucket::Completed);
    }

    #[test]
    fn test_middle_steps_in_progress() {
        for step in &AssessmentStep::ALL[1..5] {
            assert_eq!(classify(*step, None), Bucket::InProgress);
        }
    }

    #[test]
    fn test_step_zero_not_started() {
        assert_eq!(classify(AssessmentStep::NotStarted, None), Bucket::NotStarted);
    }

    #[test]
    fn test_blank_decision_is_unset() {
        assert_eq!(
            classify(AssessmentStep::ConditionalOffer, Some("   ")),
            Bucket::InProgress
        );
        assert!(!has_final_decision(Some("")));
    }

    #[test]
    fn test_pending_invites_set_difference() {
        let invited = ["a@x.com", "B@x.com", "c@x.com"];
        let granted = ["b@x.com"];
        let mut pending = pending_invites(invited, granted);
        pending.sort();
        assert_eq!(pending, vec!["a@x.com", "c@x.com"]);
    }

    #[test]
    fn test_pending_invites_order_irrelevant() {
        let granted = ["c@x.com"];
        let mut a = pending_invites(["a@x.com", "b@x.com", "c@x.com"], granted);
        let mut b = pending_invites(["c@x.com", "b@x.com", "a@x.com"], granted);
        a.sort();
        b.sort();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pending_invites_dedups_and_trims() {
        let pending = pending_invites([" a@x.com", "A@X.com ", ""], []);
        assert_eq!(pending, vec!["a@x.com"]);
    }
}
