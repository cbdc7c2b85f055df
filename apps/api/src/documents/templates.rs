// Markdown bodies for the five notices. Placeholders are `{name}` and are
// filled by `notices::render_notice` in a single pass.

pub const OFFER_LETTER_TEMPLATE: &str = r#"# Conditional Offer of Employment

**Date:** {date}

Dear {candidate_name},

{employer_name} is pleased to extend to you a conditional offer of employment for the position of **{position}**{start_date_clause}{compensation_clause}.

This offer is conditioned on the results of a background check, which may include a review of conviction history. {employer_name} will not consider arrests that did not result in a conviction, referral to or participation in a diversion program, or convictions that have been sealed, dismissed, expunged or statutorily eradicated.

If {employer_name} makes a preliminary decision that your conviction history disqualifies you from this position, you will first receive an individualized assessment and a written notice, and you will be given the opportunity to respond before any final decision is made.

Please direct any questions to {contact_name} ({contact_email}).

Sincerely,

{contact_name}
{employer_name}
"#;

pub const INDIVIDUALIZED_ASSESSMENT_TEMPLATE: &str = r#"# Individualized Assessment

**Candidate:** {candidate_name}
**Position:** {position}
**Employer:** {employer_name}
**Assessment date:** {date}

## 1. Nature and gravity of the offense or conduct

{nature_and_gravity}

## 2. Time elapsed since the offense, conduct or completion of sentence

{time_elapsed}

## 3. Nature of the job held or sought

{job_duties}

## 4. Evidence of rehabilitation and mitigating circumstances

{rehabilitation_evidence}

## Conclusion

{conclusion}

Assessed by {assessor_name}.
"#;

pub const PRELIMINARY_REVOCATION_TEMPLATE: &str = r#"# Notice of Preliminary Decision to Revoke Job Offer

**Date:** {date}

Dear {candidate_name},

After reviewing the results of your background check and conducting an individualized assessment, {employer_name} has made a preliminary decision that your conviction history disqualifies you from the position of **{position}**.

The conviction(s) that led to this preliminary decision:

{convictions}

Our reasoning:

{reasoning}

## Your right to respond

You have the right to respond to this notice before our decision becomes final. Your response may include evidence challenging the accuracy of the conviction history report, evidence of rehabilitation or mitigating circumstances, or both. Examples include certificates of rehabilitation, records showing completion of treatment or education programs, letters of recommendation, and statements from you.

**Your response is due by {response_deadline}.** If you notify us in writing that you dispute the accuracy of the conviction history report and are taking steps to obtain evidence, you will be given at least five additional business days to respond.

A copy of the conviction history report is enclosed.

Please send your response to {contact_name} ({contact_email}).

Sincerely,

{contact_name}
{employer_name}
"#;

pub const INDIVIDUAL_REASSESSMENT_TEMPLATE: &str = r#"# Individual Reassessment

**Candidate:** {candidate_name}
**Position:** {position}
**Employer:** {employer_name}
**Reassessment date:** {date}

## Candidate response

{response_summary}

## Additional evidence considered

{additional_evidence}

## Outcome

{outcome}

Reassessed by {assessor_name}.
"#;

pub const FINAL_REVOCATION_TEMPLATE: &str = r#"# Notice of Final Decision to Revoke Job Offer

**Date:** {date}

Dear {candidate_name},

{employer_name} has made a final decision to revoke the conditional offer of employment for the position of **{position}**, based on the following conviction(s):

{convictions}

{response_clause}

Our reasoning:

{reasoning}

## Your rights

{reconsideration_clause}

You have the right to file a complaint with the California Civil Rights Department (formerly the Department of Fair Employment and Housing) if you believe this decision violates the Fair Chance Act. Complaints may be filed at https://calcivilrights.ca.gov or by calling (800) 884-1684.

Sincerely,

{contact_name}
{employer_name}
"#;
