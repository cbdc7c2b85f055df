// Phase notices: one legally-mandated document per assessment step.
// Issuing a notice is the only way the HR flow advances past a step with
// paperwork attached; see `store::issue_notice`.

pub mod handlers;
pub mod notices;
pub mod store;
pub mod templates;
