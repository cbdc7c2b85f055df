// Candidate-controlled visibility: which HR admins may see a Restorative
// Record and drive that candidate's assessment.

pub mod handlers;
pub mod permissions;
