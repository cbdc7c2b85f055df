// Restorative Record: candidate profile, record sections, completeness and
// the WOTC survey.

pub mod completeness;
pub mod handlers;
pub mod sections;
pub mod store;
pub mod validation;
pub mod wotc;
