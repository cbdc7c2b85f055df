// Assessment workflow: the five-step Fair Chance notice sequence.
// The step counter lives in `assessment_status`; the cache only mirrors it.

pub mod classification;
pub mod handlers;
pub mod steps;
pub mod tracker;
pub mod transitions;
