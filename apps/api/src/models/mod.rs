pub mod assessment;
pub mod invite;
pub mod profile;
pub mod record;
