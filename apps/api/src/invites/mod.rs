// HR-initiated invitations for candidates to build and share a record.

pub mod handlers;
pub mod service;
