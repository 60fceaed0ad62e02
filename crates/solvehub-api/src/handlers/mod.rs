//! HTTP handler modules for solvehub-api.

pub mod answers;
pub mod attachments;
pub mod auth;
pub mod exercises;
pub mod notifications;
pub mod reports;
pub mod subjects;
pub mod users;
