//! Request handlers

mod auth;
pub mod health;
pub mod reviews;
pub mod threads;
pub mod webhooks;

pub use health::health_check;
pub use reviews::{cast_votes, retry_review, senior_review};
pub use threads::{thread_history, thread_status};
pub use webhooks::{picked_reviewers_webhook, submission_webhook};
