//! CI Dispatch - a webhook-triggered continuous-integration dispatcher.
//!
//! Receives GitHub push and pull request events, gates them on a per-branch
//! policy, runs an external build for the relevant commit and reports
//! `pending`/`success`/`failure` commit statuses back to GitHub.

pub mod build;
pub mod config;
pub mod github;
pub mod handlers;
pub mod policy;
pub mod router;
pub mod server;
pub mod status;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
