//! GitHub commit status reporting via octocrab.

mod client;
mod error;

pub use client::GitHubStatusReporter;
pub use error::GitHubApiError;
