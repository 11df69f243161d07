//! Commit status reporting.
//!
//! Every allowed event produces exactly two reports for one `(slug, sha)`
//! pair: `pending` when the build starts, then `success` or `failure` when it
//! ends. The reporter is a capability so handlers can be driven by a fake in
//! tests and by [`GitHubStatusReporter`](crate::github::GitHubStatusReporter)
//! in production.

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::github::GitHubApiError;
use crate::types::{RepoSlug, Sha};

/// Tri-state build status as understood by the repository host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Success,
    Failure,
}

impl BuildStatus {
    /// The `state` string the commit status API expects.
    pub fn as_api_str(self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Success => "success",
            BuildStatus::Failure => "failure",
        }
    }

    /// Returns true for `success` and `failure`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, BuildStatus::Pending)
    }

    /// Short human-readable description attached to the status.
    pub fn description(self) -> &'static str {
        match self {
            BuildStatus::Pending => "Build started",
            BuildStatus::Success => "Build succeeded",
            BuildStatus::Failure => "Build failed",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

/// Errors from reporting a status.
///
/// Handlers log these and carry on; nothing is retried.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The slug cannot be addressed as `owner/repo`.
    #[error("repository slug {0:?} is not of the form owner/repo")]
    InvalidSlug(RepoSlug),

    /// The host API rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] GitHubApiError),
}

/// Reports build statuses for commits.
pub trait StatusReporter {
    /// Sets the status of `sha` in repository `slug`.
    fn report(
        &self,
        slug: &RepoSlug,
        sha: &Sha,
        status: BuildStatus,
    ) -> impl Future<Output = Result<(), ReportError>> + Send;
}
