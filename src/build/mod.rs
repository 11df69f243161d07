//! Build requests and the executor capability.
//!
//! A handler turns an allowed event into a [`BuildRequest`], hands it to a
//! [`BuildExecutor`] and waits for the outcome. What the executor does with
//! the request (cloning, checkout, compiling) is opaque to the handler.

pub mod script;

use std::future::Future;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::status::BuildStatus;
use crate::types::{PrNumber, RepoSlug, RepositoryIdentity, Sha};

pub use script::ScriptExecutor;

/// Build request derived from a pull request event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestBuildRequest {
    pub title: String,
    pub number: PrNumber,

    /// Head branch and commit.
    pub source_branch: String,
    pub source_sha: Sha,

    /// Repository the head commit lives in. For fork PRs this is the fork,
    /// and it is where statuses are reported.
    pub source_slug: RepoSlug,

    /// Base branch and commit.
    pub target_branch: String,
    pub target_sha: Sha,

    /// The repository the PR was opened against.
    pub repository: RepositoryIdentity,
}

/// Build request derived from a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushBuildRequest {
    /// Last segment of the pushed ref.
    pub branch: String,

    /// The commit the ref now points at (`after`).
    pub sha: Sha,

    /// Head commit message; empty when the push carried no head commit.
    pub message: String,

    pub repository: RepositoryIdentity,
}

/// A request to run one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRequest {
    PullRequest(PullRequestBuildRequest),
    Push(PushBuildRequest),
}

impl BuildRequest {
    /// The `(slug, sha)` pair statuses for this build are reported against.
    pub fn status_target(&self) -> (&RepoSlug, &Sha) {
        match self {
            BuildRequest::PullRequest(pr) => (&pr.source_slug, &pr.source_sha),
            BuildRequest::Push(push) => (&push.repository.slug, &push.sha),
        }
    }
}

impl From<PullRequestBuildRequest> for BuildRequest {
    fn from(request: PullRequestBuildRequest) -> Self {
        BuildRequest::PullRequest(request)
    }
}

impl From<PushBuildRequest> for BuildRequest {
    fn from(request: PushBuildRequest) -> Self {
        BuildRequest::Push(request)
    }
}

/// How a build that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Success,
    Failure,
}

impl BuildOutcome {
    /// The terminal status reported for this outcome.
    pub fn status(self) -> BuildStatus {
        match self {
            BuildOutcome::Success => BuildStatus::Success,
            BuildOutcome::Failure => BuildStatus::Failure,
        }
    }
}

/// Errors that prevent a build from producing an outcome.
///
/// Handlers report all of these as `failure`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// The build process could not be started.
    #[error("failed to start build program {program:?}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting for the build process failed.
    #[error("failed to wait for build process: {0}")]
    Wait(#[source] io::Error),

    /// The build ran past its deadline and was killed.
    #[error("build timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}

/// Runs builds out of process.
pub trait BuildExecutor {
    /// Runs the build described by `request` to completion.
    fn execute(
        &self,
        request: &BuildRequest,
    ) -> impl Future<Output = Result<BuildOutcome, ExecutorError>> + Send;
}
