//! The `pending` → build → terminal status sequence shared by all handlers.

use crate::build::{BuildExecutor, BuildRequest};
use crate::status::{BuildStatus, StatusReporter};
use crate::types::{RepoSlug, Sha};

/// Runs one build, reporting its status before and after.
///
/// Exactly two reports are made for the request's status target: `pending`,
/// then the terminal status. Executor errors count as `failure`. Report
/// errors are logged and otherwise ignored; a lost `pending` does not stop
/// the build.
///
/// Returns the terminal status.
pub async fn run_build<R, E>(reporter: &R, executor: &E, request: BuildRequest) -> BuildStatus
where
    R: StatusReporter + Sync,
    E: BuildExecutor + Sync,
{
    let (slug, sha) = request.status_target();

    report(reporter, slug, sha, BuildStatus::Pending).await;

    let status = match executor.execute(&request).await {
        Ok(outcome) => outcome.status(),
        Err(e) => {
            tracing::error!(slug = %slug, sha = %sha, error = %e, "build could not complete");
            BuildStatus::Failure
        }
    };

    report(reporter, slug, sha, status).await;
    status
}

async fn report<R>(reporter: &R, slug: &RepoSlug, sha: &Sha, status: BuildStatus)
where
    R: StatusReporter + Sync,
{
    match reporter.report(slug, sha, status).await {
        Ok(()) => {
            tracing::info!(slug = %slug, sha = %sha, status = %status, "status reported");
        }
        Err(e) => {
            tracing::warn!(
                slug = %slug,
                sha = %sha,
                status = %status,
                error = %e,
                "failed to report status"
            );
        }
    }
}
