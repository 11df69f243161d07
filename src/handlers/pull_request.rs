//! Handler for `pull_request` events that open or update a PR.

use crate::build::{BuildExecutor, BuildRequest, PullRequestBuildRequest};
use crate::policy::{BuildKind, PolicyConfig};
use crate::status::StatusReporter;
use crate::webhooks::PullRequestEvent;

use super::{HandleOutcome, lifecycle::run_build};

/// Handles a pull request that was opened or synchronized.
///
/// The build is gated on the PR's target branch. Statuses go to the head
/// commit in the head repository, which for a fork PR is the fork.
pub async fn handle_pull_request<R, E>(
    event: &PullRequestEvent,
    policy: &PolicyConfig,
    reporter: &R,
    executor: &E,
) -> HandleOutcome
where
    R: StatusReporter + Sync,
    E: BuildExecutor + Sync,
{
    let target_branch = event.base.branch.as_str();

    if !policy.is_allowed(target_branch, BuildKind::PullRequest) {
        tracing::info!(
            pr = %event.number,
            branch = target_branch,
            "pull request builds are not enabled for target branch"
        );
        return HandleOutcome::Gated;
    }

    tracing::info!(
        pr = %event.number,
        action = ?event.action,
        from = %event.head.branch,
        to = target_branch,
        sha = %event.head.sha.short(),
        "building pull request"
    );

    let request = BuildRequest::PullRequest(build_request(event));
    let status = run_build(reporter, executor, request).await;

    tracing::info!(pr = %event.number, status = %status, "pull request processed");
    HandleOutcome::Built(status)
}

fn build_request(event: &PullRequestEvent) -> PullRequestBuildRequest {
    PullRequestBuildRequest {
        title: event.title.clone(),
        number: event.number,
        source_branch: event.head.branch.clone(),
        source_sha: event.head.sha.clone(),
        source_slug: event.head_slug.clone(),
        target_branch: event.base.branch.clone(),
        target_sha: event.base.sha.clone(),
        repository: event.repository.clone(),
    }
}
