//! Handler for `push` events to live branches.

use crate::build::{BuildExecutor, BuildRequest, PushBuildRequest};
use crate::policy::{BuildKind, PolicyConfig};
use crate::status::StatusReporter;
use crate::webhooks::PushEvent;

use super::{HandleOutcome, lifecycle::run_build};

/// Handles a push to a branch.
///
/// The build is gated on the pushed branch. Statuses go to `after` in the
/// pushed repository.
pub async fn handle_push<R, E>(
    event: &PushEvent,
    policy: &PolicyConfig,
    reporter: &R,
    executor: &E,
) -> HandleOutcome
where
    R: StatusReporter + Sync,
    E: BuildExecutor + Sync,
{
    let branch = event.branch.as_str();

    if !policy.is_allowed(branch, BuildKind::Push) {
        tracing::info!(
            branch,
            git_ref = %event.git_ref,
            "push builds are not enabled for branch"
        );
        return HandleOutcome::Gated;
    }

    tracing::info!(
        branch,
        sha = %event.after.short(),
        message = %event.head_commit_message,
        "building push"
    );

    let request = BuildRequest::Push(PushBuildRequest {
        branch: event.branch.clone(),
        sha: event.after.clone(),
        message: event.head_commit_message.clone(),
        repository: event.repository.clone(),
    });
    let status = run_build(reporter, executor, request).await;

    tracing::info!(branch, status = %status, "push processed");
    HandleOutcome::Built(status)
}
