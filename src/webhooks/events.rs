//! Typed webhook events.
//!
//! Only the two event shapes that can trigger a build are represented here.
//! Everything else is dropped by the parser before a typed value is built.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoSlug, RepositoryIdentity, Sha};

/// A webhook event that can trigger a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    /// A pull request was opened or received new commits.
    PullRequest(PullRequestEvent),

    /// Commits were pushed to a branch that still exists.
    Push(PushEvent),
}

/// Pull request actions that trigger a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    Opened,
    Synchronize,
}

impl PrAction {
    /// Maps a payload `action` to a build-triggering action, if it is one.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "opened" => Some(PrAction::Opened),
            "synchronize" => Some(PrAction::Synchronize),
            _ => None,
        }
    }
}

/// One end of a pull request: a branch name and the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTip {
    pub branch: String,
    pub sha: Sha,
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: PrAction,
    pub number: PrNumber,
    pub title: String,

    /// The branch the PR merges into (`pull_request.base`).
    pub base: BranchTip,

    /// The PR's own branch (`pull_request.head`).
    pub head: BranchTip,

    /// Full slug of the repository holding the head branch. Differs from
    /// `repository.slug` for PRs opened from forks.
    pub head_slug: RepoSlug,

    /// The repository the PR targets.
    pub repository: RepositoryIdentity,
}

/// A push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// The full pushed ref, e.g. `refs/heads/main`.
    pub git_ref: String,

    /// Branch name derived from `git_ref`.
    pub branch: String,

    /// The commit the ref points at after the push.
    pub after: Sha,

    /// Message of the head commit, empty if the payload had none.
    pub head_commit_message: String,

    pub repository: RepositoryIdentity,
}

/// Derives a branch name from a pushed ref: the last `/`-separated segment.
///
/// `refs/heads/feature/x` yields `x`, so nested branch names lose their
/// prefix. Trailing slashes are ignored.
pub fn branch_from_ref(git_ref: &str) -> &str {
    let trimmed = git_ref.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn branch_from_simple_ref() {
        assert_eq!(branch_from_ref("refs/heads/main"), "main");
    }

    #[test]
    fn branch_from_nested_ref_keeps_last_segment() {
        assert_eq!(branch_from_ref("refs/heads/feature/x"), "x");
    }

    #[test]
    fn branch_from_ref_edge_cases() {
        assert_eq!(branch_from_ref("main"), "main");
        assert_eq!(branch_from_ref("refs/heads/main/"), "main");
        assert_eq!(branch_from_ref(""), "");
    }

    #[test]
    fn only_opened_and_synchronize_trigger_builds() {
        assert_eq!(PrAction::from_action("opened"), Some(PrAction::Opened));
        assert_eq!(
            PrAction::from_action("synchronize"),
            Some(PrAction::Synchronize)
        );
        for action in ["closed", "edited", "reopened", "labeled", "Opened", ""] {
            assert_eq!(PrAction::from_action(action), None, "action {action:?}");
        }
    }

    proptest! {
        #[test]
        fn branch_is_final_segment(
            prefix in proptest::collection::vec("[a-z0-9_-]{1,10}", 0..4),
            name in "[a-zA-Z0-9_.-]{1,20}",
        ) {
            let mut parts = prefix.clone();
            parts.push(name.clone());
            let git_ref = parts.join("/");
            prop_assert_eq!(branch_from_ref(&git_ref), name.as_str());
        }

        #[test]
        fn branch_never_contains_slash(git_ref in "[a-z/]{0,30}") {
            prop_assert!(!branch_from_ref(&git_ref).contains('/'));
        }
    }
}
