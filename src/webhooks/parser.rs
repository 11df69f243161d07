//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into typed [`WebhookEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event type comes from the `X-GitHub-Event` header.
//! 2. A light first pass reads only the fields that decide whether the event
//!    triggers a build (`action` for pull requests, `deleted` for pushes).
//! 3. Events that do not trigger a build return `Ok(None)` without any
//!    further validation. A branch-deletion push has a null `head_commit` and
//!    `after` of all zeros; it must not be rejected for that.
//! 4. Build-triggering events are parsed in full; missing or mistyped fields
//!    are an `Err`.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoSlug, RepositoryIdentity, Sha};

use super::events::{
    BranchTip, PrAction, PullRequestEvent, PushEvent, WebhookEvent, branch_from_ref,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has an unusable value.
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a build-triggering event.
///
/// # Returns
///
/// * `Ok(Some(event))` - the event should be considered for a build
/// * `Ok(None)` - unknown event type, non-building action, or deleted branch
/// * `Err(e)` - the event would trigger a build but its payload is malformed
///
/// # Examples
///
/// ```
/// use ci_dispatch::webhooks::parse_webhook;
///
/// let payload = br#"{"ref": "refs/heads/gone", "deleted": true, "head_commit": null}"#;
/// assert!(parse_webhook("push", payload).unwrap().is_none());
/// assert!(parse_webhook("star", b"{}").unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<WebhookEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(payload).map(|opt| opt.map(WebhookEvent::PullRequest)),
        "push" => parse_push(payload).map(|opt| opt.map(WebhookEvent::Push)),
        // Unknown event types are ignored (not an error)
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestAction {
    action: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    number: u64,
    pull_request: RawPullRequest,
    repository: RawPullRequestRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    title: String,
    base: RawBase,
    head: RawHead,
}

#[derive(Debug, Deserialize)]
struct RawBase {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    #[serde(rename = "ref")]
    ref_name: String,
    sha: String,
    repo: Option<RawHeadRepo>,
}

#[derive(Debug, Deserialize)]
struct RawHeadRepo {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct RawPullRequestRepository {
    clone_url: String,
    name: String,
    owner: RawOwner,
    full_name: Option<String>,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<PullRequestEvent>, ParseError> {
    let classify: RawPullRequestAction = serde_json::from_slice(payload)?;
    let Some(action) = classify.action.as_deref().and_then(PrAction::from_action) else {
        return Ok(None);
    };

    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    // The head repository is null when the fork it lived in has been deleted;
    // there is nowhere to report a status to.
    let head_slug = raw
        .pull_request
        .head
        .repo
        .map(|repo| RepoSlug::new(repo.full_name))
        .ok_or_else(|| ParseError::InvalidField {
            field: "pull_request.head.repo",
            value: "null".to_string(),
        })?;

    let repository = match raw.repository.full_name {
        Some(full_name) => RepositoryIdentity::with_slug(
            raw.repository.owner.login,
            raw.repository.name,
            raw.repository.clone_url,
            RepoSlug::new(full_name),
        ),
        None => RepositoryIdentity::new(
            raw.repository.owner.login,
            raw.repository.name,
            raw.repository.clone_url,
        ),
    };

    Ok(Some(PullRequestEvent {
        action,
        number: PrNumber(raw.number),
        title: raw.pull_request.title,
        base: BranchTip {
            branch: raw.pull_request.base.ref_name,
            sha: Sha::new(raw.pull_request.base.sha),
        },
        head: BranchTip {
            branch: raw.pull_request.head.ref_name,
            sha: Sha::new(raw.pull_request.head.sha),
        },
        head_slug,
        repository,
    }))
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushDeleted {
    deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(rename = "ref")]
    ref_name: String,
    after: String,
    head_commit: Option<RawHeadCommit>,
    repository: RawPushRepository,
}

#[derive(Debug, Deserialize)]
struct RawHeadCommit {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawPushRepository {
    clone_url: String,
    name: String,
    full_name: String,
    owner: RawPushOwner,
}

/// Push payloads describe the owner with `name` and, depending on the
/// delivery format, `login`.
#[derive(Debug, Deserialize)]
struct RawPushOwner {
    login: Option<String>,
    name: Option<String>,
}

fn parse_push(payload: &[u8]) -> Result<Option<PushEvent>, ParseError> {
    let classify: RawPushDeleted = serde_json::from_slice(payload)?;
    if classify.deleted.unwrap_or(false) {
        return Ok(None);
    }

    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    let branch = branch_from_ref(&raw.ref_name).to_string();
    if branch.is_empty() {
        return Err(ParseError::InvalidField {
            field: "ref",
            value: raw.ref_name,
        });
    }

    let owner = raw
        .repository
        .owner
        .login
        .or(raw.repository.owner.name)
        .ok_or_else(|| ParseError::InvalidField {
            field: "repository.owner.login",
            value: "missing".to_string(),
        })?;

    Ok(Some(PushEvent {
        branch,
        git_ref: raw.ref_name,
        after: Sha::new(raw.after),
        head_commit_message: raw.head_commit.map(|c| c.message).unwrap_or_default(),
        repository: RepositoryIdentity::with_slug(
            owner,
            raw.repository.name,
            raw.repository.clone_url,
            RepoSlug::new(raw.repository.full_name),
        ),
    }))
}
