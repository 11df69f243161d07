//! Shared test doubles, payload builders and arbitrary generators.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use proptest::prelude::*;
use serde_json::{Value, json};

use crate::build::{BuildExecutor, BuildOutcome, BuildRequest, ExecutorError};
use crate::github::GitHubApiError;
use crate::status::{BuildStatus, ReportError, StatusReporter};
use crate::types::{RepoSlug, Sha};

/// One observable interaction with a capability, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Report(RepoSlug, Sha, BuildStatus),
    Execute(BuildRequest),
}

/// Call log shared between a [`RecordingReporter`] and a [`ScriptedExecutor`]
/// so tests can assert on interleaving.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Call>>>);

impl Journal {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn reports(&self) -> Vec<(RepoSlug, Sha, BuildStatus)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Report(slug, sha, status) => Some((slug, sha, status)),
                Call::Execute(_) => None,
            })
            .collect()
    }

    pub fn statuses(&self) -> Vec<BuildStatus> {
        self.reports().into_iter().map(|(_, _, s)| s).collect()
    }

    pub fn executions(&self) -> Vec<BuildRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(request) => Some(request),
                Call::Report(..) => None,
            })
            .collect()
    }
}

/// Status reporter that records every call, optionally failing some.
#[derive(Debug, Clone)]
pub struct RecordingReporter {
    journal: Journal,
    fail_on: Vec<BuildStatus>,
}

impl RecordingReporter {
    pub fn new(journal: Journal) -> Self {
        RecordingReporter {
            journal,
            fail_on: Vec::new(),
        }
    }

    /// Makes reports of `status` return an error (after being recorded).
    pub fn failing_on(mut self, status: BuildStatus) -> Self {
        self.fail_on.push(status);
        self
    }
}

impl StatusReporter for RecordingReporter {
    async fn report(
        &self,
        slug: &RepoSlug,
        sha: &Sha,
        status: BuildStatus,
    ) -> Result<(), ReportError> {
        self.journal
            .push(Call::Report(slug.clone(), sha.clone(), status));
        if self.fail_on.contains(&status) {
            return Err(ReportError::Api(GitHubApiError::without_source(
                Some(502),
                "bad gateway",
            )));
        }
        Ok(())
    }
}

/// What a [`ScriptedExecutor`] does when asked to run a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Succeed,
    Fail,
    CannotStart,
    TimeOut,
}

/// Build executor with a fixed scripted result.
#[derive(Debug, Clone)]
pub struct ScriptedExecutor {
    journal: Journal,
    script: Script,
    delay: Option<Duration>,
}

impl ScriptedExecutor {
    pub fn new(journal: Journal, script: Script) -> Self {
        ScriptedExecutor {
            journal,
            script,
            delay: None,
        }
    }

    /// Makes every build take `delay` before producing its result.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl BuildExecutor for ScriptedExecutor {
    async fn execute(&self, request: &BuildRequest) -> Result<BuildOutcome, ExecutorError> {
        self.journal.push(Call::Execute(request.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.script {
            Script::Succeed => Ok(BuildOutcome::Success),
            Script::Fail => Ok(BuildOutcome::Failure),
            Script::CannotStart => Err(ExecutorError::Spawn {
                program: "python3".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
            Script::TimeOut => Err(ExecutorError::TimedOut(Duration::from_secs(1))),
        }
    }
}

/// A journal plus a reporter and executor writing to it.
pub fn fakes(script: Script) -> (Journal, RecordingReporter, ScriptedExecutor) {
    let journal = Journal::default();
    let reporter = RecordingReporter::new(journal.clone());
    let executor = ScriptedExecutor::new(journal.clone(), script);
    (journal, reporter, executor)
}

/// Polls `journal` until it holds `count` status reports or `limit` elapses.
pub async fn wait_for_statuses(journal: &Journal, count: usize, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    while journal.statuses().len() < count && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// A `pull_request` payload opened from `head_slug` against `base` of
/// `upstream/repo`.
pub fn pull_request_payload(action: &str, base: &str, head_slug: &str) -> Value {
    json!({
        "action": action,
        "number": 42,
        "pull_request": {
            "title": "Add widget",
            "base": { "ref": base, "sha": "b4se000" },
            "head": {
                "ref": "widget",
                "sha": "he4d111",
                "repo": { "full_name": head_slug }
            }
        },
        "repository": {
            "clone_url": "https://github.com/upstream/repo.git",
            "name": "repo",
            "full_name": "upstream/repo",
            "owner": { "login": "upstream" }
        }
    })
}

/// A `push` payload for `owner/repo`.
pub fn push_payload(git_ref: &str, after: &str, deleted: bool) -> Value {
    json!({
        "ref": git_ref,
        "deleted": deleted,
        "after": after,
        "head_commit": if deleted { Value::Null } else { json!({ "message": "Update" }) },
        "repository": {
            "clone_url": "https://github.com/owner/repo.git",
            "name": "repo",
            "full_name": "owner/repo",
            "owner": { "login": "owner", "name": "owner" }
        }
    })
}

pub fn arb_branch_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,30}".prop_map(String::from)
}

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}

pub fn arb_script() -> impl Strategy<Value = Script> {
    prop_oneof![
        Just(Script::Succeed),
        Just(Script::Fail),
        Just(Script::CannotStart),
        Just(Script::TimeOut),
    ]
}
