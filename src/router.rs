//! Event classification and dispatch.
//!
//! The router is the single entry point from the transport into the core: it
//! takes the `X-GitHub-Event` value and the raw JSON payload, drops events
//! that never trigger builds, and hands the rest to the matching handler.

use std::sync::Arc;

use crate::build::BuildExecutor;
use crate::handlers::{HandleOutcome, handle_pull_request, handle_push};
use crate::policy::PolicyConfig;
use crate::status::{BuildStatus, StatusReporter};
use crate::webhooks::{ParseError, WebhookEvent, parse_webhook};

/// What happened to a routed event. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Unknown event type, non-building action, or deleted branch.
    Ignored,

    /// Branch policy does not allow the build.
    Gated,

    /// A build ran and this terminal status was reported.
    Built(BuildStatus),
}

impl RouteOutcome {
    /// Short text used as the HTTP response body.
    pub fn describe(&self) -> &'static str {
        match self {
            RouteOutcome::Ignored => "ignored",
            RouteOutcome::Gated => "skipped by branch policy",
            RouteOutcome::Built(BuildStatus::Success) => "build succeeded",
            RouteOutcome::Built(_) => "build failed",
        }
    }
}

impl From<HandleOutcome> for RouteOutcome {
    fn from(outcome: HandleOutcome) -> Self {
        match outcome {
            HandleOutcome::Gated => RouteOutcome::Gated,
            HandleOutcome::Built(status) => RouteOutcome::Built(status),
        }
    }
}

/// Routes webhook events to handlers.
pub struct EventRouter<R, E> {
    policy: Arc<PolicyConfig>,
    reporter: R,
    executor: E,
}

impl<R, E> EventRouter<R, E>
where
    R: StatusReporter + Sync,
    E: BuildExecutor + Sync,
{
    pub fn new(policy: Arc<PolicyConfig>, reporter: R, executor: E) -> Self {
        EventRouter {
            policy,
            reporter,
            executor,
        }
    }

    /// Classifies and handles one delivery.
    ///
    /// Returns `Err` only when the event would trigger a build but its
    /// payload is malformed.
    pub async fn route(
        &self,
        event_type: &str,
        payload: &[u8],
    ) -> Result<RouteOutcome, ParseError> {
        let Some(event) = parse_webhook(event_type, payload)? else {
            tracing::debug!(event_type, "event ignored");
            return Ok(RouteOutcome::Ignored);
        };

        Ok(self.dispatch(&event).await.into())
    }

    /// Runs the handler for an already-parsed event.
    pub async fn dispatch(&self, event: &WebhookEvent) -> HandleOutcome {
        match event {
            WebhookEvent::PullRequest(e) => {
                handle_pull_request(e, &self.policy, &self.reporter, &self.executor).await
            }
            WebhookEvent::Push(e) => {
                handle_push(e, &self.policy, &self.reporter, &self.executor).await
            }
        }
    }
}

impl<R, E> std::fmt::Debug for EventRouter<R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("branches", &self.policy.len())
            .finish_non_exhaustive()
    }
}
