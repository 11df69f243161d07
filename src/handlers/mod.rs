//! Event handlers that turn build-triggering events into builds.
//!
//! Each handler gates the event on branch policy, then drives the status
//! lifecycle around the build executor:
//!
//! | Step | Effect |
//! |------|--------|
//! | gate | nothing is reported if the branch does not allow this kind of build |
//! | start | `pending` for the status target |
//! | build | executor runs to completion (or fails to) |
//! | finish | `success` or `failure` for the same target |
//!
//! Handlers take the event, the policy and both capabilities as arguments;
//! there is no per-request state outside those.

mod lifecycle;
mod pull_request;
mod push;

use crate::status::BuildStatus;

pub use lifecycle::run_build;
pub use pull_request::handle_pull_request;
pub use push::handle_push;

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// The branch policy does not allow this build. Nothing was reported.
    Gated,

    /// A build ran; the terminal status that was reported.
    Built(BuildStatus),
}
