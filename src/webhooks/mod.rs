//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Typed representations of build-triggering events
//! - Payload parsing and classification

pub mod events;
pub mod parser;

pub use events::{
    BranchTip, PrAction, PullRequestEvent, PushEvent, WebhookEvent, branch_from_ref,
};
pub use parser::{ParseError, parse_webhook};
