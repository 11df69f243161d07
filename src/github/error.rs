//! GitHub API error type.
//!
//! Status reports are never retried, so there is no transient/permanent
//! split here: the error only carries enough detail to be logged usefully.

use std::fmt;
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Wraps an octocrab error, recovering the HTTP status when possible.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = match &err {
            octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
            other => status_code_from_message(&other.to_string()),
        };
        Self {
            status_code,
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Creates an error without an octocrab source.
    pub fn without_source(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            source: None,
        }
    }
}

/// Extracts an HTTP status code from an error message.
///
/// Only used for octocrab errors that do not carry a structured GitHub
/// response (transport and hyper errors), where the code, if any, only
/// appears in the text.
fn status_code_from_message(message: &str) -> Option<u16> {
    if let Some(idx) = message.find("status: ") {
        let digits: String = message[idx + 8..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    let lower = message.to_lowercase();
    [
        (404, "not found"),
        (401, "unauthorized"),
        (403, "forbidden"),
        (422, "unprocessable"),
    ]
    .into_iter()
    .find(|(code, phrase)| message.contains(&code.to_string()) && lower.contains(phrase))
    .map(|(code, _)| code)
}
