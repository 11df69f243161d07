//! Commit status reporter backed by the GitHub REST API.

use octocrab::Octocrab;
use serde::Serialize;

use crate::status::{BuildStatus, ReportError, StatusReporter};
use crate::types::{RepoSlug, Sha};

use super::error::GitHubApiError;

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Serialize)]
struct CreateStatusRequest<'a> {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    description: &'static str,
}

/// Reports build statuses as GitHub commit statuses.
#[derive(Clone)]
pub struct GitHubStatusReporter {
    /// The underlying octocrab client.
    client: Octocrab,

    /// Status `context`; GitHub uses `default` when absent.
    context: Option<String>,
}

impl GitHubStatusReporter {
    /// Creates a reporter from a pre-configured Octocrab instance.
    pub fn new(client: Octocrab) -> Self {
        Self {
            client,
            context: None,
        }
    }

    /// Creates a reporter authenticated with a personal access token.
    ///
    /// `base_uri` overrides `https://api.github.com`, for GitHub Enterprise.
    pub fn from_token(
        token: impl Into<String>,
        base_uri: Option<&str>,
    ) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri)?;
        }
        Ok(Self::new(builder.build()?))
    }

    /// Sets the status `context` shown next to the check on GitHub.
    pub fn with_status_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

/// API path for a commit's statuses.
fn status_path(slug: &RepoSlug, sha: &Sha) -> Result<String, ReportError> {
    let (owner, repo) = slug
        .split()
        .ok_or_else(|| ReportError::InvalidSlug(slug.clone()))?;
    Ok(format!("/repos/{}/{}/statuses/{}", owner, repo, sha))
}

impl StatusReporter for GitHubStatusReporter {
    async fn report(
        &self,
        slug: &RepoSlug,
        sha: &Sha,
        status: BuildStatus,
    ) -> Result<(), ReportError> {
        let url = status_path(slug, sha)?;
        let body = CreateStatusRequest {
            state: status.as_api_str(),
            context: self.context.as_deref(),
            description: status.description(),
        };

        tracing::debug!(slug = %slug, sha = %sha, state = body.state, "posting commit status");

        let _: serde_json::Value = self
            .client
            .post(&url, Some(&body))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(())
    }
}

impl std::fmt::Debug for GitHubStatusReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubStatusReporter")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_path_format() {
        let path = status_path(&RepoSlug::new("octo/repo"), &Sha::new("abc123")).unwrap();
        assert_eq!(path, "/repos/octo/repo/statuses/abc123");
    }

    #[test]
    fn status_path_rejects_bad_slug() {
        let result = status_path(&RepoSlug::new("not-a-slug"), &Sha::new("abc123"));
        assert!(matches!(result, Err(ReportError::InvalidSlug(_))));
    }

    #[test]
    fn request_body_shape() {
        let body = CreateStatusRequest {
            state: BuildStatus::Pending.as_api_str(),
            context: Some("ci/dispatch"),
            description: BuildStatus::Pending.description(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "state": "pending",
                "context": "ci/dispatch",
                "description": "Build started"
            })
        );
    }

    #[test]
    fn request_body_omits_missing_context() {
        let body = CreateStatusRequest {
            state: "success",
            context: None,
            description: "Build succeeded",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("context").is_none());
    }

    #[tokio::test]
    async fn invalid_slug_fails_before_any_request() {
        let reporter = GitHubStatusReporter::from_token("token", Some("http://127.0.0.1:9"))
            .unwrap()
            .with_status_context(Some("ci".to_string()));

        let result = reporter
            .report(&RepoSlug::new("bad"), &Sha::new("abc"), BuildStatus::Pending)
            .await;

        assert!(matches!(result, Err(ReportError::InvalidSlug(_))));
    }
}
