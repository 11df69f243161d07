//! Repository identity as reported by webhook payloads.

use serde::{Deserialize, Serialize};

use super::ids::RepoSlug;

/// The repository an event belongs to.
///
/// Built from the payload's `repository` object. For pull requests this is the
/// target (base) repository; the source repository of a fork PR is carried
/// separately as a [`RepoSlug`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    /// Login of the repository owner (user or organisation).
    pub owner: String,

    /// Repository name without the owner.
    pub name: String,

    /// URL usable with `git clone`.
    pub clone_url: String,

    /// Full `owner/repo` slug.
    pub slug: RepoSlug,
}

impl RepositoryIdentity {
    /// Creates an identity whose slug is derived from owner and name.
    ///
    /// Push payloads carry `full_name` explicitly; pull request payloads in the
    /// shape this server consumes only carry owner and name, so the slug is
    /// reconstructed.
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        clone_url: impl Into<String>,
    ) -> Self {
        let owner = owner.into();
        let name = name.into();
        let slug = RepoSlug::new(format!("{}/{}", owner, name));
        RepositoryIdentity {
            owner,
            name,
            clone_url: clone_url.into(),
            slug,
        }
    }

    /// Creates an identity with an explicit slug.
    pub fn with_slug(
        owner: impl Into<String>,
        name: impl Into<String>,
        clone_url: impl Into<String>,
        slug: RepoSlug,
    ) -> Self {
        RepositoryIdentity {
            owner: owner.into(),
            name: name.into(),
            clone_url: clone_url.into(),
            slug,
        }
    }
}
