//! Newtype wrappers for identifiers carried by webhook events.
//!
//! These keep commit hashes, repository slugs and PR numbers from being mixed
//! up where they travel side by side (a fork PR carries two slugs and two
//! hashes, and only one pair of them is ever used for status reporting).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pull request number within a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrNumber(pub u64);

impl fmt::Display for PrNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for PrNumber {
    fn from(n: u64) -> Self {
        PrNumber(n)
    }
}

/// A git commit hash.
///
/// The format is not validated: the hash is forwarded verbatim to the build
/// script and to the status API, both of which reject bad values themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(pub String);

impl Sha {
    pub fn new(s: impl Into<String>) -> Self {
        Sha(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a short (7-character) version of the hash for display.
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for Sha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Sha(s)
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Sha(s.to_string())
    }
}

/// A repository's full slug in `owner/repo` form.
///
/// This is the address statuses are posted to. For pull requests from forks
/// it names the fork, not the repository the PR targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoSlug(pub String);

impl RepoSlug {
    pub fn new(s: impl Into<String>) -> Self {
        RepoSlug(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the slug into `(owner, repo)`.
    ///
    /// Returns `None` unless there is exactly one `/` with text on both sides.
    pub fn split(&self) -> Option<(&str, &str)> {
        let (owner, repo) = self.0.split_once('/')?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some((owner, repo))
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RepoSlug {
    fn from(s: &str) -> Self {
        RepoSlug(s.to_string())
    }
}

impl From<String> for RepoSlug {
    fn from(s: String) -> Self {
        RepoSlug(s)
    }
}

/// A GitHub webhook delivery ID (`X-GitHub-Delivery`), used only for logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryId(pub String);

impl DeliveryId {
    pub fn new(s: impl Into<String>) -> Self {
        DeliveryId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod pr_number {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn display_format(n: u64) {
                prop_assert_eq!(format!("{}", PrNumber(n)), format!("#{}", n));
            }
        }
    }

    mod sha {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn short_returns_7_chars(s in "[0-9a-f]{40}") {
                let sha = Sha::new(&s);
                prop_assert_eq!(sha.short(), &s[..7]);
            }
        }

        #[test]
        fn short_handles_short_input() {
            assert_eq!(Sha::new("abc").short(), "abc");
        }

        #[test]
        fn deserializes_from_plain_string() {
            let sha: Sha = serde_json::from_str("\"abc123\"").unwrap();
            assert_eq!(sha, Sha::new("abc123"));
        }
    }

    mod repo_slug {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_recovers_owner_and_repo(
                owner in "[a-zA-Z][a-zA-Z0-9-]{0,38}",
                repo in "[a-zA-Z][a-zA-Z0-9_.-]{0,99}"
            ) {
                let slug = RepoSlug::new(format!("{}/{}", owner, repo));
                prop_assert_eq!(slug.split(), Some((owner.as_str(), repo.as_str())));
            }
        }

        #[test]
        fn split_rejects_malformed_slugs() {
            assert_eq!(RepoSlug::new("no-slash").split(), None);
            assert_eq!(RepoSlug::new("/repo").split(), None);
            assert_eq!(RepoSlug::new("owner/").split(), None);
            assert_eq!(RepoSlug::new("a/b/c").split(), None);
        }
    }
}
