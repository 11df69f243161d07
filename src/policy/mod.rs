//! Per-branch build policy.
//!
//! The policy decides, for a branch name and an event kind, whether a build
//! may run. It is loaded once at startup from a JSON file and never changes
//! afterwards.
//!
//! # File Format
//!
//! ```json
//! {
//!   "branches": [
//!     { "name": "master",  "prs": true,  "pushes": true },
//!     { "name": "develop", "prs": false, "pushes": true }
//!   ]
//! }
//! ```
//!
//! A missing `prs` or `pushes` key means `false`. Branch names are matched
//! by exact string equality; there is no pattern syntax.

use std::collections::HashMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading a policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// IO error reading the file.
    #[error("IO error reading policy file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid policy JSON.
    #[error("invalid policy JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The same branch name appears more than once.
    #[error("branch {0:?} is configured more than once")]
    DuplicateBranch(String),
}

/// The kind of event asking for a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildKind {
    /// A pull request targeting the branch was opened or updated.
    PullRequest,
    /// Commits were pushed to the branch.
    Push,
}

/// Build permissions for a single branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// Exact branch name (no `refs/heads/` prefix).
    pub name: String,

    /// Whether pull requests targeting this branch are built.
    #[serde(rename = "prs", default)]
    pub allow_pull_requests: bool,

    /// Whether pushes to this branch are built.
    #[serde(rename = "pushes", default)]
    pub allow_pushes: bool,
}

impl BranchPolicy {
    /// Returns whether this branch permits builds of the given kind.
    pub fn allows(&self, kind: BuildKind) -> bool {
        match kind {
            BuildKind::PullRequest => self.allow_pull_requests,
            BuildKind::Push => self.allow_pushes,
        }
    }
}

/// On-disk shape of the policy file.
#[derive(Debug, Deserialize)]
struct RawPolicyFile {
    #[serde(default)]
    branches: Vec<BranchPolicy>,
}

/// Immutable branch-name → permissions mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyConfig {
    branches: HashMap<String, BranchPolicy>,
}

impl PolicyConfig {
    /// Builds a policy from a list of branch entries.
    ///
    /// Fails if two entries share a name.
    pub fn from_branches(
        branches: impl IntoIterator<Item = BranchPolicy>,
    ) -> Result<Self, PolicyError> {
        let mut map = HashMap::new();
        for branch in branches {
            if map.contains_key(&branch.name) {
                return Err(PolicyError::DuplicateBranch(branch.name));
            }
            map.insert(branch.name.clone(), branch);
        }
        Ok(PolicyConfig { branches: map })
    }

    /// Parses a policy from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        let raw: RawPolicyFile = serde_json::from_str(json)?;
        Self::from_branches(raw.branches)
    }

    /// Loads a policy file from disk.
    pub fn load(path: &Path) -> Result<Self, PolicyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Returns the entry for a branch, if one is configured.
    pub fn get(&self, branch_name: &str) -> Option<&BranchPolicy> {
        self.branches.get(branch_name)
    }

    /// Returns whether a build of `kind` is allowed for `branch_name`.
    ///
    /// Unconfigured branches are never allowed.
    pub fn is_allowed(&self, branch_name: &str, kind: BuildKind) -> bool {
        self.get(branch_name)
            .is_some_and(|branch| branch.allows(kind))
    }

    /// Number of configured branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
