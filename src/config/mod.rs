//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GITHUB_TOKEN` | required |
//! | `GITHUB_API_URL` | `https://api.github.com` |
//! | `POLICY_PATH` | `./config.json` |
//! | `CI_WORK_PATH` | `.` |
//! | `PORT` | `4567` |
//! | `BUILD_PROGRAM` | `python3` |
//! | `PR_BUILD_SCRIPT` | `./checkout_pr.py` |
//! | `PUSH_BUILD_SCRIPT` | `./checkout_branch.py` |
//! | `BUILD_TIMEOUT_SECS` | `3600`, `0` for no limit |
//! | `STATUS_CONTEXT` | unset |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::build::ScriptExecutor;
use crate::build::script::{DEFAULT_PR_SCRIPT, DEFAULT_PROGRAM, DEFAULT_PUSH_SCRIPT};

pub const DEFAULT_PORT: u16 = 4567;
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 3600;

/// Errors reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub github_token: String,
    /// Alternate API base URI for GitHub Enterprise.
    pub github_api_url: Option<String>,
    pub policy_path: PathBuf,
    /// Directory handed to build scripts as `-CI_WORK_PATH`.
    pub work_path: PathBuf,
    pub port: u16,
    pub build_program: PathBuf,
    pub pr_build_script: PathBuf,
    pub push_build_script: PathBuf,
    /// `None` lets builds run forever.
    pub build_timeout: Option<Duration>,
    pub status_context: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Empty or whitespace-only
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let github_token = get("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;

        let port = match get("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("BUILD_TIMEOUT_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "BUILD_TIMEOUT_SECS",
                expected: "a whole number of seconds",
                value,
            })?,
            None => DEFAULT_BUILD_TIMEOUT_SECS,
        };
        let build_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let path_or = |key: &str, default: &str| {
            PathBuf::from(get(key).unwrap_or_else(|| default.to_string()))
        };

        Ok(ServerConfig {
            github_token,
            github_api_url: get("GITHUB_API_URL"),
            policy_path: path_or("POLICY_PATH", "./config.json"),
            work_path: path_or("CI_WORK_PATH", "."),
            port,
            build_program: path_or("BUILD_PROGRAM", DEFAULT_PROGRAM),
            pr_build_script: path_or("PR_BUILD_SCRIPT", DEFAULT_PR_SCRIPT),
            push_build_script: path_or("PUSH_BUILD_SCRIPT", DEFAULT_PUSH_SCRIPT),
            build_timeout,
            status_context: get("STATUS_CONTEXT"),
        })
    }

    /// The build executor this configuration describes.
    pub fn script_executor(&self) -> ScriptExecutor {
        ScriptExecutor::new(&self.work_path)
            .with_program(&self.build_program)
            .with_pr_script(&self.pr_build_script)
            .with_push_script(&self.push_build_script)
            .with_timeout(self.build_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[("GITHUB_TOKEN", "t0ken")]).unwrap();
        assert_eq!(config.github_token, "t0ken");
        assert_eq!(config.github_api_url, None);
        assert_eq!(config.policy_path, PathBuf::from("./config.json"));
        assert_eq!(config.work_path, PathBuf::from("."));
        assert_eq!(config.port, 4567);
        assert_eq!(config.build_program, PathBuf::from("python3"));
        assert_eq!(config.pr_build_script, PathBuf::from("./checkout_pr.py"));
        assert_eq!(config.push_build_script, PathBuf::from("./checkout_branch.py"));
        assert_eq!(config.build_timeout, Some(Duration::from_secs(3600)));
        assert_eq!(config.status_context, None);
    }

    #[test]
    fn token_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::Missing("GITHUB_TOKEN"))));
        assert!(matches!(
            config(&[("GITHUB_TOKEN", "  ")]),
            Err(ConfigError::Missing("GITHUB_TOKEN"))
        ));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("GITHUB_TOKEN", "t"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3"),
            ("POLICY_PATH", "/etc/ci/policy.json"),
            ("CI_WORK_PATH", "/srv/ci"),
            ("PORT", "8080"),
            ("BUILD_PROGRAM", "bash"),
            ("PR_BUILD_SCRIPT", "pr.sh"),
            ("PUSH_BUILD_SCRIPT", "push.sh"),
            ("BUILD_TIMEOUT_SECS", "60"),
            ("STATUS_CONTEXT", "ci/dispatch"),
        ])
        .unwrap();

        assert_eq!(
            config.github_api_url.as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
        assert_eq!(config.policy_path, PathBuf::from("/etc/ci/policy.json"));
        assert_eq!(config.work_path, PathBuf::from("/srv/ci"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.build_program, PathBuf::from("bash"));
        assert_eq!(config.build_timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.status_context.as_deref(), Some("ci/dispatch"));

        let executor = config.script_executor();
        assert_eq!(executor.work_path(), &PathBuf::from("/srv/ci"));
        assert_eq!(executor.timeout(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn zero_timeout_disables_limit() {
        let config = config(&[("GITHUB_TOKEN", "t"), ("BUILD_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(config.build_timeout, None);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(matches!(
            config(&[("GITHUB_TOKEN", "t"), ("PORT", "http")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("GITHUB_TOKEN", "t"), ("PORT", "70000")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("GITHUB_TOKEN", "t"), ("BUILD_TIMEOUT_SECS", "-1")]),
            Err(ConfigError::Invalid {
                name: "BUILD_TIMEOUT_SECS",
                ..
            })
        ));
    }
}
