//! Build executor that runs an external script per build.
//!
//! Pull request builds run `<program> <pr_script> -PR_TITLE <title> ...` and
//! push builds run `<program> <push_script> -BRANCH_NAME <branch> ...`. Every
//! value is passed as its own argument, so nothing from the payload is ever
//! interpreted by a shell. Exit status zero is success; anything else,
//! including death by signal, is failure.
//!
//! On Unix each build runs in its own process group, and a timeout kills the
//! whole group so processes the script started do not outlive it.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};

use super::{
    BuildExecutor, BuildOutcome, BuildRequest, ExecutorError, PullRequestBuildRequest,
    PushBuildRequest,
};

/// Default interpreter for build scripts.
pub const DEFAULT_PROGRAM: &str = "python3";

/// Default pull request build script.
pub const DEFAULT_PR_SCRIPT: &str = "./checkout_pr.py";

/// Default push build script.
pub const DEFAULT_PUSH_SCRIPT: &str = "./checkout_branch.py";

/// Runs builds by launching a script as a child process.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    program: PathBuf,
    pr_script: PathBuf,
    push_script: PathBuf,
    work_path: PathBuf,
    timeout: Option<Duration>,
}

impl ScriptExecutor {
    /// Creates an executor with the default program and scripts.
    pub fn new(work_path: impl Into<PathBuf>) -> Self {
        ScriptExecutor {
            program: PathBuf::from(DEFAULT_PROGRAM),
            pr_script: PathBuf::from(DEFAULT_PR_SCRIPT),
            push_script: PathBuf::from(DEFAULT_PUSH_SCRIPT),
            work_path: work_path.into(),
            timeout: None,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_pr_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.pr_script = script.into();
        self
    }

    pub fn with_push_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.push_script = script.into();
        self
    }

    /// Kills a build that runs longer than `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn work_path(&self) -> &PathBuf {
        &self.work_path
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Full argument list (script first) for a request.
    pub fn args_for(&self, request: &BuildRequest) -> Vec<OsString> {
        match request {
            BuildRequest::PullRequest(pr) => self.pull_request_args(pr),
            BuildRequest::Push(push) => self.push_args(push),
        }
    }

    fn pull_request_args(&self, pr: &PullRequestBuildRequest) -> Vec<OsString> {
        let mut args = vec![self.pr_script.clone().into_os_string()];
        push_flag(&mut args, "-PR_TITLE", &pr.title);
        push_flag(&mut args, "-FROM_BRANCH", &pr.source_branch);
        push_flag(&mut args, "-FROM_SHA", pr.source_sha.as_str());
        push_flag(&mut args, "-TO_BRANCH", &pr.target_branch);
        push_flag(&mut args, "-TO_SHA", pr.target_sha.as_str());
        push_flag(&mut args, "-CLONE_URL", &pr.repository.clone_url);
        push_flag(&mut args, "-OWNER_NAME", &pr.repository.owner);
        push_flag(&mut args, "-REPO_NAME", &pr.repository.name);
        push_flag(&mut args, "-PR_NUMBER", &pr.number.0.to_string());
        args.push("-CI_WORK_PATH".into());
        args.push(self.work_path.clone().into_os_string());
        args
    }

    fn push_args(&self, push: &PushBuildRequest) -> Vec<OsString> {
        let mut args = vec![self.push_script.clone().into_os_string()];
        push_flag(&mut args, "-BRANCH_NAME", &push.branch);
        push_flag(&mut args, "-COMMIT_SHA", push.sha.as_str());
        push_flag(&mut args, "-CLONE_URL", &push.repository.clone_url);
        push_flag(&mut args, "-OWNER_NAME", &push.repository.owner);
        push_flag(&mut args, "-REPO_NAME", &push.repository.name);
        args.push("-CI_WORK_PATH".into());
        args.push(self.work_path.clone().into_os_string());
        args
    }

    async fn run(&self, args: Vec<OsString>) -> Result<ExitStatus, ExecutorError> {
        let program = self.program.display().to_string();

        let mut command = Command::new(&self.program);
        command.args(&args).stdin(Stdio::null()).kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command
            .spawn()
            .map_err(|source| ExecutorError::Spawn {
                program: program.clone(),
                source,
            })?;

        tracing::debug!(program = %program, pid = ?child.id(), "build process started");

        let Some(limit) = self.timeout else {
            return child.wait().await.map_err(ExecutorError::Wait);
        };

        match tokio::time::timeout(limit, child.wait()).await {
            Ok(result) => result.map_err(ExecutorError::Wait),
            Err(_) => {
                tracing::warn!(
                    program = %program,
                    timeout_secs = limit.as_secs(),
                    "build timed out, killing process"
                );
                kill(&mut child, &program).await;
                Err(ExecutorError::TimedOut(limit))
            }
        }
    }
}

fn push_flag(args: &mut Vec<OsString>, flag: &str, value: &str) {
    args.push(flag.into());
    args.push(value.into());
}

async fn kill(child: &mut Child, program: &str) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        // The child leads its own group, so the group id is its pid.
        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            tracing::warn!(program, pid, error = %e, "failed to kill build process group");
        }
    }

    // Reaps the child; also the only kill on platforms without process groups.
    if let Err(e) = child.kill().await {
        tracing::error!(program, error = %e, "failed to kill timed-out build process");
    }
}

impl BuildExecutor for ScriptExecutor {
    async fn execute(&self, request: &BuildRequest) -> Result<BuildOutcome, ExecutorError> {
        let args = self.args_for(request);
        let status = self.run(args).await?;

        if status.success() {
            tracing::debug!(%status, "build process exited");
            Ok(BuildOutcome::Success)
        } else {
            tracing::info!(%status, "build process exited unsuccessfully");
            Ok(BuildOutcome::Failure)
        }
    }
}
