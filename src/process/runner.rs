use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Discard stdout and stderr (used for presence queries)
    pub quiet: bool,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            quiet: false,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a child process finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    TimedOut,
    Interrupted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Exited(code) => write!(f, "exit status {}", code),
            Outcome::TimedOut => write!(f, "timed out"),
            Outcome::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Runs child processes to completion
///
/// `Err` means the process could not be started at all; anything the child
/// does after that is reported through [`Outcome`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome>;
}

/// Runs commands with `tokio::process`, forwarding Ctrl-C as a kill
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<Outcome> {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).kill_on_drop(true);
        if invocation.quiet {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        debug!(command = %invocation, "Spawning process");
        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn `{}`", invocation))?;

        let deadline = async {
            match invocation.timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        // the child is only borrowed by `wait()` inside the select
        let waited = tokio::select! {
            status = child.wait() => Ok(status),
            _ = deadline => Err(Outcome::TimedOut),
            _ = tokio::signal::ctrl_c() => Err(Outcome::Interrupted),
        };

        match waited {
            Ok(status) => {
                let status =
                    status.with_context(|| format!("Failed to wait for `{}`", invocation))?;
                Ok(Outcome::Exited(exit_code(status)))
            }
            Err(outcome) => {
                warn!(command = %invocation, reason = %outcome, "Stopping child process");
                child.kill().await.ok();
                Ok(outcome)
            }
        }
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display() {
        let inv = Invocation::new("python3")
            .args(["-m", "pip", "show"])
            .arg("python-dotenv");
        assert_eq!(inv.to_string(), "python3 -m pip show python-dotenv");
        assert!(!inv.quiet);
        assert!(inv.quiet().quiet);
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Exited(3).to_string(), "exit status 3");
        assert_eq!(Outcome::TimedOut.to_string(), "timed out");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_reports_exit_code() {
        let runner = TokioProcessRunner::new();
        let outcome = runner
            .run(&Invocation::new("sh").args(["-c", "exit 7"]).quiet())
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Exited(7));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_times_out() {
        let runner = TokioProcessRunner::new();
        let outcome = runner
            .run(
                &Invocation::new("sh")
                    .args(["-c", "sleep 5"])
                    .timeout(Some(Duration::from_millis(100))),
            )
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
    }

    #[tokio::test]
    async fn test_tokio_runner_missing_program() {
        let runner = TokioProcessRunner::new();
        let result = runner
            .run(&Invocation::new("plottwist-definitely-not-a-program"))
            .await;
        assert!(result.is_err());
    }
}
