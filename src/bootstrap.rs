//! Python dependency bootstrap
//!
//! Each required package is queried with `pip show`; a failed query triggers
//! `pip install`. Install failures stop the run instead of surfacing later as
//! an import error inside the backend.

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::process::{Invocation, Outcome, ProcessRunner};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageState {
    AlreadyPresent,
    Installed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub state: PackageState,
}

pub fn show_invocation(python: &str, package: &str) -> Invocation {
    Invocation::new(python)
        .args(["-m", "pip", "show", package])
        .quiet()
}

pub fn install_invocation(python: &str, package: &str) -> Invocation {
    Invocation::new(python).args(["-m", "pip", "install", package])
}

/// Returns whether `package` is visible to the interpreter
pub async fn package_installed(
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
    package: &str,
) -> Result<bool, LaunchError> {
    let query = show_invocation(&config.python, package).timeout(config.install_timeout());
    let outcome = runner
        .run(&query)
        .await
        .map_err(|source| LaunchError::BootstrapFailed {
            package: package.to_string(),
            source,
        })?;

    match outcome {
        Outcome::Exited(0) => Ok(true),
        Outcome::Exited(code) => {
            debug!(package, code, "Package query reported missing package");
            Ok(false)
        }
        Outcome::TimedOut => Err(LaunchError::BootstrapFailed {
            package: package.to_string(),
            source: anyhow::anyhow!("`{}` timed out", query),
        }),
        Outcome::Interrupted => Err(LaunchError::Interrupted {
            command: query.to_string(),
        }),
    }
}

/// Ensures every configured package is installed, installing missing ones
pub async fn ensure_packages(
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
) -> Result<Vec<PackageStatus>, LaunchError> {
    let mut statuses = Vec::with_capacity(config.packages.len());

    for package in &config.packages {
        if package_installed(runner, config, package).await? {
            debug!(package = %package, "Package already installed");
            statuses.push(PackageStatus {
                name: package.clone(),
                state: PackageState::AlreadyPresent,
            });
            continue;
        }

        println!("Installing {}...", package);
        let install = install_invocation(&config.python, package).timeout(config.install_timeout());
        let outcome = runner
            .run(&install)
            .await
            .map_err(|e| LaunchError::InstallFailed {
                package: package.clone(),
                reason: e.to_string(),
            })?;

        match outcome {
            Outcome::Exited(0) => {
                info!(package = %package, "Installed package");
                statuses.push(PackageStatus {
                    name: package.clone(),
                    state: PackageState::Installed,
                });
            }
            Outcome::Interrupted => {
                return Err(LaunchError::Interrupted {
                    command: install.to_string(),
                })
            }
            other => {
                warn!(package = %package, outcome = %other, "Package install failed");
                return Err(LaunchError::InstallFailed {
                    package: package.clone(),
                    reason: other.to_string(),
                });
            }
        }
    }

    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::MockProcessRunner;

    fn config() -> LauncherConfig {
        LauncherConfig {
            python: "python3".to_string(),
            packages: vec!["python-dotenv".to_string()],
            ..LauncherConfig::default()
        }
    }

    #[tokio::test]
    async fn test_present_package_is_not_installed() {
        let runner = MockProcessRunner::new();

        let statuses = ensure_packages(&runner, &config()).await.unwrap();

        assert_eq!(statuses[0].state, PackageState::AlreadyPresent);
        assert_eq!(
            runner.command_lines(),
            vec!["python3 -m pip show python-dotenv"]
        );
    }

    #[tokio::test]
    async fn test_missing_package_is_installed() {
        let runner = MockProcessRunner::new();
        runner.respond(&["python3", "-m", "pip", "show"], Outcome::Exited(1));

        let statuses = ensure_packages(&runner, &config()).await.unwrap();

        assert_eq!(statuses[0].state, PackageState::Installed);
        assert_eq!(
            runner.command_lines(),
            vec![
                "python3 -m pip show python-dotenv",
                "python3 -m pip install python-dotenv"
            ]
        );
        assert!(runner.calls()[0].quiet);
        assert!(!runner.calls()[1].quiet);
    }

    #[tokio::test]
    async fn test_install_failure_is_reported() {
        let runner = MockProcessRunner::new();
        runner.respond(&["python3", "-m", "pip", "show"], Outcome::Exited(1));
        runner.respond(&["python3", "-m", "pip", "install"], Outcome::Exited(2));

        let err = ensure_packages(&runner, &config()).await.unwrap_err();

        assert!(matches!(err, LaunchError::InstallFailed { .. }));
        assert!(err.to_string().contains("exit status 2"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_bootstrap_failure() {
        let runner = MockProcessRunner::new();
        runner.fail_spawn(&["python3"]);

        let err = ensure_packages(&runner, &config()).await.unwrap_err();
        assert!(matches!(err, LaunchError::BootstrapFailed { .. }));
    }

    #[tokio::test]
    async fn test_interrupted_install() {
        let runner = MockProcessRunner::new();
        runner.respond(&["python3", "-m", "pip", "show"], Outcome::Exited(1));
        runner.respond(&["python3", "-m", "pip", "install"], Outcome::Interrupted);

        let err = ensure_packages(&runner, &config()).await.unwrap_err();
        assert_eq!(err.exit_code(), 130);
    }

    #[tokio::test]
    async fn test_stops_at_first_failing_package() {
        let runner = MockProcessRunner::new();
        runner.respond(
            &["python3", "-m", "pip", "show", "fastapi"],
            Outcome::Exited(1),
        );
        runner.respond(&["python3", "-m", "pip", "install"], Outcome::TimedOut);
        let config = LauncherConfig {
            packages: vec!["fastapi".to_string(), "python-dotenv".to_string()],
            ..config()
        };

        let err = ensure_packages(&runner, &config).await.unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert_eq!(runner.calls().len(), 2);
    }
}
