//! Startup sequence
//!
//! Steps run strictly in order and each one gates the next:
//!
//! ```text
//! Init -> DependencyChecked -> ConfigValidated -> AssetsStaged -> Running
//! ```
//!
//! Any failure moves the launcher to `Failed` and nothing after it runs.

use crate::bootstrap::{self, PackageStatus};
use crate::config::LauncherConfig;
use crate::env_file;
use crate::error::LaunchError;
use crate::fs::FileSystem;
use crate::guard;
use crate::launcher;
use crate::process::ProcessRunner;
use crate::staging::{AssetStager, StageReport};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    DependencyChecked,
    ConfigValidated,
    AssetsStaged,
    Running,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "init",
            Phase::DependencyChecked => "dependency_checked",
            Phase::ConfigValidated => "config_validated",
            Phase::AssetsStaged => "assets_staged",
            Phase::Running => "running",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct Launcher {
    config: LauncherConfig,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn ProcessRunner>,
    phase: Phase,
}

impl Launcher {
    pub fn new(
        config: LauncherConfig,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            fs,
            runner,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs every step and returns the backend's exit code
    pub async fn run(&mut self) -> Result<i32, LaunchError> {
        self.bootstrap().await?;
        self.check_env_file()?;
        self.stage_assets()?;
        self.launch().await
    }

    /// Environment check and staging only, without bootstrap or launch
    pub fn prepare(&mut self) -> Result<StageReport, LaunchError> {
        self.advance(Phase::DependencyChecked);
        self.check_env_file()?;
        self.stage_assets()
    }

    pub async fn bootstrap(&mut self) -> Result<Vec<PackageStatus>, LaunchError> {
        if self.config.skip_bootstrap {
            debug!("Dependency bootstrap skipped");
            self.advance(Phase::DependencyChecked);
            return Ok(Vec::new());
        }

        let result = bootstrap::ensure_packages(self.runner.as_ref(), &self.config).await;
        let statuses = self.record(result)?;
        self.advance(Phase::DependencyChecked);
        Ok(statuses)
    }

    pub fn check_env_file(&mut self) -> Result<(), LaunchError> {
        let result = guard::ensure_env_file(self.fs.as_ref(), &self.config.env_file);
        if result.is_err() {
            eprint!(
                "{}",
                guard::guidance_message(&self.config.env_file, &self.config.expected_keys)
            );
        }
        self.record(result)?;

        for status in self.key_status() {
            if !status.configured {
                warn!(key = %status.key, "Key is not set; related features will be unavailable");
            }
        }

        self.advance(Phase::ConfigValidated);
        Ok(())
    }

    pub fn stage_assets(&mut self) -> Result<StageReport, LaunchError> {
        println!(
            "Copying frontend files from {} to {}...",
            self.config.frontend_dir.display(),
            self.config.static_dir.display()
        );

        let result = AssetStager::new(self.fs.as_ref()).stage(
            &self.config.frontend_dir,
            &self.config.static_dir,
            &self.config.marker,
        );
        match &result {
            Ok(_) => println!("✓ Frontend files copied successfully"),
            Err(e) => eprintln!("✗ Error: frontend files not copied correctly ({})", e),
        }

        let report = self.record(result)?;
        self.advance(Phase::AssetsStaged);
        Ok(report)
    }

    pub async fn launch(&mut self) -> Result<i32, LaunchError> {
        println!("Starting PlotTwist on {}", self.config.server_url());
        for status in self.key_status() {
            println!(
                "- {} configured: {}",
                status.key,
                if status.configured { "Yes" } else { "No" }
            );
        }

        self.advance(Phase::Running);
        let result = launcher::launch_backend(self.fs.as_ref(), self.runner.as_ref(), &self.config).await;
        self.record(result)
    }

    fn key_status(&self) -> Vec<env_file::KeyStatus> {
        env_file::key_status(
            self.fs.as_ref(),
            &self.config.env_file,
            &self.config.expected_keys,
        )
    }

    fn advance(&mut self, next: Phase) {
        debug!(from = %self.phase, to = %next, "Phase transition");
        self.phase = next;
    }

    fn record<T>(&mut self, result: Result<T, LaunchError>) -> Result<T, LaunchError> {
        if let Err(e) = &result {
            debug!(phase = %self.phase, error = %e, "Startup failed");
            self.phase = Phase::Failed;
        }
        result
    }
}
