//! Side-effect-free readiness report used by `plottwist check`

use crate::bootstrap;
use crate::config::LauncherConfig;
use crate::env_file::{self, KeyStatus};
use crate::fs::FileSystem;
use crate::process::ProcessRunner;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct PackageCheck {
    pub name: String,
    /// `None` when the query could not run or the bootstrap is skipped
    pub installed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathCheck {
    pub path: PathBuf,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    pub python: String,
    pub bootstrap_skipped: bool,
    pub packages: Vec<PackageCheck>,
    pub env_file: PathCheck,
    pub keys: Vec<KeyStatus>,
    pub frontend_dir: PathCheck,
    pub source_marker: PathCheck,
    pub backend_entry: PathCheck,
    pub port: u16,
    pub url: String,
    pub ready: bool,
}

impl PreflightReport {
    /// Everything `run` needs is in place; missing packages count as ready
    /// because the bootstrap installs them
    fn compute_ready(&self) -> bool {
        self.env_file.present
            && self.source_marker.present
            && self.backend_entry.present
            && self.packages.iter().all(|p| p.error.is_none())
    }
}

pub async fn check(
    fs: &dyn FileSystem,
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
) -> PreflightReport {
    let mut packages = Vec::with_capacity(config.packages.len());
    for name in &config.packages {
        let check = if config.skip_bootstrap {
            PackageCheck {
                name: name.clone(),
                installed: None,
                error: None,
            }
        } else {
            match bootstrap::package_installed(runner, config, name).await {
                Ok(installed) => PackageCheck {
                    name: name.clone(),
                    installed: Some(installed),
                    error: None,
                },
                Err(e) => PackageCheck {
                    name: name.clone(),
                    installed: None,
                    error: Some(e.to_string()),
                },
            }
        };
        packages.push(check);
    }

    let path_check = |path: PathBuf, present: bool| PathCheck { path, present };
    let source_marker = config.frontend_dir.join(&config.marker);

    let mut report = PreflightReport {
        python: config.python.clone(),
        bootstrap_skipped: config.skip_bootstrap,
        packages,
        env_file: path_check(config.env_file.clone(), fs.exists(&config.env_file)),
        keys: env_file::key_status(fs, &config.env_file, &config.expected_keys),
        frontend_dir: path_check(config.frontend_dir.clone(), fs.is_dir(&config.frontend_dir)),
        source_marker: path_check(source_marker.clone(), fs.is_file(&source_marker)),
        backend_entry: path_check(
            config.backend_entry.clone(),
            fs.is_file(&config.backend_entry),
        ),
        port: config.port,
        url: config.server_url(),
        ready: false,
    };
    report.ready = report.compute_ready();
    report
}
