use std::path::PathBuf;
use thiserror::Error;

/// Exit code reported when a preparatory step fails
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Exit code reported when the run is interrupted (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Environment file not found: {}", path.display())]
    EnvFileMissing { path: PathBuf },

    #[error("Failed to query package {package}: {source}")]
    BootstrapFailed {
        package: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Installing package {package} failed: {reason}")]
    InstallFailed { package: String, reason: String },

    #[error("Failed to create {}: {source}", path.display())]
    PrepareFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to clear {}: {source}", path.display())]
    ClearFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to copy {}: {source}", path.display())]
    CopyFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Marker file {} missing after staging", path.display())]
    MarkerMissing { path: PathBuf },

    #[error("Failed to start backend {}: {source}", entry.display())]
    SpawnFailed {
        entry: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Interrupted while running {command}")]
    Interrupted { command: String },
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
            _ => FAILURE_EXIT_CODE,
        }
    }
}
