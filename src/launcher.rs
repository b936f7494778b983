use crate::config::LauncherConfig;
use crate::error::{LaunchError, FAILURE_EXIT_CODE};
use crate::fs::FileSystem;
use crate::process::{Invocation, Outcome, ProcessRunner};
use tracing::{info, warn};

pub fn backend_invocation(config: &LauncherConfig) -> Invocation {
    Invocation::new(&config.python)
        .arg(config.backend_entry.to_string_lossy())
        .args(["--port".to_string(), config.port.to_string()])
}

/// Runs the backend until it exits and returns its exit code
pub async fn launch_backend(
    fs: &dyn FileSystem,
    runner: &dyn ProcessRunner,
    config: &LauncherConfig,
) -> Result<i32, LaunchError> {
    if !fs.is_file(&config.backend_entry) {
        return Err(LaunchError::SpawnFailed {
            entry: config.backend_entry.clone(),
            source: anyhow::anyhow!("entry point not found"),
        });
    }

    let invocation = backend_invocation(config);
    info!(command = %invocation, port = config.port, "Launching backend");

    let outcome = runner
        .run(&invocation)
        .await
        .map_err(|source| LaunchError::SpawnFailed {
            entry: config.backend_entry.clone(),
            source,
        })?;

    match outcome {
        Outcome::Exited(code) => {
            if code == 0 {
                info!("Backend exited");
            } else {
                warn!(code, "Backend exited with failure");
            }
            Ok(code)
        }
        Outcome::Interrupted => Err(LaunchError::Interrupted {
            command: invocation.to_string(),
        }),
        // backend_invocation sets no deadline; a runner that stops the backend
        // anyway gets the generic failure code
        Outcome::TimedOut => {
            warn!(command = %invocation, "Backend was stopped before it exited");
            Ok(FAILURE_EXIT_CODE)
        }
    }
}
