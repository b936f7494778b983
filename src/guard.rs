//! Environment file precondition

use crate::error::LaunchError;
use crate::fs::FileSystem;
use std::path::Path;
use tracing::debug;

/// Instructions printed when the environment file is missing
pub fn guidance_message(env_file: &Path, keys: &[String]) -> String {
    let mut message = format!(
        "Error: {} file not found!\n\
         Please create a {} file in the project root with the following variables:\n",
        env_file.display(),
        env_file.display()
    );
    for key in keys {
        message.push_str(&format!("{}=your_{}\n", key, key.to_lowercase()));
    }
    message
}

/// Fails unless `env_file` exists; its contents are not inspected
pub fn ensure_env_file<F: FileSystem + ?Sized>(fs: &F, env_file: &Path) -> Result<(), LaunchError> {
    if fs.exists(env_file) {
        debug!(path = %env_file.display(), "Environment file present");
        Ok(())
    } else {
        Err(LaunchError::EnvFileMissing {
            path: env_file.to_path_buf(),
        })
    }
}
