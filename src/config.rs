//! Configuration management for the launcher
//!
//! Settings are loaded from environment variables with defaults that match the
//! project's standard layout. Command-line arguments override them in
//! `main.rs` before `validate()` runs.
//!
//! # Environment Variables
//!
//! - `PLOTTWIST_PYTHON`: Interpreter used for pip and the backend - default: "python3"
//! - `PLOTTWIST_PACKAGES`: Comma-separated packages to ensure - default: "python-dotenv"
//! - `PLOTTWIST_SKIP_BOOTSTRAP`: Skip the package check (true|false) - default: "false"
//! - `PLOTTWIST_INSTALL_TIMEOUT`: Seconds allowed per pip call, 0 disables - default: "300"
//! - `PLOTTWIST_ENV_FILE`: Environment file that must exist - default: ".env"
//! - `PLOTTWIST_FRONTEND_DIR`: Asset source directory - default: "frontend"
//! - `PLOTTWIST_STATIC_DIR`: Serving directory, replaced on every run - default: "static"
//! - `PLOTTWIST_MARKER`: File that must exist after staging - default: "index.html"
//! - `PLOTTWIST_BACKEND_ENTRY`: Backend entry script - default: "backend/main.py"
//! - `PLOTTWIST_PORT`: Port passed to the backend - default: "8080"
//! - `PLOTTWIST_LOG_LEVEL`: Logging level - default: "info"

use std::env;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PYTHON: &str = "python3";
const DEFAULT_PACKAGES: &str = "python-dotenv";
const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 300;
const DEFAULT_ENV_FILE: &str = ".env";
const DEFAULT_FRONTEND_DIR: &str = "frontend";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MARKER: &str = "index.html";
const DEFAULT_BACKEND_ENTRY: &str = "backend/main.py";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Keys the backend reads from the environment file
pub const EXPECTED_ENV_KEYS: [&str; 2] = ["GOOGLE_API_KEY", "OPENAI_API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub python: String,
    pub packages: Vec<String>,
    pub skip_bootstrap: bool,
    pub install_timeout_secs: u64,
    pub env_file: PathBuf,
    pub frontend_dir: PathBuf,
    pub static_dir: PathBuf,
    pub marker: String,
    pub backend_entry: PathBuf,
    pub port: u16,
    pub expected_keys: Vec<String>,
    pub log_level: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        let python = env::var("PLOTTWIST_PYTHON").unwrap_or_else(|_| DEFAULT_PYTHON.to_string());

        let packages = parse_package_list(
            &env::var("PLOTTWIST_PACKAGES").unwrap_or_else(|_| DEFAULT_PACKAGES.to_string()),
        );

        let skip_bootstrap = env::var("PLOTTWIST_SKIP_BOOTSTRAP")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let install_timeout_secs = env::var("PLOTTWIST_INSTALL_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_INSTALL_TIMEOUT_SECS);

        let path_var = |name: &str, default: &str| {
            env::var(name)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(default))
        };

        let port = env::var("PLOTTWIST_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let log_level = env::var("PLOTTWIST_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            python,
            packages,
            skip_bootstrap,
            install_timeout_secs,
            env_file: path_var("PLOTTWIST_ENV_FILE", DEFAULT_ENV_FILE),
            frontend_dir: path_var("PLOTTWIST_FRONTEND_DIR", DEFAULT_FRONTEND_DIR),
            static_dir: path_var("PLOTTWIST_STATIC_DIR", DEFAULT_STATIC_DIR),
            marker: env::var("PLOTTWIST_MARKER").unwrap_or_else(|_| DEFAULT_MARKER.to_string()),
            backend_entry: path_var("PLOTTWIST_BACKEND_ENTRY", DEFAULT_BACKEND_ENTRY),
            port,
            expected_keys: EXPECTED_ENV_KEYS.iter().map(|k| k.to_string()).collect(),
            log_level,
        }
    }
}

impl LauncherConfig {
    /// Validates the configuration
    ///
    /// The staging directory is wiped on every run, so it may not overlap the
    /// asset source in either direction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ValidationFailed(
                "Port must be between 1 and 65535".to_string(),
            ));
        }

        if self.python.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Python interpreter must not be empty".to_string(),
            ));
        }

        if self.packages.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "Package names must not be empty".to_string(),
            ));
        }

        let marker = Path::new(&self.marker);
        if self.marker.is_empty()
            || marker.is_absolute()
            || marker.components().any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "Marker must be a relative path inside the static directory: {:?}",
                self.marker
            )));
        }

        if self.static_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Static directory must not be empty".to_string(),
            ));
        }

        let dest = lexical_normalize(&self.static_dir);
        if dest.as_os_str().is_empty() || dest == Path::new("/") {
            return Err(ConfigError::ValidationFailed(format!(
                "Refusing to use {} as the static directory",
                self.static_dir.display()
            )));
        }

        let source = resolve_path(&self.frontend_dir)?;
        let dest = resolve_path(&self.static_dir)?;
        if source.starts_with(&dest) || dest.starts_with(&source) {
            return Err(ConfigError::ValidationFailed(format!(
                "Static directory {} overlaps frontend directory {}",
                self.static_dir.display(),
                self.frontend_dir.display()
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn install_timeout(&self) -> Option<Duration> {
        (self.install_timeout_secs > 0).then(|| Duration::from_secs(self.install_timeout_secs))
    }

    pub fn server_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

pub fn parse_package_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::ParseError {
            field: "port".to_string(),
            error: e.to_string(),
        })
}

/// Absolute, normalized form of `path` for overlap comparisons
///
/// The deepest existing ancestor is canonicalized so symlinked aliases of the
/// same directory compare equal; the missing remainder is appended as is.
fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = env::current_dir().map_err(|e| {
            ConfigError::ValidationFailed(format!("Cannot resolve {}: {}", path.display(), e))
        })?;
        cwd.join(path)
    };
    let normalized = lexical_normalize(&absolute);

    let mut existing = normalized.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(mut resolved) = existing.canonicalize() {
            resolved.extend(missing.iter().rev());
            return Ok(resolved);
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name);
                existing = parent;
            }
            _ => return Ok(normalized),
        }
    }
}

/// Collapses `.` and `..` without touching the filesystem
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
