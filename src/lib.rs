//! plottwist - launcher for the PlotTwist web application
//!
//! Starting the application takes four gated steps:
//!
//! - **Bootstrap**: make sure the backend's Python packages are installed
//! - **Guard**: refuse to start without a `.env` file
//! - **Staging**: replace the static directory with a fresh copy of the frontend
//!   assets and verify the marker file arrived
//! - **Launch**: run the backend with the configured port and hand back its
//!   exit code
//!
//! [`pipeline::Launcher`] drives the steps over the [`fs::FileSystem`] and
//! [`process::ProcessRunner`] seams so the sequence can be tested without
//! touching disk or spawning processes.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod env_file;
pub mod error;
pub mod fs;
pub mod guard;
pub mod launcher;
pub mod pipeline;
pub mod preflight;
pub mod process;
pub mod staging;
pub mod util;

pub use config::{ConfigError, LauncherConfig};
pub use error::LaunchError;
pub use pipeline::{Launcher, Phase};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
