use crate::config::{parse_package_list, parse_port, LauncherConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Prepares and launches the PlotTwist web application
#[derive(Parser, Debug)]
#[command(
    name = "plottwist",
    about = "Prepares and launches the PlotTwist web application",
    version,
    long_about = "plottwist makes sure the backend's Python dependencies are installed, \
                  checks that the .env file exists, replaces the static directory with a \
                  fresh copy of the frontend assets and starts the backend server.\n\n\
                  Running without a subcommand is the same as `plottwist run`."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub launch: LaunchArgs,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    #[command(
        about = "Install dependencies, stage assets and start the backend",
        long_about = "Runs every startup step in order and exits with the backend's exit code.\n\n\
                      Examples:\n  \
                      plottwist run\n  \
                      plottwist run --port 9000\n  \
                      plottwist run --skip-bootstrap"
    )]
    Run,

    #[command(about = "Check the .env file and stage frontend assets without starting the backend")]
    Stage,

    #[command(
        about = "Report whether everything needed to start is in place",
        long_about = "Inspects the interpreter, packages, .env file, frontend assets and backend \
                      entry point without changing anything.\n\n\
                      Examples:\n  \
                      plottwist check\n  \
                      plottwist check --format json"
    )]
    Check(CheckArgs),
}

/// Settings shared by every subcommand; unset flags fall back to the
/// `PLOTTWIST_*` environment variables
#[derive(Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    #[arg(long, global = true, value_name = "PORT", value_parser = parse_port_arg, help = "Port passed to the backend")]
    pub port: Option<u16>,

    #[arg(long, global = true, value_name = "PROGRAM", help = "Python interpreter")]
    pub python: Option<String>,

    #[arg(
        long = "package",
        global = true,
        value_name = "NAME",
        value_delimiter = ',',
        help = "Package that must be installed (repeatable)"
    )]
    pub packages: Vec<String>,

    #[arg(long, global = true, help = "Do not check or install Python packages")]
    pub skip_bootstrap: bool,

    #[arg(long, global = true, value_name = "SECONDS", help = "Time limit for each pip call (0 disables)")]
    pub install_timeout: Option<u64>,

    #[arg(long, global = true, value_name = "FILE", help = "Environment file that must exist")]
    pub env_file: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", help = "Frontend asset directory")]
    pub frontend_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "DIR", help = "Static directory served by the backend")]
    pub static_dir: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "File that must exist after staging")]
    pub marker: Option<String>,

    #[arg(long, global = true, value_name = "FILE", help = "Backend entry script")]
    pub backend_entry: Option<PathBuf>,
}

impl LaunchArgs {
    /// Applies explicit flags on top of `base`
    pub fn apply(&self, base: LauncherConfig) -> LauncherConfig {
        let packages = if self.packages.is_empty() {
            base.packages
        } else {
            parse_package_list(&self.packages.join(","))
        };

        LauncherConfig {
            port: self.port.unwrap_or(base.port),
            python: self.python.clone().unwrap_or(base.python),
            packages,
            skip_bootstrap: self.skip_bootstrap || base.skip_bootstrap,
            install_timeout_secs: self.install_timeout.unwrap_or(base.install_timeout_secs),
            env_file: self.env_file.clone().unwrap_or(base.env_file),
            frontend_dir: self.frontend_dir.clone().unwrap_or(base.frontend_dir),
            static_dir: self.static_dir.clone().unwrap_or(base.static_dir),
            marker: self.marker.clone().unwrap_or(base.marker),
            backend_entry: self.backend_entry.clone().unwrap_or(base.backend_entry),
            ..base
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_port_arg(s: &str) -> Result<u16, String> {
    match parse_port(s) {
        Ok(0) => Err("port must be between 1 and 65535".to_string()),
        Ok(port) => Ok(port),
        Err(e) => Err(e.to_string()),
    }
}
