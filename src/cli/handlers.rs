use crate::cli::commands::{CheckArgs, LaunchArgs};
use crate::cli::output::OutputFormatter;
use crate::config::LauncherConfig;
use crate::error::FAILURE_EXIT_CODE;
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::Launcher;
use crate::preflight;
use crate::process::{ProcessRunner, TokioProcessRunner};
use std::sync::Arc;
use tracing::{debug, error};

fn load_config(args: &LaunchArgs, log_level: Option<&str>) -> Option<LauncherConfig> {
    let mut config = args.apply(LauncherConfig::default());
    if let Some(level) = log_level {
        config.log_level = level.to_lowercase();
    }
    debug!(?config, "Resolved configuration");

    match config.validate() {
        Ok(()) => Some(config),
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            None
        }
    }
}

fn real_launcher(config: LauncherConfig) -> Launcher {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem::new());
    let runner: Arc<dyn ProcessRunner> = Arc::new(TokioProcessRunner::new());
    Launcher::new(config, fs, runner)
}

pub async fn handle_run(args: &LaunchArgs, log_level: Option<&str>) -> i32 {
    let Some(config) = load_config(args, log_level) else {
        return FAILURE_EXIT_CODE;
    };

    let mut launcher = real_launcher(config);
    match launcher.run().await {
        Ok(code) => code,
        Err(e) => {
            error!(phase = %launcher.phase(), "{}", e);
            e.exit_code()
        }
    }
}

pub fn handle_stage(args: &LaunchArgs, log_level: Option<&str>) -> i32 {
    let Some(config) = load_config(args, log_level) else {
        return FAILURE_EXIT_CODE;
    };

    let mut launcher = real_launcher(config);
    match launcher.prepare() {
        Ok(_) => 0,
        Err(e) => {
            error!(phase = %launcher.phase(), "{}", e);
            e.exit_code()
        }
    }
}

pub async fn handle_check(check: &CheckArgs, args: &LaunchArgs, log_level: Option<&str>) -> i32 {
    let Some(config) = load_config(args, log_level) else {
        return FAILURE_EXIT_CODE;
    };

    let fs = RealFileSystem::new();
    let runner = TokioProcessRunner::new();
    let report = preflight::check(&fs, &runner, &config).await;

    match OutputFormatter::new(check.format.into()).format_preflight(&report) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Failed to format report: {:#}", e);
            return FAILURE_EXIT_CODE;
        }
    }

    if report.ready {
        0
    } else {
        FAILURE_EXIT_CODE
    }
}
