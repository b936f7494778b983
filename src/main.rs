use plottwist::cli::commands::{CliArgs, Commands};
use plottwist::cli::handlers::{handle_check, handle_run, handle_stage};
use plottwist::util::{init_logging, LoggingConfig};
use plottwist::{NAME, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_flags(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let log_level = args.log_level.as_deref();
    let exit_code = match &args.command {
        None | Some(Commands::Run) => handle_run(&args.launch, log_level).await,
        Some(Commands::Stage) => handle_stage(&args.launch, log_level),
        Some(Commands::Check(check_args)) => handle_check(check_args, &args.launch, log_level).await,
    };

    std::process::exit(exit_code);
}
