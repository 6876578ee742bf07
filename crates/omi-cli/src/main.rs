//! omi-validate - command-line validation of openMINDS schema templates and instances
//!
//! This is the main entry point: it parses arguments, loads configuration,
//! initialises logging and dispatches to the command handlers.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{redaction, timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, false));
            process::exit(e.exit_code());
        }
    };

    // Set up colored output
    let use_color = cli.use_color(config.output.color);
    control::set_override(use_color);

    let log_guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let result = run(cli, &config, use_color);

    // process::exit skips destructors; flush the log file first
    drop(log_guard);

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    tracing::debug!(config = %redaction::redact_sensitive(&format!("{:?}", config)), "Configuration loaded");

    let format = cli.output_format(&config.output.format);
    let mut output = OutputWriter::new(format, use_color, cli.quiet, config.output.progress);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Schema(args) => handlers::handle_schema(args, config, &mut output),
        Commands::Instance(args) => handlers::handle_instance(args, config, &mut output),
    }
}

/// Initialize the logging system
///
/// Precedence: `-v` count, then the config file, then `RUST_LOG` and `OMI_LOG_*`.
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());

    if cli.verbosity_level() == 0 {
        if let Some(level) = &config.logging.level {
            logging_config.level = level.clone();
        }
    }
    if let Some(format) = &config.logging.format {
        logging_config.apply_format(format);
    }
    if let Some(file) = &config.logging.file {
        logging_config.file = Some(file.clone());
    }

    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
