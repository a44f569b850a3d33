#![allow(missing_docs)]
//! Runs the JSON-RPC conformance sequence against one node and reports per-method verdicts.

use std::{io, process::ExitCode, sync::Arc};

use color_eyre::eyre::{Result, eyre};
use ethprobe_cli::{args::Args, config, file, logging, report};
use ethprobe_execution::EthClient;
use ethprobe_harness::{Runner, TestContext, TokenContract};
use tracing::{info, trace};

/// Main entry point for the application
///
/// This function:
/// - Parses command-line arguments
/// - Initializes logging system
/// - Loads and validates configuration
/// - Runs every probe against the configured node
/// - Prints the report, exiting non-zero when any method failed
#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    // Also forward panics to tracing so they show up alongside the run's logs.
    install_tracing_panic_hook();

    let args = Args::new();

    // This is a drop guard responsible for flushing any remaining logs when the program terminates.
    // It must be assigned to a binding that is not _, as _ will result in the guard being dropped
    // immediately.
    let _guard =
        logging::init(args.log_level.unwrap_or_default(), args.log_format.unwrap_or_default());

    trace!("Command-line parameters: {args:?}");

    let config_file = args.get_config_file_path();
    let mut config = config::load_config(&config_file)
        .map_err(|error| eyre!("Failed to load configuration file: {error}"))?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    info!(file = %config_file.display(), endpoint = %config.rpc_endpoint, "Loaded configuration");
    trace!(?config, "Configuration");

    let account = config.account()?;
    let token = TokenContract::from_hex(&file::load_bytecode(&config.token_bytecode)?)
        .map_err(|error| eyre!("Failed to load token bytecode: {error}"))?;
    let client = EthClient::connect(&config.execution()?)?;

    info!(address = %account.address(), "Testing with account");

    let mut ctx = TestContext::new(Arc::new(client), account, token, config.settings());
    let report = Runner::new().run(&mut ctx).await;

    report::print_console(&mut io::stdout().lock(), &report, args.verbose, logging::enable_ansi())?;

    if let Some(path) = &args.json {
        report::write_json(path, &report)?;
        info!(file = %path.display(), "Wrote JSON report");
    }

    Ok(if report.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn install_tracing_panic_hook() {
    use std::panic;

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());

        let msg: &str = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.as_str()
        } else {
            "panic"
        };

        tracing::error!(target = "panic", %location, message = %msg, "panic occurred");

        default_hook(info);
    }));
}
