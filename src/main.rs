//! Notifier - relays a title/body notification to the destinations of a
//! configured channel.

use clap::Parser;
use notifier::{
    app,
    cli::Cli,
    config::Settings,
    observability::sink_from_settings,
    Dispatcher, RegistryDispatcher,
};
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is fine; the environment may be set another way.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            eprintln!("Failed to load .env file: {err}");
        }
    }
    let cli = Cli::parse();

    let settings = match Settings::load(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("Failed to load settings: {err}");
            return ExitCode::from(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(
        exit_policy = ?settings.exit_policy,
        loki = settings.loki_url().is_some(),
        timeout_seconds = settings.timeout_seconds,
        "Settings loaded"
    );

    let dispatcher = RegistryDispatcher::new(
        Dispatcher::new(sink_from_settings(&settings)),
        settings.timeout(),
    );

    let mut stdout = std::io::stdout().lock();
    let outcome = match app::run(&cli.command, &settings, &dispatcher, &mut stdout) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "Failed to write command output");
            return ExitCode::from(1);
        }
    };
    let _ = stdout.flush();

    ExitCode::from(outcome.exit_code(settings.exit_policy))
}
