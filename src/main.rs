use clap::Parser;
use oait::cli::{Cli, LogLevel};
use oait::config::Config;
use oait::{commands, OaitError, VERSION};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_level = level
        .to_tracing_level()
        .map(LevelFilter::from_level)
        .unwrap_or(LevelFilter::OFF);

    // RUST_LOG, when set, overrides --log-level
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return None;
    };

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {:?} ({}); logging to stderr", log_path, e);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn report(err: &anyhow::Error) {
    tracing::error!("{:#}", err);
    eprintln!("Error: {}", err);

    if let Some(cause) = err.chain().find_map(|c| c.downcast_ref::<OaitError>()) {
        let detail = cause.display_message();
        if detail != err.to_string() {
            eprintln!("  {}", detail);
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = setup_logging(cli.log_level, cli.log_file.as_deref());
    tracing::info!("oait {} started with log level: {:?}", VERSION, cli.log_level);

    let config = Config::load();

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
