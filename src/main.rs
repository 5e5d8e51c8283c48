//! CMDB Syncer - rule engine for Checkmk, Ansible and Netbox exports
//!
//! Runs one command against the configured database and prints its JSON
//! result on stdout. Logs go to stderr or to the configured log files.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};

use cmdb_syncer::config::{self, LogFormat};
use cmdb_syncer::{AppConfig, AppState, CommandRegistry};

/// Parsed command line
struct Invocation {
    config_path: Option<PathBuf>,
    command: Option<String>,
    args: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut config_path = None;
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = rest.next().context("--config needs a path")?;
                config_path = Some(PathBuf::from(path));
            }
            _ => {
                return Ok(Invocation {
                    config_path,
                    command: Some(arg.clone()),
                    args: rest.cloned().collect(),
                });
            }
        }
    }

    Ok(Invocation {
        config_path,
        command: None,
        args: vec![],
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let registry = CommandRegistry::with_defaults()?;

    // Check for --help flag
    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help(&registry);
        return Ok(());
    }

    // Check for --version flag
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("CMDB Syncer {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let invocation = parse_args(&args)?;
    let Some(command) = invocation.command else {
        print_help(&registry);
        return Ok(());
    };

    // Load configuration first (before logging, so we know log format)
    let config = match &invocation.config_path {
        Some(path) => {
            let _ = dotenvy::dotenv();
            AppConfig::load_with(Some(path))
        }
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    // The guard must be kept alive so buffered log lines reach the file
    let _log_guard = init_logging(&config);
    info!("CMDB Syncer {} running '{}'", env!("CARGO_PKG_VERSION"), command);

    ensure_data_directory(&config)?;

    let state = AppState::connect(config)
        .await
        .context("Failed to initialize database")?;

    let output = registry.dispatch(&state, &command, &invocation.args).await?;
    println!("{}", output);
    Ok(())
}

/// Initialize the logging/tracing infrastructure
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match &log_config.target {
        LogTarget::Console => {
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            init_both_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let rotation = if log_config.daily_rotation {
        tracing_appender::rolling::Rotation::DAILY
    } else {
        tracing_appender::rolling::Rotation::NEVER
    };

    let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&log_config.log_prefix)
        .filename_suffix("log")
        .max_log_files(log_config.max_log_files)
        .build(&log_config.log_dir);

    match file_appender {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(e) => {
            eprintln!("Warning: Failed to open log file, logging to stderr: {}", e);
            tracing_appender::non_blocking(std::io::stderr())
        }
    }
}

/// Initialize console-only logging
///
/// Console output goes to stderr; stdout carries the command result.
fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

/// Initialize file-only logging
fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(writer))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Initialize both console and file logging
fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr)) // Console
                .with(fmt::layer().json().with_target(true).with_writer(writer)) // File
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr)) // Console
                .with(fmt::layer().compact().with_target(false).with_writer(writer)) // File
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr)) // Console
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(writer),
                ) // File
                .init();
        }
    }
}

/// Ensure the data directory exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        let path = path.split('?').next().unwrap_or(path);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

fn print_help(registry: &CommandRegistry) {
    println!(
        r#"CMDB Syncer {}

USAGE:
    cmdb-syncer [OPTIONS] <COMMAND> [ARGS]

OPTIONS:
    -c, --config <PATH>     Configuration file to use
    -h, --help              Print this help message
    -V, --version           Print version information

COMMANDS:
{}

ENVIRONMENT:
    CMDB_SYNCER_CONFIG      Path to configuration file (default: config.yaml)
    DATABASE_URL            SQLite database URL
    RUST_LOG                Log filter, overrides logging.level

CONFIGURATION:
    The configuration file is looked up in the following order:
    1. --config or the CMDB_SYNCER_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/cmdb-syncer/config.yaml"#,
        env!("CARGO_PKG_VERSION"),
        registry.help()
    );
}
