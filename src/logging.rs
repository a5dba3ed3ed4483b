//! Logging configuration and initialization for linkdrop.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::Result;

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initialize the logging system with the given configuration.
///
/// Logs go to the console, and additionally to `config.file` when set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    match config.file.as_deref() {
        Some(file) => {
            let log_file = open_log_file(Path::new(file))?;
            install(&config.level, BoxMakeWriter::new(std::io::stdout.and(log_file)), false);
        }
        None => init_console_only(&config.level),
    }

    Ok(())
}

/// Initialize console-only logging.
pub fn init_console_only(level: &str) {
    install(level, BoxMakeWriter::new(std::io::stdout), true);
}

fn install(level: &str, writer: BoxMakeWriter, ansi: bool) {
    let filter = EnvFilter::from_default_env().add_directive(parse_level(level).into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        )
        .with(filter)
        .init();
}

/// Create (truncating) the log file, along with any missing parent directories.
fn open_log_file(path: &Path) -> Result<Arc<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    Ok(Arc::new(File::create(path)?))
}
