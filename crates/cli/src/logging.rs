//! Tracing setup: human output on stderr plus an optional log file.

use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Mutex;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use vaultgraph_core::config::types::ResolvedConfig;

static FILE_GUARD: Mutex<Option<WorkerGuard>> = Mutex::new(None);

/// Install the global subscriber. `RUST_LOG` overrides both configured levels.
pub fn init(cfg: &ResolvedConfig) {
    let logging = &cfg.logging;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(level_filter(&logging.level, LevelFilter::INFO));

    let file_layer = logging.file.as_deref().map(|path| {
        let level = logging.file_level.as_deref().unwrap_or(&logging.level);
        fmt::layer()
            .with_writer(open_log_file(path))
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(level_filter(level, LevelFilter::DEBUG))
    });

    tracing_subscriber::registry().with(stderr_layer).with(file_layer).init();
}

/// Flush and close the log file, if one was opened.
pub fn shutdown() {
    if let Ok(mut guard) = FILE_GUARD.lock() {
        guard.take();
    }
}

fn level_filter(level: &str, fallback: LevelFilter) -> EnvFilter {
    let default = parse_level(level).unwrap_or(fallback);
    EnvFilter::builder().with_default_directive(default.into()).from_env_lossy()
}

/// Open `path` for appending, creating missing parent directories.
fn open_log_file(path: &Path) -> NonBlocking {
    let opened = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| OpenOptions::new().create(true).append(true).open(path));

    let file = match opened {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(file);
    if let Ok(mut slot) = FILE_GUARD.lock() {
        *slot = Some(guard);
    }
    writer
}

fn parse_level(s: &str) -> Option<LevelFilter> {
    match s.trim().to_ascii_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::OFF),
        "error" => Some(LevelFilter::ERROR),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "info" => Some(LevelFilter::INFO),
        "debug" => Some(LevelFilter::DEBUG),
        "trace" => Some(LevelFilter::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARN"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("warning"), Some(LevelFilter::WARN));
        assert_eq!(parse_level(" debug "), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("off"), Some(LevelFilter::OFF));
        assert_eq!(parse_level("verbose"), None);
        assert_eq!(parse_level(""), None);
    }
}
