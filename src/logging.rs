//! Structured file logging: daily-rolling files in the platform log
//! directory, tagged with a per-invocation session id.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use directories::ProjectDirs;
use rand::Rng;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Log files older than this are removed at startup.
const RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Handle returned by [`init`].
///
/// Dropping the guard flushes the non-blocking writer, so it must live
/// for the whole session.
pub struct LoggingContext {
    pub _guard: WorkerGuard,
    /// 6-hex-char id identifying this invocation in the logs.
    pub session_id: String,
    pub log_directory: PathBuf,
}

#[derive(Debug)]
pub struct LoggingError {
    pub message: String,
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl LoggingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Where log files go.
///
/// macOS gets `~/Library/Logs/pysnip`; everywhere else uses the
/// platform state directory (`~/.local/state/pysnip` on Linux).
fn resolve_log_dir() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        return dirs::home_dir().map(|h| h.join("Library").join("Logs").join("pysnip"));
    }
    ProjectDirs::from("com", "pysnip", "pysnip")
        .and_then(|dirs| dirs.state_dir().map(PathBuf::from))
}

/// Set up the global subscriber writing to a daily-rolling file.
///
/// `level` is the already-resolved filter string (CLI flag, PYSNIP_LOG,
/// or config file); an unparseable value falls back to `info`.
pub fn init(level: &str) -> Result<LoggingContext, LoggingError> {
    let log_directory =
        resolve_log_dir().ok_or_else(|| LoggingError::new("Failed to determine log directory"))?;
    fs::create_dir_all(&log_directory)
        .map_err(|e| LoggingError::new(format!("Failed to create log directory: {}", e)))?;

    let appender = tracing_appender::rolling::daily(&log_directory, "pysnip");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::NONE)
                .with_target(true),
        )
        .init();

    let session_id = new_session_id();
    info!(session_id = %session_id, "session_start");

    Ok(LoggingContext {
        _guard: guard,
        session_id,
        log_directory,
    })
}

fn new_session_id() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Delete `pysnip.*` log files past the retention period.
///
/// Failures are logged and skipped; cleanup never blocks startup.
pub fn cleanup_old_logs(log_dir: &Path) {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "log_cleanup_read_dir_failed");
            return;
        }
    };

    let now = SystemTime::now();
    let mut deleted = 0u32;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !is_log_file(&path) {
            continue;
        }
        match log_file_age(&path, now) {
            Some(age) if age > RETENTION => match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(file = ?path.file_name(), age_days = age.as_secs() / 86400, "log_deleted");
                    deleted += 1;
                }
                Err(e) => warn!(file = ?path.file_name(), error = %e, "log_delete_failed"),
            },
            _ => {}
        }
    }

    if deleted > 0 {
        debug!(count = deleted, "log_cleanup_done");
    }
}

/// Matches the rolling appender's `pysnip.YYYY-MM-DD` naming.
fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| name.starts_with("pysnip.") && name != "pysnip")
}

/// Age by mtime; `None` when the metadata is unreadable or the file
/// claims to be from the future.
fn log_file_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(e) => {
            warn!(file = ?path.file_name(), error = %e, "log_metadata_failed");
            return None;
        }
    };
    now.duration_since(modified).ok()
}
