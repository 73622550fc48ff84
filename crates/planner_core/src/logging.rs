//! Process-wide file logging for the planner.
//!
//! # Responsibility
//! - Start one size-rotated log file set per process.
//! - Route panics into the log before the default hook runs.
//!
//! # Invariants
//! - A second `init_logging` with the same settings succeeds without effect;
//!   different settings are refused.
//! - Setup failures are returned, never panicked.
//! - Log lines carry ids and counts only, never event titles or locations.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const FILE_BASENAME: &str = "planner";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 4;
const PANIC_TEXT_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    status: LoggingStatus,
    _handle: LoggerHandle,
}

/// Settings of the running logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingStatus {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnsupportedLevel(String),
    InvalidDirectory(PathBuf),
    /// Logging already runs with other settings.
    AlreadyInitialized(LoggingStatus),
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(f, "unknown log level `{level}`"),
            Self::InvalidDirectory(dir) => {
                write!(f, "log directory `{}` must be an absolute, writable path", dir.display())
            }
            Self::AlreadyInitialized(active) => write!(
                f,
                "logging already runs at {} in `{}`",
                active.level,
                active.log_dir.display()
            ),
            Self::Backend(message) => write!(f, "logger backend failed: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Starts file logging under `log_dir`.
///
/// `level` is one of `off|error|warn|info|debug|trace`, case-insensitive.
pub fn init_logging(level: &str, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let requested = LoggingStatus {
        level: parse_level(level)?,
        log_dir: checked_dir(log_dir.as_ref())?,
    };

    let active = ACTIVE.get_or_try_init(|| start(&requested))?;
    if active.status != requested {
        return Err(LoggingError::AlreadyInitialized(active.status.clone()));
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LoggingStatus> {
    ACTIVE.get().map(|active| active.status.clone())
}

/// Level used when the config does not name one.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: &LoggingStatus) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.log_dir)
        .map_err(|_| LoggingError::InvalidDirectory(settings.log_dir.clone()))?;

    let files = FileSpec::default()
        .directory(&settings.log_dir)
        .basename(FILE_BASENAME);
    let handle = Logger::try_with_str(settings.level.to_string())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(files)
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .append()
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    route_panics_to_log();
    info!(
        "event=logging_start module=logging status=ok level={} os={} version={}",
        settings.level,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        status: settings.clone(),
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = level.trim();
    LevelFilter::from_str(trimmed).map_err(|_| LoggingError::UnsupportedLevel(trimmed.to_string()))
}

fn checked_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LoggingError::InvalidDirectory(dir.to_path_buf()))
    }
}

fn route_panics_to_log() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let next = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        error!(
            "event=panic module=logging status=error location={location} message={}",
            panic_text(info)
        );
        next(info);
    }));
}

fn panic_text(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    let raw = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string payload>");
    single_line(raw, PANIC_TEXT_LIMIT)
}

/// Flattens control characters to spaces and caps the length.
fn single_line(text: &str, limit: usize) -> String {
    let mut out: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        out.push('…');
    }
    out
}
