// SPDX-License-Identifier: MIT
//
// Log setup.
//
// stdout and stderr belong to the raw-mode terminal while the viewer runs,
// so logs go to a file through a non-blocking appender. The returned guard
// must live until exit; dropping it flushes whatever is still queued.
//
// Failing to set up logging is not fatal. The viewer just runs silent.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter (`EnvFilter` syntax).
pub const LOG_ENV: &str = "LESSVIM_LOG";

/// Keeps the background log writer alive.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// The file logs are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `<tmpdir>/lessvim.log`.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("lessvim.log")
}

/// Install the global subscriber, writing to `log_file` or the default path.
///
/// Returns `None` if the file can't be opened or a subscriber is already
/// installed.
pub fn init(log_file: Option<&Path>) -> Option<LoggingGuard> {
    let path = log_file.map_or_else(default_log_path, Path::to_path_buf);
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let name = path.file_name()?.to_str()?.to_owned();

    std::fs::create_dir_all(&dir).ok()?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(&dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .ok()?;

    Some(LoggingGuard {
        _guard: guard,
        path,
    })
}
