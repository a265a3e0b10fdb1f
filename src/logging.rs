//! File-based logging setup.
//!
//! All diagnostics go to daily-rotated files under the XDG state directory;
//! nothing is written to the terminal, which belongs to the TUI. Old rotated
//! files are pruned at startup.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

/// Rotated log files kept on disk (one per day).
const KEEP_LOG_FILES: usize = 7;

const LOG_FILE_PREFIX: &str = "voxlog.log";

/// Keeps the non-blocking writer alive for the lifetime of the process.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes logging into daily-rotated files.
///
/// The level is taken from `RUST_LOG`, defaulting to `info`.
///
/// # Errors
/// - If the log directory cannot be determined or created
/// - If logging was already initialized
pub fn init_logging() -> Result<()> {
    let log_dir = log_dir()?;

    match prune_logs(&log_dir, KEEP_LOG_FILES) {
        Ok(0) => {}
        Ok(removed) => tracing::debug!("Pruned {removed} old log files"),
        Err(e) => eprintln!("Warning: failed to prune old logs: {e}"),
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&log_dir, LOG_FILE_PREFIX));
    APPENDER_GUARD
        .set(guard)
        .map_err(|_| anyhow!("Logging already initialized"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(false)
                .with_writer(writer),
        )
        .init();

    tracing::debug!("Logging to {}", log_dir.display());
    Ok(())
}

/// The log directory: `$XDG_STATE_HOME/voxlog`, or `~/.local/state/voxlog`
/// where no state directory convention exists. Created if missing.
///
/// # Errors
/// - If no home directory can be determined
/// - If the directory cannot be created
pub fn log_dir() -> Result<PathBuf> {
    let state_root = match dirs::state_dir() {
        Some(dir) => dir,
        None => dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?
            .join(".local")
            .join("state"),
    };

    let log_dir = state_root.join("voxlog");
    std::fs::create_dir_all(&log_dir)?;
    Ok(log_dir)
}

/// Removes rotated log files beyond the newest `keep`, returning how many
/// were deleted.
///
/// The rolling appender names files `voxlog.log.YYYY-MM-DD`, so sorting the
/// names lexicographically sorts them chronologically; no filesystem
/// timestamps are consulted.
fn prune_logs(log_dir: &Path, keep: usize) -> Result<usize> {
    let mut dated: Vec<String> = std::fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_dated_log(name))
        .collect();

    dated.sort_unstable();

    let excess = dated.len().saturating_sub(keep);
    let mut removed = 0;
    for name in dated.into_iter().take(excess) {
        match std::fs::remove_file(log_dir.join(&name)) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to delete old log file {name}: {e}"),
        }
    }

    Ok(removed)
}

/// Matches `voxlog.log.YYYY-MM-DD`, the rolling appender's naming scheme.
fn is_dated_log(name: &str) -> bool {
    let Some(suffix) = name
        .strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
    else {
        return false;
    };

    let bytes = suffix.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_dated_log() {
        assert!(is_dated_log("voxlog.log.2026-08-28"));
        assert!(!is_dated_log("voxlog.log"));
        assert!(!is_dated_log("voxlog.log.today"));
        assert!(!is_dated_log("voxlog.log.2026-08-281"));
        assert!(!is_dated_log("other.log.2026-08-28"));
    }

    #[test]
    fn test_prune_keeps_newest_by_name() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=9 {
            std::fs::write(dir.path().join(format!("voxlog.log.2026-08-0{day}")), b"").unwrap();
        }
        // Not a rotated file, must survive pruning
        std::fs::write(dir.path().join("voxlog.log"), b"").unwrap();

        let removed = prune_logs(dir.path(), 7).unwrap();
        assert_eq!(removed, 2);

        assert!(!dir.path().join("voxlog.log.2026-08-01").exists());
        assert!(!dir.path().join("voxlog.log.2026-08-02").exists());
        assert!(dir.path().join("voxlog.log.2026-08-03").exists());
        assert!(dir.path().join("voxlog.log.2026-08-09").exists());
        assert!(dir.path().join("voxlog.log").exists());
    }

    #[test]
    fn test_prune_under_limit_removes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("voxlog.log.2026-08-28"), b"").unwrap();
        assert_eq!(prune_logs(dir.path(), 7).unwrap(), 0);
    }
}
