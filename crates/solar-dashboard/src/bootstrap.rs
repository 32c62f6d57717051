use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_DIR: &str = ".solar-dashboard";
const LOG_FILE_NAME: &str = "solar-dashboard.log";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Root of the dashboard's own files, `~/.solar-dashboard/`.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Ensure `~/.solar-dashboard/` and `~/.solar-dashboard/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    ensure_directories_in(&app_dir())
}

fn ensure_directories_in(root: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(root.join("logs"))
        .with_context(|| format!("creating {}", root.display()))?;
    Ok(())
}

/// `~/.solar-dashboard/logs/solar-dashboard.log`.
pub fn default_log_path() -> PathBuf {
    app_dir().join("logs").join(LOG_FILE_NAME)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a `DEBUG/INFO/WARNING/ERROR/CRITICAL` level name to a tracing
/// filter directive. Unrecognised names pass through unchanged.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, writing to `log_file` (or
/// [`default_log_path`]).
///
/// The terminal belongs to the dashboard, so nothing is logged to stdout or
/// stderr. `RUST_LOG` overrides `log_level` when set.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<PathBuf> {
    let path = log_file.cloned().unwrap_or_else(default_log_path);
    let file = open_log_file(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(path)
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
