//! Background startup load.
//!
//! The pipeline is synchronous file and CPU work, so it runs on tokio's
//! blocking pool while the caller stays free to react to Ctrl+C. A blocking
//! task cannot be aborted: after a cancelled load the runtime must be torn
//! down with [`shutdown`], since dropping it waits for the task to finish.

use std::future::Future;
use std::time::Duration;

use dashboard_core::error::{DashboardError, Result};
use dashboard_core::settings::PipelineConfig;
use dashboard_data::pipeline::{run_pipeline, PipelineMetadata};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::controller::ViewController;

/// Result of a completed load.
#[derive(Debug, Clone)]
pub struct LoadedDashboard {
    pub controller: ViewController,
    pub metadata: PipelineMetadata,
}

/// Handle to a load running on the blocking pool.
pub struct LoadHandle {
    handle: JoinHandle<Result<LoadedDashboard>>,
}

impl LoadHandle {
    /// Wait for the load to finish.
    pub async fn join(self) -> Result<LoadedDashboard> {
        self.handle
            .await
            .map_err(|e| DashboardError::Other(anyhow::anyhow!("load task failed: {e}")))?
    }
}

/// Start loading `config` in the background.
pub fn spawn_load(config: PipelineConfig) -> LoadHandle {
    let handle = tokio::task::spawn_blocking(move || {
        let output = run_pipeline(&config)?;
        let metadata = output.metadata.clone();
        Ok(LoadedDashboard {
            controller: ViewController::from_output(output),
            metadata,
        })
    });
    LoadHandle { handle }
}

/// How a cancellable load ended.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LoadedDashboard),
    Cancelled,
}

/// Load `config`, giving up as soon as `cancel` completes.
pub async fn load_until<F: Future>(config: PipelineConfig, cancel: F) -> Result<LoadOutcome> {
    let handle = spawn_load(config);
    tokio::select! {
        result = handle.join() => result.map(LoadOutcome::Loaded),
        _ = cancel => {
            tracing::debug!("load cancelled; blocking task left to the runtime shutdown");
            Ok(LoadOutcome::Cancelled)
        }
    }
}

/// How long [`shutdown`] waits for blocking tasks.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Tear down `runtime` without waiting on a stuck load.
pub fn shutdown(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
