mod bootstrap;

use anyhow::Result;
use dashboard_core::settings::Settings;
use dashboard_core::time_utils::resolve_timezone;
use dashboard_runtime::controller::DashboardState;
use dashboard_runtime::loader::{self, LoadOutcome};
use dashboard_ui::app::App;

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run());
    // Dropping the runtime would wait on a load abandoned by Ctrl+C.
    loader::shutdown(runtime);
    result
}

async fn run() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::ensure_directories()?;
    let log_path = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_path.display(),
        "solar dashboard starting"
    );

    let config = settings.pipeline_config()?;
    let timezone = resolve_timezone(&config.timezone)?;
    let years = config.years.to_string();
    tracing::info!(
        production = %config.production.path.display(),
        weather = %config.weather.path.display(),
        %timezone,
        %years,
        theme = %settings.theme,
        "configuration resolved"
    );

    // Any load failure is fatal: the dashboard never starts on partial data.
    let loaded = match loader::load_until(config, tokio::signal::ctrl_c()).await {
        Ok(LoadOutcome::Loaded(loaded)) => loaded,
        Ok(LoadOutcome::Cancelled) => {
            tracing::info!("Ctrl+C received during load; exiting");
            return Ok(());
        }
        Err(e) => {
            tracing::error!(error = %e, "load pipeline failed");
            return Err(e.into());
        }
    };
    tracing::info!(
        generated_at = %loaded.metadata.generated_at,
        joined_rows = loaded.metadata.joined_rows,
        "dashboard data ready"
    );

    let app = App::new(
        &settings.theme,
        DashboardState::new(loaded.controller),
        timezone.name().to_string(),
        years,
    )
    .with_metadata(loaded.metadata);

    // The loop exits on 'q' / Esc / Ctrl+C inside the TUI. We also listen for
    // Ctrl+C at the OS level for signals that bypass raw mode.
    tokio::select! {
        result = app.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received; shutting down");
        }
    }

    tracing::info!("solar dashboard stopped");
    Ok(())
}
