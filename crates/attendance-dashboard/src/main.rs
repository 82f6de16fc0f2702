mod bootstrap;
mod summary;

use std::process::ExitCode;

use anyhow::{Context, Result};
use attendance_core::error::{DashboardError, ErrorKind};
use attendance_core::settings::Settings;
use attendance_runtime::session::DashboardSession;
use attendance_ui::app::App;

fn main() -> Result<ExitCode> {
    let settings = Settings::load_with_last_used();

    let app_dir = bootstrap::app_dir();
    bootstrap::ensure_directories(&app_dir)?;

    // The terminal UI owns the screen, so it always logs to a file.
    let log_file = match (&settings.log_file, settings.view.as_str()) {
        (Some(path), _) => Some(path.clone()),
        (None, "tui") => Some(bootstrap::default_log_file(&app_dir)),
        (None, _) => None,
    };
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;
    for warning in &settings.warnings {
        tracing::warn!("{warning}");
    }

    tracing::info!("Attendance Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let mut session = DashboardSession::from_settings(&settings);

    match settings.view.as_str() {
        "tui" => {
            App::new(&settings.theme)
                .run(&mut session)
                .context("running the terminal dashboard")?;
        }
        "summary" => {
            let report = match session.report() {
                Ok(report) => report,
                Err(e) => return Ok(report_failure(&e)),
            };
            let source = session
                .sources()
                .map(|s| s.key.attendance.display().to_string())
                .unwrap_or_default();
            print!("{}", summary::render_summary(&report, &source));
        }
        "json" => {
            let report = match session.report() {
                Ok(report) => report,
                Err(e) => return Ok(report_failure(&e)),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        unknown => {
            eprintln!("Unknown view: {}", unknown);
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print a load failure for the user and pick the exit code.
fn report_failure(err: &DashboardError) -> ExitCode {
    tracing::error!("{err}");
    let heading = match err.kind() {
        ErrorKind::FileNotFound => "File not found",
        ErrorKind::LoadError => "Could not load attendance data",
        ErrorKind::InvalidSelection => "Invalid selection",
        ErrorKind::Config => "Configuration error",
    };
    eprintln!("{heading}: {err}");
    ExitCode::FAILURE
}
