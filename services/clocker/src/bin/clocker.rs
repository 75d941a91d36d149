//! services/clocker/src/bin/clocker.rs
//!
//! `clocker [status|clock-in|clock-out]`

use chrono::Utc;
use clap::{Parser, Subcommand};
use clocker_core::clock::ClockState;
use clocker_lib::{
    adapters::{FixedLocationAdapter, HttpAttendanceAdapter, TracingNotifier},
    config::Config,
    error::ClockerError,
    session::{AppState, ClockOutcome, ClockSession},
};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Geofenced clock-in for the current service
#[derive(Parser)]
#[command(name = "clocker", version = env!("CARGO_PKG_VERSION"), long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Show the latest service and whether clock-in is possible (default)
    Status,
    /// Clock in for the latest service
    ClockIn,
    /// Clock out of the open attendance record, after confirmation
    ClockOut,
}

#[tokio::main]
async fn main() -> Result<(), ClockerError> {
    let command = Cli::parse().command.unwrap_or(Command::Status);

    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded.");

    // --- 2. Initialize Service Adapters ---
    let attendance = Arc::new(HttpAttendanceAdapter::new(
        &config.attendance_api_url,
        config.attendance_api_token.as_deref(),
        config.request_timeout,
    )?);
    let location = Arc::new(FixedLocationAdapter::new(config.device_coordinates));
    let notifier = Arc::new(TracingNotifier);

    // --- 3. Mount the Session ---
    let app_state = Arc::new(AppState::new(&config, attendance, location, notifier));
    let session = ClockSession::new(app_state);
    let watcher = session.spawn_location_watcher(config.location_poll_interval);

    let result = run(&session, command).await;

    session.unmount();
    if let Err(e) = watcher.await {
        warn!("Location watcher ended abnormally: {}", e);
    }
    result
}

async fn run(session: &ClockSession, command: Command) -> Result<(), ClockerError> {
    let state = session.refresh().await?;
    report(session, state).await;

    let outcome = match command {
        Command::Status => return Ok(()),
        Command::ClockIn => session.clock_in(Utc::now()).await?,
        Command::ClockOut => match session.request_clock_out(Utc::now()).await {
            Some(confirmation) => {
                if !confirm(confirmation.prompt)? {
                    info!("Clock-out cancelled.");
                    return Ok(());
                }
                session.confirm_clock_out(&confirmation, Utc::now()).await?
            }
            None => {
                info!("Clock-out is not available right now.");
                return Ok(());
            }
        },
    };

    match outcome {
        ClockOutcome::ClockedIn(record) | ClockOutcome::ClockedOut(record) => {
            info!("Attendance {} updated.", record.id)
        }
        other => info!("No change: {:?}", other),
    }
    report(session, session.state(Utc::now()).await).await;
    Ok(())
}

async fn report(session: &ClockSession, state: ClockState) {
    let verdict = session.verdict().await;
    match session.service().await {
        Some(service) => info!(
            "{} '{}': {:?} (distance {:.0} m of {:.0} m)",
            service.kind().label(),
            service.name,
            state,
            verdict.distance,
            service.range.range_to_clock_in
        ),
        None => info!("{:?}", state),
    }
}

fn confirm(prompt: &str) -> Result<bool, ClockerError> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
