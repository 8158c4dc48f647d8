use std::net::SocketAddr;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resume_dashboard::config::Config;
use resume_dashboard::db::create_pool;
use resume_dashboard::maintenance::{MaintenanceService, OperationOutcome};
use resume_dashboard::routes::build_router;
use resume_dashboard::state::AppState;
use resume_dashboard::store::SchemaManager;

#[derive(Parser)]
#[command(
    name = "resume-dashboard",
    version,
    about = "Résumé store, dashboard and operator tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print the row count of every table
    Status,
    /// Delete every row of one table (the admin table is refused)
    ClearTable { name: String },
    /// Empty every table except admin
    ResetDashboard,
    /// Restart id counters so the next insert gets id 1
    ResetSequences,
    /// Empty the model-analysis table
    ResetAiAnalysis,
    /// Replace all admin accounts with the configured bootstrap account
    ResetCredentials,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("resume_dashboard={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-dashboard v{}", env!("CARGO_PKG_VERSION"));

    let pool = create_pool(&config.database_url, config.max_connections).await?;

    // Schema failure aborts startup.
    SchemaManager::new(pool.clone(), config.bootstrap_admin.clone())
        .ensure_schema()
        .await?;

    let maintenance = MaintenanceService::new(pool.clone(), config.bootstrap_admin.clone());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState::new(pool, config.bootstrap_admin.clone());
            serve(state, config.port).await
        }
        Command::Status => {
            let result = maintenance.status().await;
            report(&OperationOutcome::from_status(&result), result.as_ref().ok())
        }
        Command::ClearTable { name } => {
            let result = maintenance.clear_table(&name).await;
            report(&OperationOutcome::from_clear(&name, &result), None::<&()>)
        }
        Command::ResetDashboard => {
            let result = maintenance.reset_dashboard().await;
            report(&OperationOutcome::from_reset(&result), None::<&()>)
        }
        Command::ResetSequences => {
            let result = maintenance.reset_sequence_counters().await;
            let outcome = OperationOutcome::from_unit(
                &result,
                "Sequence counters reset",
                "Error resetting sequence counters",
            );
            report(&outcome, None::<&()>)
        }
        Command::ResetAiAnalysis => {
            let result = maintenance.reset_ai_analysis().await;
            report(&OperationOutcome::from_clear("ai_analysis", &result), None::<&()>)
        }
        Command::ResetCredentials => {
            let result = maintenance.reset_credentials().await;
            let outcome = OperationOutcome::from_unit(
                &result,
                "Admin credentials reset; password change required on next login",
                "Error resetting admin credentials",
            );
            report(&outcome, None::<&()>)
        }
    }
}

async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Prints the outcome (and any structured payload) as JSON and turns an
/// unsuccessful outcome into a non-zero exit.
fn report<T: Serialize>(outcome: &OperationOutcome, payload: Option<&T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(outcome)?);
    if let Some(payload) = payload {
        println!("{}", serde_json::to_string_pretty(payload)?);
    }
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    Ok(())
}
