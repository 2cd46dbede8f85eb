//! Rebuilds every pilgrim's paid/remaining/status from the income ledger.
//!
//! Exits with status 1 when any pilgrim could not be recomputed.

use std::process::ExitCode;

use amanah_server::{build_state, config::Config, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config).await?;

    tracing::info!("Recalculating payments in {}", state.db_path);
    let summary = state.ledger_service.recalculate_all().await?;

    println!("Updated pilgrims: {}", summary.updated_count);
    if summary.errors.is_empty() {
        println!("No errors");
        return Ok(ExitCode::SUCCESS);
    }

    println!("Errors ({}):", summary.errors.len());
    for error in &summary.errors {
        println!("  - {}", error);
    }
    Ok(ExitCode::FAILURE)
}
