mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    let scheduler = scheduler::start_refresh_scheduler(state);

    tracing::info!("MarketSync running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    scheduler.abort();
    Ok(())
}
