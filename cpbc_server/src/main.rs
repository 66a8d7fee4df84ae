//! Serves a road's refuse collection dates as iCalendar and JSON, refreshed periodically.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cpbc_core::{refresh::RefreshContext, refuse_client::RefuseClient};
use log::{info, warn};

mod config;
mod route;

#[derive(Debug, Parser)]
#[command(about = "Castle Point refuse collection calendar server")]
struct Arguments {
    /// path to the configuration file
    #[arg(long, default_value = "cpbc.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Arguments::parse();
    let config = config::init(&args.config)?;
    let client = RefuseClient::new(config.request_timeout(), config.timezone)?;
    let context = RefreshContext::new(client, config.road_id.clone(), config.road_name.clone());
    let schedule = context.spawn_schedule(config.refresh_interval());

    let app = route::router(context);
    info!("listening on {}", config.listen);
    let served = axum::Server::bind(&config.listen)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await;
    schedule.stop().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("could not listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
