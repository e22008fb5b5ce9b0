//! # Club Backend
//!
//! Job-processing service for a club-management backend.
//!
//! ## Features
//!
//! - Durable notification delivery with group fan-out
//! - Malware scanning of uploaded media
//! - Asynchronous export generation
//! - Recruitment-window scheduling
//!
//! ## Architecture
//!
//! The service runs a set of apalis workers against Redis-backed queues.
//! Record stores, queue clients and external-collaborator ports are
//! constructed once at startup and injected into producers and workers.
//!
//! ## Usage
//!
//! ```bash
//! cargo run
//! ```

use club_backend::{
    config::ServerConfig,
    init::{initialize_app_state, initialize_workers},
    logging::setup_logging,
};
use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error reporting with eyre
    color_eyre::install().wrap_err("Failed to initialize error reporting")?;

    dotenv().ok();
    setup_logging();

    let config = ServerConfig::from_env();

    let (app_state, queue) = initialize_app_state(&config)
        .await
        .wrap_err("Failed to initialize application state")?;

    info!("Starting workers");
    initialize_workers(app_state, queue).await?;

    info!("Shutdown complete");
    Ok(())
}
