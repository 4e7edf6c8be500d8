//! Delvers simulation entry point.

use std::error::Error;

use delvers_sim::runner::{self, SimConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Delvers simulation");

    // Read configuration from environment.
    let config = SimConfig::from_env()?;

    let report = runner::run(config).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
