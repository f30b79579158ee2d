use anyhow::Result;
use tracing::{error, info, Level};

use shepherd_action::config::ActionConfig;
use shepherd_action::runner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting component owner triage");

    let config = ActionConfig::from_env()?;

    if let Err(e) = runner::run(&config).await {
        error!("Triage run failed: {:#}", e);
        return Err(e);
    }

    info!("Triage run complete");
    Ok(())
}
