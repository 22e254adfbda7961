use anyhow::{Context, Result};
use deepdev_api::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config)?;

    let state = AppState::load(config.clone())
        .await
        .context("failed to load datasets")?;

    if let Some(interval) = config.data.reload_interval() {
        tracing::info!("Reloading datasets every {} seconds", interval.as_secs());
        state.store().spawn_reload_task(interval);
    }

    Server::new(config).serve(deepdev_api::app(state)).await?;

    Ok(())
}
