//! Terminal front panel for a rackwire engine.
//!
//! Connects to the engine, subscribes to the standard notification topics,
//! prints what the engine pushes, and dumps the visible unit catalog once
//! connected.
//!
//! Run against a local engine:
//!   cargo run -p panel
//!
//! Configuration comes from the environment: RACKWIRE_HOST, RACKWIRE_PORT,
//! RACKWIRE_BINARY_FRAMES, RACKWIRE_IGNORE_UNITS.

use rackwire_client::{banks, visible_units, Client, Config};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("panel=info".parse()?))
        .init();

    let config = Config::from_env();
    tracing::info!("connecting to {}", config.url());

    let ignore = config.ignore_units.clone();
    let client = Client::start(config);

    let mut connectivity = client.connectivity();
    let mut state_events = client.notifications("state");
    let mut preset_events = client.notifications("preset");

    // Queued until the engine answers the first connection.
    let units = visible_units(&client, &ignore).await?;
    for unit in &units {
        tracing::info!(id = %unit.id, name = %unit.name, stereo = unit.stereo, "unit");
    }
    for bank in banks(&client).await? {
        tracing::info!(name = %bank.name, presets = bank.presets.len(), "bank");
    }

    loop {
        tokio::select! {
            changed = connectivity.changed() => {
                if changed.is_err() {
                    anyhow::bail!("client stopped");
                }
                let online = *connectivity.borrow_and_update();
                tracing::info!(online, "connectivity");
            }
            event = state_events.recv() => match event {
                Ok(notification) => tracing::info!(message = %notification.message, "state"),
                Err(RecvError::Lagged(missed)) => tracing::warn!(missed, "state events lagged"),
                Err(RecvError::Closed) => anyhow::bail!("client stopped"),
            },
            event = preset_events.recv() => match event {
                Ok(notification) => tracing::info!(message = %notification.message, "preset"),
                Err(RecvError::Lagged(missed)) => tracing::warn!(missed, "preset events lagged"),
                Err(RecvError::Closed) => anyhow::bail!("client stopped"),
            },
        }
    }
}
