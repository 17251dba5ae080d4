//! `run` command: host every configured entry until Ctrl-C

use anyhow::Context;
use infrastructure::{AppConfig, FeedEvent, Host};
use tracing::{info, warn};

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let entries = config
        .config_entries()
        .context("resolving [[entries]]")?;
    if entries.is_empty() {
        warn!("No entries configured; add one with `iett-cli add-entry`");
        return Ok(());
    }

    let host = Host::from_config(config)?;
    let mut events = host
        .take_event_receiver()
        .context("event receiver already taken")?;

    let total = entries.len();
    let loaded = host.add_entries(entries).await;
    info!(loaded, total, "Host started");
    for state in host.sensor_states() {
        info!(
            sensor = %state.unique_id,
            state = ?state.state,
            available = state.available,
            "Sensor state"
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
            Some(event) = events.recv() => log_event(&host, &event),
        }
    }

    host.shutdown();
    Ok(())
}

fn log_event(host: &Host, event: &FeedEvent) {
    if !event.success {
        warn!(
            entry_id = %event.entry_id,
            feed = %event.feed,
            error = event.error.as_deref().unwrap_or_default(),
            "Refresh failed"
        );
    }

    for sensor in host.registry().sensors(&event.entry_id) {
        let state = sensor.state();
        info!(
            sensor = %state.unique_id,
            state = ?state.state,
            available = state.available,
            duration_ms = event.duration_ms,
            "Sensor state"
        );
    }
}
