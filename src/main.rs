//! Headless simtrace driver.
//!
//! Connects to the simulation server named by `SIMTRACE_URL`, keeps it
//! alive, plays `SIMTRACE_TICKS` random firings, prints the resulting trace
//! and variable graph, then stops the server.

use simtrace::{AutoAnswer, Controller, HttpTransport, KeepAlive, PlayEnd, Player, SimConfig};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = SimConfig::from_env()?;
    info!(
        base_url = %config.base_url,
        tick_ms = config.tick_period.as_millis() as u64,
        ticks = config.ticks,
        ping_secs = config.ping_interval.as_secs(),
        "configuration loaded"
    );

    let transport = Arc::new(HttpTransport::new(&config)?);
    let controller = Controller::connect(Arc::clone(&transport)).await?;
    for action in controller.ui() {
        info!(label = %action.label, href = %action.href, "server action available");
    }
    let controller = Arc::new(Mutex::new(controller));
    let keepalive = KeepAlive::spawn(Arc::clone(&transport), config.ping_interval);

    let mut player = Player::new(config.tick_period);
    player
        .play(Arc::clone(&controller), config.ticks, true, &AutoAnswer(true))
        .await;
    match player.join().await {
        Some(PlayEnd::Failed { ticks, error }) => warn!(ticks, error = %error, "play aborted"),
        Some(end) => info!(ticks = end.ticks(), "play ended"),
        None => {}
    }

    let controller = controller.lock().await;
    let session = controller.session();
    print!("{}", session.trace_view());
    println!("{}", session.graph_view().to_svg(640.0, 240.0));

    keepalive.stop();
    if let Err(e) = controller.quit().await {
        warn!(error = %e, "quit failed");
    }
    Ok(())
}
