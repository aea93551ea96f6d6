//! Rover service entry point.
//!
//! Wires the three loops together: the registration coordinator keeps the
//! controller informed and hands the sensor poller its pin assignment, the
//! poller publishes edge events on the broadcast bus, and the local axum
//! API exposes commands, events, and block diagram storage. A single stop
//! token shuts all of it down on ctrl-c.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roverd::hal::{SoftGpio, SoftPwm};
use roverd::motor::MotorBank;
use roverd::registration::{RegistrationCoordinator, RoverIdentity};
use roverd::sensors::SensorPoller;
use roverd::services::{self, AppState};
use roverd::session::SessionClient;
use roverd::storage::DiagramStore;
use roverd::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let identity = RoverIdentity::detect(&config.rover.name);
    info!(
        name = %identity.name,
        ip = %identity.local_ip,
        controller = %config.controller.base_url,
        "starting rover service"
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let (pins_tx, pins_rx) = watch::channel(None);
    let (events_tx, _) = broadcast::channel(64);

    let session = SessionClient::new(config.controller.clone())?;
    let coordinator = RegistrationCoordinator::new(
        session,
        identity,
        config.controller.checkin_interval,
        pins_tx,
    );
    tokio::spawn(coordinator.run(stop_rx.clone()));

    let poller = SensorPoller::new(
        SoftGpio::new(),
        pins_rx,
        events_tx.clone(),
        config.rover.poll_interval,
    );
    tokio::spawn(poller.run(stop_rx.clone()));

    let motors = Arc::new(MotorBank::new(SoftPwm::new(), config.rover.pwm_frequency_hz));
    let store = DiagramStore::open(&config.storage_dir)?;
    let state = AppState::new(motors, events_tx, store);

    tokio::select! {
        result = services::run_server(state, &config.web, stop_rx) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    let _ = stop_tx.send(true);
    info!("rover service stopped");
    Ok(())
}
