//! Registration and heartbeat against the remote controller.
//!
//! The rover announces itself to the controller by name, receives a
//! registry id plus its eye-sensor pin assignment, and then checks in
//! every few seconds so the controller keeps listing it as online. A
//! controller that answers a check-in with anything but success has
//! forgotten the rover, and the next cycle registers from scratch.
//!
//! [`RegistrationCoordinator`] owns that state machine over any
//! [`RoverRegistry`]; the pin assignment obtained from the controller is
//! handed to the sensor poller through a watch channel, exactly once.

use std::net::UdpSocket;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::messages::{PinAssignment, RoverRecord};
use crate::traits::RoverRegistry;

/// What the rover tells the controller about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoverIdentity {
    /// Rover name, the lookup key on the controller.
    pub name: String,
    /// IP the controller can reach this rover's local API on.
    pub local_ip: String,
}

impl RoverIdentity {
    /// Identity with an explicit address.
    pub fn new(name: &str, local_ip: &str) -> Self {
        Self {
            name: name.to_owned(),
            local_ip: local_ip.to_owned(),
        }
    }

    /// Identity with the auto-detected LAN address.
    pub fn detect(name: &str) -> Self {
        Self::new(name, &local_ip())
    }
}

/// Best-effort LAN address detection.
///
/// Connecting a UDP socket does not send traffic; it only asks the OS
/// which interface would route to a public host. Falls back to loopback
/// on machines without a route.
pub fn local_ip() -> String {
    let probe = || -> std::io::Result<String> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip().to_string())
    };
    match probe() {
        Ok(ip) => ip,
        Err(err) => {
            warn!(%err, "could not detect local ip, using loopback");
            "127.0.0.1".to_owned()
        }
    }
}

/// Where the coordinator currently stands with the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationPhase {
    /// No session yet.
    Unauthenticated,
    /// Login in flight.
    LoggingIn,
    /// Session open, no registry id yet.
    Registering,
    /// Registered and checking in.
    Registered,
    /// The controller stopped acknowledging us; re-registering next cycle.
    Forgotten,
}

/// Drives registration and periodic check-in.
///
/// Generic over the registry so tests can script every controller
/// response. The production loop runs [`RegistrationCoordinator::run`];
/// tests call [`RegistrationCoordinator::tick`] directly.
pub struct RegistrationCoordinator<R: RoverRegistry> {
    registry: R,
    identity: RoverIdentity,
    remote_id: Option<String>,
    phase: RegistrationPhase,
    interval: Duration,
    pins_tx: watch::Sender<Option<PinAssignment>>,
    pins_sent: bool,
}

impl<R: RoverRegistry> RegistrationCoordinator<R> {
    /// Create a coordinator that publishes its pin assignment on `pins_tx`.
    pub fn new(
        registry: R,
        identity: RoverIdentity,
        interval: Duration,
        pins_tx: watch::Sender<Option<PinAssignment>>,
    ) -> Self {
        Self {
            registry,
            identity,
            remote_id: None,
            phase: RegistrationPhase::Unauthenticated,
            interval,
            pins_tx,
            pins_sent: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RegistrationPhase {
        self.phase
    }

    /// The controller-assigned id, once registered.
    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    /// The identity this coordinator announces.
    pub fn identity(&self) -> &RoverIdentity {
        &self.identity
    }

    /// The scripted or live registry behind this coordinator.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Open the session and recover any existing registration by name.
    ///
    /// A rover that restarts while the controller still lists it adopts
    /// the old record instead of creating a duplicate. Login failures are
    /// not fatal: the session stays unauthenticated and the registry calls
    /// keep failing until the controller comes back.
    pub async fn connect(&mut self) {
        self.phase = RegistrationPhase::LoggingIn;
        if let Err(err) = self.registry.login().await {
            warn!(%err, "controller login failed, continuing unauthenticated");
        }
        self.phase = RegistrationPhase::Registering;

        match self.registry.lookup(&self.identity.name).await {
            Ok(Some(record)) => {
                info!(id = %record.id, name = %self.identity.name, "recovered existing registration");
                self.adopt(record);
            }
            Ok(None) => debug!(name = %self.identity.name, "no existing registration"),
            Err(err) => warn!(%err, "registration lookup failed"),
        }
    }

    /// One heartbeat cycle: check in when registered, register otherwise.
    pub async fn tick(&mut self) {
        match self.remote_id.clone() {
            Some(id) => match self.registry.checkin(&id, &self.identity).await {
                Ok(true) => {
                    debug!(%id, "controller check-in ok");
                    self.phase = RegistrationPhase::Registered;
                }
                Ok(false) => {
                    warn!(%id, "controller has forgotten us, re-registering");
                    self.forget();
                }
                Err(err) => {
                    warn!(%id, %err, "check-in transport failure, re-registering");
                    self.forget();
                }
            },
            None => match self.registry.register(&self.identity).await {
                Ok(Some(record)) => {
                    self.adopt(record);
                }
                Ok(None) => {
                    warn!(name = %self.identity.name, "registration rejected, retrying next cycle");
                    self.phase = RegistrationPhase::Registering;
                }
                Err(err) => {
                    warn!(%err, "registration transport failure, retrying next cycle");
                    self.phase = RegistrationPhase::Registering;
                }
            },
        }
    }

    /// Run until the stop token flips to `true`.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        self.connect().await;
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        info!("registration loop stopped");
    }

    /// Take over a controller record: remember the id and publish the pin
    /// assignment to the sensor poller. Publication happens once per
    /// process; later re-registrations keep the pins already installed.
    fn adopt(&mut self, record: RoverRecord) {
        self.phase = RegistrationPhase::Registered;
        self.remote_id = Some(record.id.clone());
        if !self.pins_sent {
            self.pins_sent = true;
            if self.pins_tx.send(Some(record.pins())).is_err() {
                warn!("sensor poller is gone, pin assignment dropped");
            }
        }
    }

    fn forget(&mut self) {
        self.phase = RegistrationPhase::Forgotten;
        self.remote_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_produces_some_address() {
        let identity = RoverIdentity::detect("curiosity-rover");
        assert!(!identity.local_ip.is_empty());
    }

    #[test]
    fn new_coordinator_is_unauthenticated() {
        let (tx, _rx) = watch::channel(None);
        let coordinator = RegistrationCoordinator::new(
            crate::hal::MockRegistry::new(),
            RoverIdentity::new("spirit", "10.0.0.2"),
            Duration::from_secs(3),
            tx,
        );
        assert_eq!(coordinator.phase(), RegistrationPhase::Unauthenticated);
        assert_eq!(coordinator.remote_id(), None);
    }
}
