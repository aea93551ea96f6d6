//! Edge-triggered binary sensor polling.
//!
//! Each configured digital input is sampled on a fixed interval; an event
//! is emitted only when the level differs from the immediately preceding
//! read: rising edges emit the sensor's `rising_event`, falling edges its
//! `falling_event`, steady levels emit nothing.
//!
//! The sensor set is empty until the registration coordinator delivers the
//! pin assignment over a watch channel (the remote controller decides which
//! pins the IR sensors live on); until then poll iterations are no-ops.
//!
//! # Example
//!
//! ```rust
//! use roverd::sensors::BinarySensor;
//!
//! let mut sensor = BinarySensor::new("left_ir_sensor", 3, "uncovered", "covered");
//!
//! assert_eq!(sensor.observe(false), None);
//! assert_eq!(sensor.observe(true), Some("uncovered"));
//! assert_eq!(sensor.observe(true), None);
//! assert_eq!(sensor.observe(false), Some("covered"));
//! ```

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::messages::{PinAssignment, SensorEvent};
use crate::traits::{GpioInput, PinId};

/// One configured digital input and its last observed level.
#[derive(Debug, Clone)]
pub struct BinarySensor {
    /// Human-readable sensor name.
    pub name: String,
    /// Hardware pin the sensor is wired to.
    pub pin: PinId,
    /// Event name emitted on a low-to-high transition.
    pub rising_event: String,
    /// Event name emitted on a high-to-low transition.
    pub falling_event: String,
    last_level: bool,
}

impl BinarySensor {
    /// Create a sensor; the initial remembered level is low.
    pub fn new(
        name: impl Into<String>,
        pin: PinId,
        rising_event: impl Into<String>,
        falling_event: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pin,
            rising_event: rising_event.into(),
            falling_event: falling_event.into(),
            last_level: false,
        }
    }

    /// Record a new level read, returning the edge event it triggers.
    ///
    /// The remembered level is updated unconditionally, whether or not an
    /// event fired.
    pub fn observe(&mut self, level: bool) -> Option<&str> {
        let previous = self.last_level;
        self.last_level = level;
        match (previous, level) {
            (false, true) => Some(self.rising_event.as_str()),
            (true, false) => Some(self.falling_event.as_str()),
            _ => None,
        }
    }

    /// The most recently observed level.
    pub fn last_level(&self) -> bool {
        self.last_level
    }
}

/// Polls the configured binary sensors and publishes edge events.
pub struct SensorPoller<G: GpioInput> {
    gpio: G,
    sensors: Vec<BinarySensor>,
    pins: watch::Receiver<Option<PinAssignment>>,
    events: broadcast::Sender<SensorEvent>,
    interval: Duration,
}

impl<G: GpioInput> SensorPoller<G> {
    /// Create a poller with an empty sensor set.
    ///
    /// Sensors are installed once `pins` delivers the assignment from the
    /// registration coordinator.
    pub fn new(
        gpio: G,
        pins: watch::Receiver<Option<PinAssignment>>,
        events: broadcast::Sender<SensorEvent>,
        interval: Duration,
    ) -> Self {
        Self {
            gpio,
            sensors: Vec::new(),
            pins,
            events,
            interval,
        }
    }

    /// The currently installed sensors.
    pub fn sensors(&self) -> &[BinarySensor] {
        &self.sensors
    }

    /// Run the polling loop until the stop token flips.
    ///
    /// The stop token is checked once per iteration; an in-progress poll
    /// completes before the loop exits.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.install_pending_sensors();
                    self.poll_once();
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        info!("sensor poller stopped");
    }

    /// Install the IR sensors once a pin assignment is available.
    ///
    /// Idempotent: after the first installation this is a no-op.
    pub fn install_pending_sensors(&mut self) {
        if !self.sensors.is_empty() {
            return;
        }
        let assignment = *self.pins.borrow();
        if let Some(pins) = assignment {
            self.install(pins);
        }
    }

    /// Set up input GPIO and create the two IR sensors.
    ///
    /// GPIO setup failures are logged and ignored so that a missing
    /// hardware backend never takes the loop down.
    pub fn install(&mut self, pins: PinAssignment) {
        for pin in [pins.left_eye, pins.right_eye] {
            if let Err(err) = self.gpio.setup_input(pin) {
                warn!(pin, ?err, "failed to configure sensor input");
            }
        }
        self.sensors.push(BinarySensor::new(
            "left_ir_sensor",
            pins.left_eye,
            "leftEyeUncovered",
            "leftEyeCovered",
        ));
        self.sensors.push(BinarySensor::new(
            "right_ir_sensor",
            pins.right_eye,
            "rightEyeUncovered",
            "rightEyeCovered",
        ));
        info!(
            left = pins.left_eye,
            right = pins.right_eye,
            "binary sensors configured"
        );
    }

    /// Sample every sensor once, publishing any edge events.
    ///
    /// A failed read skips that sensor without touching its remembered
    /// level, so the edge is still detected on the next good read.
    pub fn poll_once(&mut self) {
        for sensor in &mut self.sensors {
            let level = match self.gpio.is_high(sensor.pin) {
                Ok(level) => level,
                Err(err) => {
                    warn!(sensor = %sensor.name, pin = sensor.pin, ?err, "sensor read failed");
                    continue;
                }
            };
            if let Some(event) = sensor.observe(level).map(str::to_owned) {
                debug!(sensor = %sensor.name, %event, "sensor edge");
                // Nobody listening is fine; events are fire-and-forget.
                let _ = self.events.send(SensorEvent::new(event));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockGpio;

    fn poller_with_sensors(
        gpio: MockGpio,
    ) -> (SensorPoller<MockGpio>, broadcast::Receiver<SensorEvent>) {
        let (_pins_tx, pins_rx) = watch::channel(Some(PinAssignment {
            left_eye: 3,
            right_eye: 4,
        }));
        let (events_tx, events_rx) = broadcast::channel(16);
        let mut poller = SensorPoller::new(gpio, pins_rx, events_tx, Duration::from_millis(200));
        poller.install_pending_sensors();
        (poller, events_rx)
    }

    fn drain(rx: &mut broadcast::Receiver<SensorEvent>) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.data);
        }
        events
    }

    #[test]
    fn edge_sequence_emits_rising_then_falling() {
        let mut sensor = BinarySensor::new("s", 3, "rising", "falling");
        let mut fired = Vec::new();
        for level in [false, false, true, true, false] {
            if let Some(event) = sensor.observe(level) {
                fired.push(event.to_string());
            }
        }
        assert_eq!(fired, vec!["rising".to_string(), "falling".to_string()]);
    }

    #[test]
    fn level_updated_even_without_event() {
        let mut sensor = BinarySensor::new("s", 3, "rising", "falling");
        sensor.observe(true);
        assert!(sensor.last_level());
        sensor.observe(true);
        assert!(sensor.last_level());
    }

    #[test]
    fn pin_assignment_creates_two_sensors_once() {
        let (mut poller, _rx) = poller_with_sensors(MockGpio::new());
        assert_eq!(poller.sensors().len(), 2);
        assert_eq!(poller.sensors()[0].pin, 3);
        assert_eq!(poller.sensors()[1].pin, 4);

        // A second delivery never duplicates the set.
        poller.install_pending_sensors();
        assert_eq!(poller.sensors().len(), 2);
    }

    #[test]
    fn poll_cycle_emits_edge_events() {
        let gpio = MockGpio::new();
        gpio.queue_levels(3, &[false, true, true, false]);
        let (mut poller, mut rx) = poller_with_sensors(gpio);

        for _ in 0..4 {
            poller.poll_once();
        }

        assert_eq!(
            drain(&mut rx),
            vec!["leftEyeUncovered".to_string(), "leftEyeCovered".to_string()]
        );
    }

    #[test]
    fn both_eyes_poll_independently() {
        let gpio = MockGpio::new();
        gpio.queue_levels(3, &[true]);
        gpio.queue_levels(4, &[true]);
        let (mut poller, mut rx) = poller_with_sensors(gpio);

        poller.poll_once();

        assert_eq!(
            drain(&mut rx),
            vec![
                "leftEyeUncovered".to_string(),
                "rightEyeUncovered".to_string()
            ]
        );
    }

    #[test]
    fn no_assignment_means_no_sensors() {
        let (_pins_tx, pins_rx) = watch::channel(None);
        let (events_tx, _events_rx) = broadcast::channel(16);
        let mut poller = SensorPoller::new(
            MockGpio::new(),
            pins_rx,
            events_tx,
            Duration::from_millis(200),
        );

        poller.install_pending_sensors();
        poller.poll_once();
        assert!(poller.sensors().is_empty());
    }

    #[test]
    fn gpio_inputs_configured_on_install() {
        let (poller, _rx) = poller_with_sensors(MockGpio::new());
        assert_eq!(poller.gpio.configured_inputs(), vec![3, 4]);
    }
}
