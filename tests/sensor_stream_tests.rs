//! Integration tests for the sensor polling loop.
//!
//! These run the real loop against the mock GPIO, checking the late pin
//! handoff and the stop token.

use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::timeout;

use roverd::hal::MockGpio;
use roverd::messages::PinAssignment;
use roverd::sensors::SensorPoller;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn running_loop_emits_edges_and_honors_stop() {
    let gpio = MockGpio::new();
    gpio.queue_levels(2, &[false, true]);
    gpio.queue_levels(3, &[true]);

    let (_pins_tx, pins_rx) = watch::channel(Some(PinAssignment {
        left_eye: 2,
        right_eye: 3,
    }));
    let (events_tx, mut events_rx) = broadcast::channel(16);
    let (stop_tx, stop_rx) = watch::channel(false);

    let poller = SensorPoller::new(gpio, pins_rx, events_tx, Duration::from_millis(1));
    let handle = tokio::spawn(poller.run(stop_rx));

    // First poll: the right eye rises from the default low level.
    let first = timeout(WAIT, events_rx.recv()).await.unwrap().unwrap();
    assert_eq!(first.data, "rightEyeUncovered");

    // Second poll: the left eye rises; the right eye holds high silently.
    let second = timeout(WAIT, events_rx.recv()).await.unwrap().unwrap();
    assert_eq!(second.data, "leftEyeUncovered");

    stop_tx.send(true).unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap();
}

#[tokio::test]
async fn pins_arriving_late_still_install_the_sensors() {
    let gpio = MockGpio::new();
    gpio.queue_levels(5, &[true]);

    let (pins_tx, pins_rx) = watch::channel(None);
    let (events_tx, mut events_rx) = broadcast::channel(16);
    let (stop_tx, stop_rx) = watch::channel(false);

    let poller = SensorPoller::new(gpio, pins_rx, events_tx, Duration::from_millis(1));
    let handle = tokio::spawn(poller.run(stop_rx));

    // Until registration completes the loop has nothing to poll.
    pins_tx
        .send(Some(PinAssignment {
            left_eye: 5,
            right_eye: 6,
        }))
        .unwrap();

    let event = timeout(WAIT, events_rx.recv()).await.unwrap().unwrap();
    assert_eq!(event.data, "leftEyeUncovered");

    stop_tx.send(true).unwrap();
    timeout(WAIT, handle).await.unwrap().unwrap();
}
