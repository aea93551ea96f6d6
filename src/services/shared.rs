//! Shared state for the local HTTP service.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::commands::CommandDispatcher;
use crate::messages::SensorEvent;
use crate::motor::MotorBank;
use crate::storage::DiagramStore;
use crate::traits::PwmController;

/// Everything the route handlers need.
///
/// Cheap to clone; the motor bank is shared behind an `Arc` and the event
/// bus is a broadcast handle.
pub struct AppState<P: PwmController> {
    motors: Arc<MotorBank<P>>,
    dispatcher: CommandDispatcher<P>,
    events: broadcast::Sender<SensorEvent>,
    store: DiagramStore,
}

impl<P: PwmController> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            motors: Arc::clone(&self.motors),
            dispatcher: self.dispatcher.clone(),
            events: self.events.clone(),
            store: self.store.clone(),
        }
    }
}

impl<P: PwmController> AppState<P> {
    /// Assemble the service state.
    pub fn new(
        motors: Arc<MotorBank<P>>,
        events: broadcast::Sender<SensorEvent>,
        store: DiagramStore,
    ) -> Self {
        let dispatcher = CommandDispatcher::new(Arc::clone(&motors));
        Self {
            motors,
            dispatcher,
            events,
            store,
        }
    }

    /// The shared motor bank.
    pub fn motors(&self) -> &Arc<MotorBank<P>> {
        &self.motors
    }

    /// The motor command dispatcher.
    pub fn dispatcher(&self) -> &CommandDispatcher<P> {
        &self.dispatcher
    }

    /// Subscribe to the sensor event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<SensorEvent> {
        self.events.subscribe()
    }

    /// The block diagram store.
    pub fn store(&self) -> &DiagramStore {
        &self.store
    }
}
