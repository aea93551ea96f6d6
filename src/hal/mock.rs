//! Mock implementations for testing without hardware or a remote controller.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockPwm`] | [`PwmController`] | Records every start/duty-cycle call |
//! | [`MockGpio`] | [`GpioInput`] | Scripted level sequences per pin |
//! | [`MockRegistry`] | [`RoverRegistry`] | Scripted registry responses |
//!
//! # Example
//!
//! ```rust
//! use roverd::hal::{MockPwm, PwmCall};
//! use roverd::traits::PwmController;
//!
//! let pwm = MockPwm::new();
//! pwm.start(9, 50.0, 100.0).unwrap();
//!
//! assert_eq!(
//!     pwm.calls(),
//!     vec![PwmCall::Start { pin: 9, duty_cycle: 50.0, frequency_hz: 100.0 }]
//! );
//! ```
//!
//! [`PwmController`]: crate::traits::PwmController
//! [`GpioInput`]: crate::traits::GpioInput
//! [`RoverRegistry`]: crate::traits::RoverRegistry

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::messages::RoverRecord;
use crate::registration::RoverIdentity;
use crate::traits::{GpioInput, PinId, PwmController, RoverRegistry};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// A single recorded PWM operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PwmCall {
    /// A hardware `start` call.
    Start {
        /// Target pin.
        pin: PinId,
        /// Requested duty cycle (percent).
        duty_cycle: f32,
        /// Requested PWM frequency.
        frequency_hz: f32,
    },
    /// A hardware duty-cycle update on an already-started pin.
    SetDutyCycle {
        /// Target pin.
        pin: PinId,
        /// Requested duty cycle (percent).
        duty_cycle: f32,
    },
}

impl PwmCall {
    /// The pin this call targeted.
    pub fn pin(&self) -> PinId {
        match self {
            PwmCall::Start { pin, .. } | PwmCall::SetDutyCycle { pin, .. } => *pin,
        }
    }
}

/// Mock PWM controller that records every hardware call.
///
/// Interior mutability matches the `&self` contract of
/// [`PwmController`](crate::traits::PwmController); the call log can be
/// inspected from any thread.
#[derive(Debug, Default)]
pub struct MockPwm {
    calls: Mutex<Vec<PwmCall>>,
    failing: Mutex<bool>,
}

impl MockPwm {
    /// Creates a new mock PWM controller with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent calls fail, simulating an unavailable peripheral.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Snapshot of every call issued so far, in order.
    pub fn calls(&self) -> Vec<PwmCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `start` calls issued for a pin.
    pub fn starts_for(&self, pin: PinId) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, PwmCall::Start { pin: p, .. } if *p == pin))
            .count()
    }

    /// The duty cycle of the most recent call targeting a pin, if any.
    pub fn last_duty_cycle(&self, pin: PinId) -> Option<f32> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c.pin() == pin)
            .map(|c| match c {
                PwmCall::Start { duty_cycle, .. } | PwmCall::SetDutyCycle { duty_cycle, .. } => {
                    *duty_cycle
                }
            })
    }

    fn record(&self, call: PwmCall) -> Result<(), MockPwmError> {
        if *self.failing.lock().unwrap() {
            return Err(MockPwmError);
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

/// Error emitted by a failing [`MockPwm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPwmError;

impl PwmController for MockPwm {
    type Error = MockPwmError;

    fn start(&self, pin: PinId, duty_cycle: f32, frequency_hz: f32) -> Result<(), MockPwmError> {
        self.record(PwmCall::Start {
            pin,
            duty_cycle,
            frequency_hz,
        })
    }

    fn set_duty_cycle(&self, pin: PinId, duty_cycle: f32) -> Result<(), MockPwmError> {
        self.record(PwmCall::SetDutyCycle { pin, duty_cycle })
    }
}

/// Mock GPIO input with scripted level sequences.
///
/// Queue levels per pin; each [`is_high`] read pops the next scripted level.
/// Once a pin's script runs out the line holds its last value, like a real
/// steady input would.
///
/// # Example
///
/// ```rust
/// use roverd::hal::MockGpio;
/// use roverd::traits::GpioInput;
///
/// let gpio = MockGpio::new();
/// gpio.queue_levels(3, &[false, true]);
///
/// assert!(!gpio.is_high(3).unwrap());
/// assert!(gpio.is_high(3).unwrap());
/// assert!(gpio.is_high(3).unwrap()); // holds last value
/// ```
///
/// [`is_high`]: crate::traits::GpioInput::is_high
#[derive(Debug, Default)]
pub struct MockGpio {
    scripts: Mutex<HashMap<PinId, VecDeque<bool>>>,
    held: Mutex<HashMap<PinId, bool>>,
    inputs: Mutex<Vec<PinId>>,
}

impl MockGpio {
    /// Creates a new mock GPIO with no scripted levels (all pins read low).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a sequence of levels for a pin.
    pub fn queue_levels(&self, pin: PinId, levels: &[bool]) {
        self.scripts
            .lock()
            .unwrap()
            .entry(pin)
            .or_default()
            .extend(levels.iter().copied());
    }

    /// Pins that were configured as inputs, in setup order.
    pub fn configured_inputs(&self) -> Vec<PinId> {
        self.inputs.lock().unwrap().clone()
    }
}

impl GpioInput for MockGpio {
    type Error = ();

    fn setup_input(&self, pin: PinId) -> Result<(), ()> {
        self.inputs.lock().unwrap().push(pin);
        Ok(())
    }

    fn is_high(&self, pin: PinId) -> Result<bool, ()> {
        let mut scripts = self.scripts.lock().unwrap();
        let mut held = self.held.lock().unwrap();
        if let Some(level) = scripts.get_mut(&pin).and_then(|q| q.pop_front()) {
            held.insert(pin, level);
            Ok(level)
        } else {
            Ok(held.get(&pin).copied().unwrap_or(false))
        }
    }
}

// ============================================================================
// Registry Mock
// ============================================================================

/// Mock rover registry with scripted responses.
///
/// Each operation pops the next scripted response for that call, falling
/// back to a benign default (`lookup`/`register` unknown, `checkin`
/// accepted). Call counters and the check-in id log allow asserting on the
/// coordinator's behavior.
#[derive(Debug, Default)]
pub struct MockRegistry {
    /// Scripted `lookup` responses, popped front first.
    pub lookup_responses: VecDeque<Result<Option<RoverRecord>, String>>,
    /// Scripted `register` responses, popped front first.
    pub register_responses: VecDeque<Result<Option<RoverRecord>, String>>,
    /// Scripted `checkin` responses, popped front first.
    pub checkin_responses: VecDeque<Result<bool, String>>,
    /// Number of `login` calls observed.
    pub login_calls: usize,
    /// Number of `lookup` calls observed.
    pub lookup_calls: usize,
    /// Number of `register` calls observed.
    pub register_calls: usize,
    /// Ids presented on each `checkin` call, in order.
    pub checkin_ids: Vec<String>,
}

impl MockRegistry {
    /// Creates a mock registry with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next `lookup` to return the given record.
    pub fn queue_lookup(&mut self, record: Option<RoverRecord>) {
        self.lookup_responses.push_back(Ok(record));
    }

    /// Script the next `register` to return the given record.
    pub fn queue_register(&mut self, record: Option<RoverRecord>) {
        self.register_responses.push_back(Ok(record));
    }

    /// Script the next `checkin` outcome (`false` = forgotten).
    pub fn queue_checkin(&mut self, accepted: bool) {
        self.checkin_responses.push_back(Ok(accepted));
    }

    /// Script the next `checkin` to fail at the transport level.
    pub fn queue_checkin_error(&mut self, message: impl Into<String>) {
        self.checkin_responses.push_back(Err(message.into()));
    }
}

impl RoverRegistry for MockRegistry {
    type Error = String;

    async fn login(&mut self) -> Result<(), String> {
        self.login_calls += 1;
        Ok(())
    }

    async fn lookup(&mut self, _name: &str) -> Result<Option<RoverRecord>, String> {
        self.lookup_calls += 1;
        self.lookup_responses.pop_front().unwrap_or(Ok(None))
    }

    async fn register(&mut self, _identity: &RoverIdentity) -> Result<Option<RoverRecord>, String> {
        self.register_calls += 1;
        self.register_responses.pop_front().unwrap_or(Ok(None))
    }

    async fn checkin(&mut self, id: &str, _identity: &RoverIdentity) -> Result<bool, String> {
        self.checkin_ids.push(id.to_string());
        self.checkin_responses.pop_front().unwrap_or(Ok(true))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // MockPwm Tests
    // =========================================================================

    #[test]
    fn mock_pwm_records_calls_in_order() {
        let pwm = MockPwm::new();
        pwm.start(9, 50.0, 100.0).unwrap();
        pwm.set_duty_cycle(9, 25.0).unwrap();

        let calls = pwm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0],
            PwmCall::Start {
                pin: 9,
                duty_cycle: 50.0,
                frequency_hz: 100.0
            }
        );
        assert_eq!(
            calls[1],
            PwmCall::SetDutyCycle {
                pin: 9,
                duty_cycle: 25.0
            }
        );
    }

    #[test]
    fn mock_pwm_starts_for_counts_per_pin() {
        let pwm = MockPwm::new();
        pwm.start(1, 10.0, 100.0).unwrap();
        pwm.start(2, 20.0, 100.0).unwrap();
        pwm.set_duty_cycle(1, 30.0).unwrap();

        assert_eq!(pwm.starts_for(1), 1);
        assert_eq!(pwm.starts_for(2), 1);
        assert_eq!(pwm.starts_for(3), 0);
    }

    #[test]
    fn mock_pwm_last_duty_cycle() {
        let pwm = MockPwm::new();
        assert_eq!(pwm.last_duty_cycle(1), None);

        pwm.start(1, 10.0, 100.0).unwrap();
        pwm.set_duty_cycle(1, 42.0).unwrap();
        assert_eq!(pwm.last_duty_cycle(1), Some(42.0));
    }

    #[test]
    fn mock_pwm_failing() {
        let pwm = MockPwm::new();
        pwm.set_failing(true);
        assert!(pwm.start(1, 10.0, 100.0).is_err());
        assert!(pwm.calls().is_empty());

        pwm.set_failing(false);
        assert!(pwm.start(1, 10.0, 100.0).is_ok());
    }

    // =========================================================================
    // MockGpio Tests
    // =========================================================================

    #[test]
    fn mock_gpio_defaults_low() {
        let gpio = MockGpio::new();
        assert!(!gpio.is_high(5).unwrap());
    }

    #[test]
    fn mock_gpio_scripted_sequence_then_holds() {
        let gpio = MockGpio::new();
        gpio.queue_levels(5, &[true, false]);

        assert!(gpio.is_high(5).unwrap());
        assert!(!gpio.is_high(5).unwrap());
        assert!(!gpio.is_high(5).unwrap()); // holds last
    }

    #[test]
    fn mock_gpio_scripts_are_per_pin() {
        let gpio = MockGpio::new();
        gpio.queue_levels(1, &[true]);
        gpio.queue_levels(2, &[false]);

        assert!(gpio.is_high(1).unwrap());
        assert!(!gpio.is_high(2).unwrap());
    }

    #[test]
    fn mock_gpio_tracks_input_setup() {
        let gpio = MockGpio::new();
        gpio.setup_input(3).unwrap();
        gpio.setup_input(4).unwrap();
        assert_eq!(gpio.configured_inputs(), vec![3, 4]);
    }

    // =========================================================================
    // MockRegistry Tests
    // =========================================================================

    #[tokio::test]
    async fn mock_registry_defaults() {
        let mut registry = MockRegistry::new();
        let identity = RoverIdentity::new("rover", "10.0.0.1");

        assert!(registry.login().await.is_ok());
        assert_eq!(registry.lookup("rover").await.unwrap(), None);
        assert_eq!(registry.register(&identity).await.unwrap(), None);
        assert!(registry.checkin("7", &identity).await.unwrap());

        assert_eq!(registry.login_calls, 1);
        assert_eq!(registry.lookup_calls, 1);
        assert_eq!(registry.register_calls, 1);
        assert_eq!(registry.checkin_ids, vec!["7".to_string()]);
    }

    #[tokio::test]
    async fn mock_registry_scripted_responses() {
        let mut registry = MockRegistry::new();
        registry.queue_checkin(false);
        registry.queue_checkin_error("connection refused");

        let identity = RoverIdentity::new("rover", "10.0.0.1");
        assert!(!registry.checkin("7", &identity).await.unwrap());
        assert!(registry.checkin("7", &identity).await.is_err());
        // Defaults to accepted once the script runs out.
        assert!(registry.checkin("7", &identity).await.unwrap());
    }
}
