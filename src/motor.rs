//! Per-pin motor PWM lifecycle tracking.
//!
//! Software-PWM backends require a `start` on first use of a pin and
//! `set_duty_cycle` on every change after that; two `start`s on the same
//! pin is a hardware error. [`MotorBank`] is the single authoritative owner
//! of that sequencing: it remembers which pins were started and routes each
//! speed request to the correct hardware call.
//!
//! One `MotorBank` is constructed at startup and handed out behind an
//! `Arc`; callers on different pins proceed independently, callers on the
//! same pin serialize.
//!
//! # Example
//!
//! ```rust
//! use roverd::hal::{MockPwm, PwmCall};
//! use roverd::motor::{MotorAction, MotorBank};
//!
//! let bank = MotorBank::new(MockPwm::new(), 100.0);
//!
//! // First command on a pin starts the PWM line.
//! assert_eq!(bank.set_speed(9, 50.0).unwrap(), MotorAction::Started);
//! // Every later command only updates the duty cycle, even for zero.
//! assert_eq!(bank.set_speed(9, 0.0).unwrap(), MotorAction::Updated);
//!
//! assert_eq!(bank.pwm().starts_for(9), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::traits::{PinId, PwmController};

/// Tracked PWM state for one motor pin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotorState {
    /// Whether the hardware `start` call has been issued for this pin.
    pub started: bool,
    /// Most recently applied duty cycle (percent).
    pub duty_cycle: f32,
}

/// Which hardware operation a `set_speed` call resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorAction {
    /// The pin was started for the first time.
    Started,
    /// An already-running pin had its duty cycle updated.
    Updated,
}

/// Tracks per-pin PWM lifecycle state and owns the PWM capability.
///
/// # Locking
///
/// The outer map lock is held only long enough to fetch or insert the
/// per-pin slot; the per-pin lock is held across the hardware call. Two
/// callers on different pins never wait on each other, and two callers on
/// the same pin never interleave the started-flag read-modify-write.
pub struct MotorBank<P: PwmController> {
    pwm: P,
    frequency_hz: f32,
    motors: Mutex<HashMap<PinId, Arc<Mutex<MotorState>>>>,
}

impl<P: PwmController> MotorBank<P> {
    /// Create a motor bank owning the given PWM capability.
    ///
    /// `frequency_hz` is used for every hardware `start` call.
    pub fn new(pwm: P, frequency_hz: f32) -> Self {
        Self {
            pwm,
            frequency_hz,
            motors: Mutex::new(HashMap::new()),
        }
    }

    /// Set the speed of a motor pin as a duty-cycle percentage.
    ///
    /// The first call for a pin issues a hardware `start`; all later calls
    /// issue duty-cycle updates only. A speed of `0.0` is an ordinary
    /// update; stopping a motor is setting its speed to zero, not a
    /// distinct hardware operation.
    ///
    /// On a hardware error the pin's tracked state is left untouched, so a
    /// failed `start` is retried by the next command.
    pub fn set_speed(&self, pin: PinId, speed: f32) -> Result<MotorAction, P::Error> {
        let slot = {
            let mut motors = self.motors.lock().unwrap();
            Arc::clone(motors.entry(pin).or_default())
        };

        let mut state = slot.lock().unwrap();
        if state.started {
            self.pwm.set_duty_cycle(pin, speed)?;
            state.duty_cycle = speed;
            Ok(MotorAction::Updated)
        } else {
            self.pwm.start(pin, speed, self.frequency_hz)?;
            state.started = true;
            state.duty_cycle = speed;
            Ok(MotorAction::Started)
        }
    }

    /// Snapshot of a pin's tracked state, if any command ever touched it.
    pub fn state(&self, pin: PinId) -> Option<MotorState> {
        let slot = self.motors.lock().unwrap().get(&pin).cloned()?;
        let state = *slot.lock().unwrap();
        Some(state)
    }

    /// Access the underlying PWM capability.
    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
