//! Logging no-op capability doubles.
//!
//! Used when the process runs without a physical GPIO/PWM backend (desktop
//! development, CI, or a board where the hardware library is unavailable).
//! Every hardware call is logged instead of executed, so the coordination
//! logic stays fully exercisable.

use std::convert::Infallible;

use tracing::{debug, warn};

use crate::traits::{GpioInput, PinId, PwmController};

/// No-op PWM controller that logs every call.
#[derive(Debug, Default)]
pub struct SoftPwm;

impl SoftPwm {
    /// Creates a soft PWM controller, warning that no hardware is attached.
    pub fn new() -> Self {
        warn!("no PWM backend available; motor commands will be logged only");
        Self
    }
}

impl PwmController for SoftPwm {
    type Error = Infallible;

    fn start(&self, pin: PinId, duty_cycle: f32, frequency_hz: f32) -> Result<(), Infallible> {
        debug!(pin, duty_cycle, frequency_hz, "soft pwm start");
        Ok(())
    }

    fn set_duty_cycle(&self, pin: PinId, duty_cycle: f32) -> Result<(), Infallible> {
        debug!(pin, duty_cycle, "soft pwm duty cycle");
        Ok(())
    }
}

/// No-op GPIO input whose pins always read low.
#[derive(Debug, Default)]
pub struct SoftGpio;

impl SoftGpio {
    /// Creates a soft GPIO input, warning that no hardware is attached.
    pub fn new() -> Self {
        warn!("no GPIO backend available; sensor pins will always read low");
        Self
    }
}

impl GpioInput for SoftGpio {
    type Error = Infallible;

    fn setup_input(&self, pin: PinId) -> Result<(), Infallible> {
        debug!(pin, "soft gpio input setup");
        Ok(())
    }

    fn is_high(&self, _pin: PinId) -> Result<bool, Infallible> {
        Ok(false)
    }
}
