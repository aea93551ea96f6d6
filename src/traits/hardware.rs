//! Hardware abstraction traits for PWM motor outputs and digital sensor inputs.
//!
//! This module defines the capability interfaces that let roverd drive real
//! rover hardware or run entirely on test doubles.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`PwmController`] | Software-PWM motor output, one owner per process |
//! | [`GpioInput`] | Digital level reads for binary sensors |
//!
//! # Implementation
//!
//! For testing and desktop development, use the recording mocks from
//! [`crate::hal::mock`]. When no physical backend is wired up, the logging
//! doubles from [`crate::hal::soft`] keep the coordination logic runnable.
//!
//! # Example
//!
//! ```rust
//! use roverd::hal::MockPwm;
//! use roverd::traits::PwmController;
//!
//! let pwm = MockPwm::new();
//! pwm.start(3, 50.0, 100.0).unwrap();
//! pwm.set_duty_cycle(3, 25.0).unwrap();
//!
//! assert_eq!(pwm.calls().len(), 2);
//! ```

/// Identifier for a physical hardware pin.
///
/// Pin numbers come from the remote controller's registration response
/// (sensor pins) or from inbound command messages (motor pins).
pub type PinId = u16;

/// PWM output capability for motor control.
///
/// Implementations own the physical PWM peripheral and are shared behind an
/// `Arc` by whoever needs to drive motors, so the methods take `&self` and
/// implementations handle their own interior synchronization.
///
/// # Start/update discipline
///
/// Software-PWM backends distinguish between starting a pin and updating an
/// already-running pin; issuing `start` twice on the same pin is a hardware
/// error on some platforms. Callers must issue `start` exactly once per pin
/// and `set_duty_cycle` thereafter; [`MotorBank`](crate::motor::MotorBank)
/// enforces this.
///
/// Duty cycles are percentages in the `0.0..=100.0` range and are passed
/// through to the backend unmodified.
pub trait PwmController {
    /// Error type for PWM operations.
    type Error: core::fmt::Debug;

    /// Begin PWM output on a pin at the given duty cycle and frequency.
    ///
    /// Must be called at most once per pin for the process lifetime.
    fn start(&self, pin: PinId, duty_cycle: f32, frequency_hz: f32) -> Result<(), Self::Error>;

    /// Change the duty cycle of a pin that `start` was already issued for.
    fn set_duty_cycle(&self, pin: PinId, duty_cycle: f32) -> Result<(), Self::Error>;
}

/// Digital input capability for binary sensors.
///
/// Reads are assumed non-blocking; the sensor poller calls [`is_high`]
/// sequentially for each configured pin on every tick.
///
/// [`is_high`]: GpioInput::is_high
pub trait GpioInput {
    /// Error type for GPIO operations.
    type Error: core::fmt::Debug;

    /// Configure a pin as a digital input.
    ///
    /// Called once per sensor pin when the registration response delivers
    /// the pin assignment.
    fn setup_input(&self, pin: PinId) -> Result<(), Self::Error>;

    /// Read the current digital level of a pin (true = high).
    fn is_high(&self, pin: PinId) -> Result<bool, Self::Error>;
}
