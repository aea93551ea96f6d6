//! Inbound command handling for motor control.
//!
//! Commands arrive as [`CommandMessage`]s over the local API. The
//! dispatcher validates the verb, translates it into a motor-bank call,
//! and absorbs every failure: unknown verbs are dropped silently (a remote
//! operator typo must not crash the rover) and hardware errors are logged.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use roverd::commands::CommandDispatcher;
//! use roverd::hal::MockPwm;
//! use roverd::messages::CommandMessage;
//! use roverd::motor::MotorBank;
//!
//! let bank = Arc::new(MotorBank::new(MockPwm::new(), 100.0));
//! let dispatcher = CommandDispatcher::new(Arc::clone(&bank));
//!
//! dispatcher.dispatch(&CommandMessage {
//!     command: "START_MOTOR".into(),
//!     pin: 9,
//!     speed: Some(50.0),
//! });
//!
//! assert_eq!(bank.state(9).unwrap().duty_cycle, 50.0);
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::messages::CommandMessage;
use crate::motor::{MotorAction, MotorBank};
use crate::traits::PwmController;

/// The set of motor commands the rover understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoverCommand {
    /// Start (or re-speed) a motor pin at the requested duty cycle.
    StartMotor,
    /// Stop a motor pin by setting its duty cycle to zero.
    StopMotor,
}

impl RoverCommand {
    /// Returns the command verb as it appears on the wire.
    ///
    /// # Examples
    ///
    /// ```
    /// use roverd::commands::RoverCommand;
    ///
    /// assert_eq!(RoverCommand::StartMotor.as_str(), "START_MOTOR");
    /// assert_eq!(RoverCommand::StopMotor.as_str(), "STOP_MOTOR");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RoverCommand::StartMotor => "START_MOTOR",
            RoverCommand::StopMotor => "STOP_MOTOR",
        }
    }

    /// Parse a command verb.
    ///
    /// Matching is exact; anything unknown is `None` and gets ignored by
    /// the dispatcher.
    ///
    /// # Examples
    ///
    /// ```
    /// use roverd::commands::RoverCommand;
    ///
    /// assert_eq!(RoverCommand::from_text("START_MOTOR"), Some(RoverCommand::StartMotor));
    /// assert_eq!(RoverCommand::from_text("FLY"), None);
    /// ```
    pub fn from_text(s: &str) -> Option<Self> {
        match s {
            "START_MOTOR" => Some(RoverCommand::StartMotor),
            "STOP_MOTOR" => Some(RoverCommand::StopMotor),
            _ => None,
        }
    }
}

/// Translates inbound command messages into motor actions.
///
/// Stateless apart from the shared motor bank; one dispatch call per
/// inbound message, executed synchronously to completion.
pub struct CommandDispatcher<P: PwmController> {
    motors: Arc<MotorBank<P>>,
}

impl<P: PwmController> Clone for CommandDispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            motors: Arc::clone(&self.motors),
        }
    }
}

impl<P: PwmController> CommandDispatcher<P> {
    /// Create a dispatcher driving the given motor bank.
    pub fn new(motors: Arc<MotorBank<P>>) -> Self {
        Self { motors }
    }

    /// Execute one command message.
    ///
    /// Returns the motor action taken, or `None` when the message was
    /// ignored (unknown verb, missing speed) or the hardware call failed.
    pub fn dispatch(&self, message: &CommandMessage) -> Option<MotorAction> {
        let command = match RoverCommand::from_text(&message.command) {
            Some(command) => command,
            None => {
                debug!(command = %message.command, "ignoring unknown command");
                return None;
            }
        };

        let speed = match command {
            RoverCommand::StartMotor => match message.speed {
                Some(speed) => speed,
                None => {
                    warn!(pin = message.pin, "START_MOTOR without a speed, ignoring");
                    return None;
                }
            },
            RoverCommand::StopMotor => 0.0,
        };

        match self.motors.set_speed(message.pin, speed) {
            Ok(action) => {
                info!(command = command.as_str(), pin = message.pin, speed, "motor command applied");
                Some(action)
            }
            Err(err) => {
                warn!(pin = message.pin, ?err, "motor command failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockPwm, PwmCall};

    fn dispatcher() -> (CommandDispatcher<MockPwm>, Arc<MotorBank<MockPwm>>) {
        let bank = Arc::new(MotorBank::new(MockPwm::new(), 100.0));
        (CommandDispatcher::new(Arc::clone(&bank)), bank)
    }

    fn msg(command: &str, pin: u16, speed: Option<f32>) -> CommandMessage {
        CommandMessage {
            command: command.into(),
            pin,
            speed,
        }
    }

    #[test]
    fn start_motor_sets_requested_speed() {
        let (dispatcher, bank) = dispatcher();
        let action = dispatcher.dispatch(&msg("START_MOTOR", 9, Some(50.0)));

        assert_eq!(action, Some(MotorAction::Started));
        assert_eq!(bank.state(9).unwrap().duty_cycle, 50.0);
    }

    #[test]
    fn stop_motor_sets_zero_speed() {
        let (dispatcher, bank) = dispatcher();
        dispatcher.dispatch(&msg("START_MOTOR", 9, Some(50.0)));
        let action = dispatcher.dispatch(&msg("STOP_MOTOR", 9, None));

        assert_eq!(action, Some(MotorAction::Updated));
        assert_eq!(
            bank.pwm().calls()[1],
            PwmCall::SetDutyCycle {
                pin: 9,
                duty_cycle: 0.0
            }
        );
    }

    #[test]
    fn unknown_command_is_ignored() {
        let (dispatcher, bank) = dispatcher();
        let action = dispatcher.dispatch(&msg("FLY", 9, Some(50.0)));

        assert_eq!(action, None);
        assert!(bank.pwm().calls().is_empty());
        assert_eq!(bank.state(9), None);
    }

    #[test]
    fn start_without_speed_is_ignored() {
        let (dispatcher, bank) = dispatcher();
        let action = dispatcher.dispatch(&msg("START_MOTOR", 9, None));

        assert_eq!(action, None);
        assert!(bank.pwm().calls().is_empty());
    }

    #[test]
    fn hardware_error_is_absorbed() {
        let (dispatcher, bank) = dispatcher();
        bank.pwm().set_failing(true);
        let action = dispatcher.dispatch(&msg("START_MOTOR", 9, Some(50.0)));
        assert_eq!(action, None);
    }

    #[test]
    fn stop_before_start_starts_at_zero() {
        // A STOP_MOTOR for a never-started pin still needs the hardware
        // start call first; the pin then runs at zero duty.
        let (dispatcher, bank) = dispatcher();
        let action = dispatcher.dispatch(&msg("STOP_MOTOR", 9, None));

        assert_eq!(action, Some(MotorAction::Started));
        assert_eq!(bank.state(9).unwrap().duty_cycle, 0.0);
    }
}
