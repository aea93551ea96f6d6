//! # roverd
//!
//! A rover runtime service: registers the rover with a remote controller,
//! streams binary sensor events, and drives motor pins over software PWM.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for PWM output and GPIO input, with mocks for testing
//! - **Remote registration**: Login, register, and heartbeat loops against the controller
//! - **Sensor events**: Edge-triggered eye-sensor events fanned out over SSE
//! - **Motor lifecycle**: Each pin's PWM channel is started once, then duty-cycle updated
//! - **Block diagrams**: Saved visual programs with list/save/fetch/upload routes
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware or
//! a live controller:
//!
//! - `traits` - Hardware and network abstractions
//! - `hal` - Concrete implementations (mock for testing, soft no-op fallback)
//! - `motor` - Per-pin PWM state tracking
//! - `sensors` - Binary sensor polling and edge events
//! - `session` / `registration` - Controller session and heartbeat state machine
//! - `services` - The local axum API
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use roverd::commands::CommandDispatcher;
//! use roverd::hal::MockPwm;
//! use roverd::messages::CommandMessage;
//! use roverd::motor::MotorBank;
//!
//! // Create a motor bank with a mock PWM backend
//! let bank = Arc::new(MotorBank::new(MockPwm::new(), 100.0));
//! let dispatcher = CommandDispatcher::new(Arc::clone(&bank));
//!
//! // Dispatch a command the way the HTTP endpoint would
//! dispatcher.dispatch(&CommandMessage {
//!     command: "START_MOTOR".into(),
//!     pin: 9,
//!     speed: Some(50.0),
//! });
//!
//! assert!(bank.state(9).unwrap().started);
//! ```

#![warn(missing_docs)]

/// Motor command parsing and dispatch.
pub mod commands;
/// Environment-driven configuration.
pub mod config;
/// Hardware abstraction layer with mock and soft implementations.
pub mod hal;
/// Wire types shared between the controller protocol and the local API.
pub mod messages;
/// Per-pin PWM motor state tracking.
pub mod motor;
/// Registration and heartbeat state machine.
pub mod registration;
/// Binary sensor polling and edge events.
pub mod sensors;
/// Local HTTP API (axum).
pub mod services;
/// HTTP session against the remote controller.
pub mod session;
/// Block diagram storage.
pub mod storage;
/// Core traits for hardware and network abstraction.
pub mod traits;

pub use commands::{CommandDispatcher, RoverCommand};
pub use config::{Config, ControllerConfig, RoverConfig, WebConfig};
pub use messages::{CommandMessage, PinAssignment, RoverRecord, SensorEvent};
pub use motor::{MotorAction, MotorBank, MotorState};
pub use registration::{RegistrationCoordinator, RegistrationPhase, RoverIdentity};
pub use sensors::{BinarySensor, SensorPoller};
pub use session::{SessionClient, SessionError};
pub use traits::{GpioInput, PinId, PwmController, RoverRegistry};
