//! Trait definitions for hardware capabilities and the remote registry.
//!
//! This module defines the abstractions that let roverd:
//! - Drive motors and read sensors on real hardware or test doubles
//! - Talk to the remote rover registry or a scripted mock
//!
//! # Submodules
//!
//! - `hardware`: PWM output and digital input capabilities
//! - `network`: remote registry client seam
//!
//! # Hardware Abstraction
//!
//! The hardware traits are:
//!
//! - [`PwmController`]: software-PWM motor output
//! - [`GpioInput`]: digital level reads for binary sensors
//!
//! # Network Abstraction
//!
//! [`RoverRegistry`] covers login, lookup, register, and check-in against
//! the remote controller.

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
