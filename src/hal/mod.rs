//! Capability implementations.
//!
//! Concrete implementations of the traits defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `mock`: recording test doubles for desktop development and tests
//! - `soft`: logging no-ops used when no physical backend is wired up
//!
//! Selection happens at construction time in the binary; a real
//! hardware-backed implementation plugs in by implementing the same traits.

pub mod mock;
pub mod soft;

pub use mock::*;
pub use soft::*;
