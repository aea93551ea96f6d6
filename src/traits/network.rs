//! Network abstraction for the remote rover registry.
//!
//! The rover keeps its identity synchronized with a remote controller over
//! HTTP. [`RoverRegistry`] is the seam between the registration state
//! machine and the wire: production code uses
//! [`SessionClient`](crate::session::SessionClient) (reqwest, session
//! cookies, CSRF rotation), tests use
//! [`MockRegistry`](crate::hal::mock::MockRegistry) with scripted outcomes.
//!
//! # Protocol
//!
//! ```text
//! GET  {login_url}/            - probe, may set csrftoken cookie
//! POST {login_url}/            - credentials + csrfmiddlewaretoken
//! GET  {registry_url}?name=X   - lookup existing registration by name
//! POST {registry_url}/         - register, returns id + sensor pins
//! PUT  {registry_url}/{id}/    - periodic check-in; non-2xx = forgotten
//! ```

use std::future::Future;

use crate::messages::RoverRecord;
use crate::registration::RoverIdentity;

/// Client-side view of the remote rover registry.
///
/// All operations absorb protocol-level disappointments into their return
/// values: a malformed or empty response is `Ok(None)` (the caller retries
/// next cycle), a rejected check-in is `Ok(false)`. Only transport failures
/// surface as `Err`, and the registration loop treats those the same way:
/// logged and retried, never fatal.
pub trait RoverRegistry {
    /// Error type for transport failures.
    type Error: core::fmt::Display;

    /// Authenticate the session with the remote controller.
    ///
    /// Bad credentials do not produce an error here; the subsequent
    /// registry calls simply never succeed.
    fn login(&mut self) -> impl Future<Output = Result<(), Self::Error>>;

    /// Look up an existing registration by rover name.
    ///
    /// Returns `Ok(None)` when the controller does not know the name or the
    /// response is missing the expected keys.
    fn lookup(
        &mut self,
        name: &str,
    ) -> impl Future<Output = Result<Option<RoverRecord>, Self::Error>>;

    /// Register this rover, returning the assigned record on success.
    ///
    /// Returns `Ok(None)` when the response cannot be parsed.
    fn register(
        &mut self,
        identity: &RoverIdentity,
    ) -> impl Future<Output = Result<Option<RoverRecord>, Self::Error>>;

    /// Check in with the controller under a previously assigned id.
    ///
    /// Returns `Ok(false)` when the controller answered with anything other
    /// than 200/201, meaning it has forgotten this rover.
    fn checkin(
        &mut self,
        id: &str,
        identity: &RoverIdentity,
    ) -> impl Future<Output = Result<bool, Self::Error>>;
}
