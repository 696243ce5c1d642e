//! The backend seam: everything the session manager needs from the portal.
//!
//! The production implementation is [`crate::PortalClient`]; tests substitute
//! call-counting stubs. Methods return boxed futures so the trait stays
//! object-safe behind `Arc<dyn PortalBackend>`.

use std::future::Future;
use std::pin::Pin;

use stratus_types::{AuthError, BackendError, Credentials, Operation, SessionHandle};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Validated tool arguments, keyed by parameter name.
pub type Args = serde_json::Map<String, serde_json::Value>;

/// An opaque, authenticated HTTP service with endpoints for identity
/// lookup and file management.
pub trait PortalBackend: Send + Sync {
    /// Authenticate and return a fresh session handle.
    fn login<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<SessionHandle, AuthError>>;

    /// Execute one operation through an established session.
    ///
    /// A rejected session token surfaces as [`BackendError::SessionExpired`];
    /// that is the only error the caller may retry.
    fn execute<'a>(
        &'a self,
        handle: &'a SessionHandle,
        operation: Operation,
        args: &'a Args,
    ) -> BoxFuture<'a, Result<serde_json::Value, BackendError>>;

    /// Tear down a session. Best-effort; failures are logged, not surfaced.
    fn logout<'a>(&'a self, handle: &'a SessionHandle) -> BoxFuture<'a, Result<(), BackendError>>;
}
