//! Session manager: owns the single authenticated portal session.
//!
//! Every tool handler calls the portal through [`SessionManager::call`],
//! which supplies transparent re-authentication: on a session-expiry signal
//! the manager re-logs-in exactly once and retries the operation once. A
//! second expiry, or a failed re-login, surfaces as an auth error. No other
//! failure is ever retried.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::backend::{Args, PortalBackend};
use stratus_types::{AuthError, BackendError, Credentials, Operation, PortalError, SessionHandle};

pub struct SessionManager {
    backend: Arc<dyn PortalBackend>,
    credentials: Credentials,
    /// The live session, if any. Calls clone the handle out and proceed
    /// concurrently; only establishment and invalidation take the write lock.
    session: RwLock<Option<SessionHandle>>,
    /// Serializes login so racing callers perform one authentication.
    login_guard: Mutex<()>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn PortalBackend>, credentials: Credentials) -> Self {
        Self {
            backend,
            credentials,
            session: RwLock::new(None),
            login_guard: Mutex::new(()),
        }
    }

    /// Scope of the configured principal.
    pub fn scope(&self) -> stratus_types::Scope {
        self.credentials.scope
    }

    /// Return the live session, authenticating first if there is none.
    /// Idempotent when already authenticated.
    pub async fn ensure_session(&self) -> Result<SessionHandle, AuthError> {
        if let Some(handle) = self.session.read().await.clone() {
            return Ok(handle);
        }

        let _guard = self.login_guard.lock().await;
        // A racing caller may have logged in while we waited for the guard.
        if let Some(handle) = self.session.read().await.clone() {
            return Ok(handle);
        }

        let handle = self.backend.login(&self.credentials).await?;
        *self.session.write().await = Some(handle.clone());
        Ok(handle)
    }

    /// Drop the current session; the next `ensure_session` re-authenticates.
    pub async fn invalidate(&self) {
        *self.session.write().await = None;
    }

    /// Invalidate only if `stale` is still the live session. A concurrent
    /// caller may already have replaced it with a fresh one; that session
    /// must survive.
    async fn invalidate_if_current(&self, stale: &SessionHandle) {
        let mut session = self.session.write().await;
        if session.as_ref().is_some_and(|live| live.token == stale.token) {
            *session = None;
        }
    }

    /// Execute one portal operation through the current session, retrying
    /// exactly once after a session-expiry signal.
    pub async fn call(
        &self,
        operation: Operation,
        args: &Args,
    ) -> Result<serde_json::Value, PortalError> {
        let handle = self.ensure_session().await.map_err(PortalError::Auth)?;

        match self.backend.execute(&handle, operation, args).await {
            Ok(value) => Ok(value),
            Err(BackendError::SessionExpired) => {
                tracing::info!("Session expired; refreshing and retrying once");
                self.invalidate_if_current(&handle).await;
                let fresh = self.ensure_session().await.map_err(|e| {
                    PortalError::Auth(AuthError::RefreshFailed {
                        message: e.to_string(),
                    })
                })?;
                match self.backend.execute(&fresh, operation, args).await {
                    Ok(value) => Ok(value),
                    Err(BackendError::SessionExpired) => {
                        Err(PortalError::Auth(AuthError::RefreshFailed {
                            message: "session rejected again after refresh".into(),
                        }))
                    }
                    Err(other) => Err(PortalError::Backend(other)),
                }
            }
            Err(other) => Err(PortalError::Backend(other)),
        }
    }

    /// Best-effort logout of the live session.
    pub async fn shutdown(&self) {
        let handle = self.session.write().await.take();
        if let Some(handle) = handle {
            if let Err(e) = self.backend.logout(&handle).await {
                tracing::warn!("Logout failed: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use stratus_types::{Scope, Secret};

    fn test_credentials() -> Credentials {
        Credentials {
            host: "portal.test".into(),
            port: 443,
            user: "svc".into(),
            password: Secret::new("pw"),
            scope: Scope::User,
            tls: true,
        }
    }

    /// Stub portal that counts calls and reports expiry for a configured
    /// number of leading execute calls.
    struct StubPortal {
        logins: AtomicUsize,
        executes: AtomicUsize,
        expire_first: usize,
        fail_login_after_first: bool,
    }

    impl StubPortal {
        fn new(expire_first: usize) -> Self {
            Self {
                logins: AtomicUsize::new(0),
                executes: AtomicUsize::new(0),
                expire_first,
                fail_login_after_first: false,
            }
        }
    }

    impl PortalBackend for StubPortal {
        fn login<'a>(
            &'a self,
            credentials: &'a Credentials,
        ) -> BoxFuture<'a, Result<SessionHandle, AuthError>> {
            Box::pin(async move {
                let n = self.logins.fetch_add(1, Ordering::SeqCst);
                if self.fail_login_after_first && n > 0 {
                    return Err(AuthError::LoginFailed {
                        message: "credentials revoked".into(),
                    });
                }
                Ok(SessionHandle::new(format!("token-{n}"), credentials.scope))
            })
        }

        fn execute<'a>(
            &'a self,
            handle: &'a SessionHandle,
            _operation: Operation,
            _args: &'a Args,
        ) -> BoxFuture<'a, Result<serde_json::Value, BackendError>> {
            Box::pin(async move {
                let n = self.executes.fetch_add(1, Ordering::SeqCst);
                if n < self.expire_first {
                    return Err(BackendError::SessionExpired);
                }
                Ok(serde_json::json!({"token": handle.token}))
            })
        }

        fn logout<'a>(
            &'a self,
            _handle: &'a SessionHandle,
        ) -> BoxFuture<'a, Result<(), BackendError>> {
            Box::pin(async move { Ok(()) })
        }
    }

    fn manager(stub: StubPortal) -> (Arc<StubPortal>, SessionManager) {
        let stub = Arc::new(stub);
        let manager = SessionManager::new(stub.clone(), test_credentials());
        (stub, manager)
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent() {
        let (stub, manager) = manager(StubPortal::new(0));
        let first = manager.ensure_session().await.unwrap();
        let second = manager.ensure_session().await.unwrap();
        assert_eq!(first.token, second.token);
        assert_eq!(stub.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_reauthentication() {
        let (stub, manager) = manager(StubPortal::new(0));
        manager.ensure_session().await.unwrap();
        manager.invalidate().await;
        manager.ensure_session().await.unwrap();
        assert_eq!(stub.logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn call_retries_once_after_expiry() {
        let (stub, manager) = manager(StubPortal::new(1));
        let value = manager
            .call(Operation::CurrentSession, &Args::new())
            .await
            .unwrap();
        // The retry ran on a fresh token.
        assert_eq!(value["token"], "token-1");
        assert_eq!(stub.logins.load(Ordering::SeqCst), 2);
        assert_eq!(stub.executes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_expiry_is_an_auth_error() {
        let (stub, manager) = manager(StubPortal::new(2));
        let err = manager
            .call(Operation::CurrentSession, &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Auth(_)));
        assert_eq!(stub.executes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_login_is_an_auth_error() {
        let mut stub = StubPortal::new(usize::MAX);
        stub.fail_login_after_first = true;
        let (_, manager) = manager(stub);
        let err = manager
            .call(Operation::CurrentSession, &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PortalError::Auth(AuthError::RefreshFailed { .. })
        ));
    }

    #[tokio::test]
    async fn non_expiry_backend_errors_are_not_retried() {
        struct FailingPortal {
            executes: AtomicUsize,
        }
        impl PortalBackend for FailingPortal {
            fn login<'a>(
                &'a self,
                credentials: &'a Credentials,
            ) -> BoxFuture<'a, Result<SessionHandle, AuthError>> {
                Box::pin(async move { Ok(SessionHandle::new("t", credentials.scope)) })
            }
            fn execute<'a>(
                &'a self,
                _handle: &'a SessionHandle,
                _operation: Operation,
                _args: &'a Args,
            ) -> BoxFuture<'a, Result<serde_json::Value, BackendError>> {
                Box::pin(async move {
                    self.executes.fetch_add(1, Ordering::SeqCst);
                    Err(BackendError::Server {
                        status: 500,
                        message: "portal fell over".into(),
                    })
                })
            }
            fn logout<'a>(
                &'a self,
                _handle: &'a SessionHandle,
            ) -> BoxFuture<'a, Result<(), BackendError>> {
                Box::pin(async move { Ok(()) })
            }
        }

        let stub = Arc::new(FailingPortal {
            executes: AtomicUsize::new(0),
        });
        let manager = SessionManager::new(stub.clone(), test_credentials());
        let err = manager
            .call(Operation::CurrentSession, &Args::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Backend(BackendError::Server { .. })));
        assert_eq!(stub.executes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_login() {
        let (stub, manager) = manager(StubPortal::new(0));
        let manager = Arc::new(manager);

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.ensure_session().await.unwrap().token })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), "token-0");
        }
        assert_eq!(stub.logins.load(Ordering::SeqCst), 1);
    }
}
