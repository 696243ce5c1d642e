//! HTTP client for the portal's management REST API.
//!
//! The portal is treated as an opaque authenticated service; this module is
//! the single place that knows its URL layout. Every operation resolves to
//! one request via [`route`], so the endpoint mapping is testable without a
//! network.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::backend::{Args, BoxFuture, PortalBackend};
use stratus_types::{AuthError, BackendError, Credentials, Operation, SessionHandle};

/// Header carrying the opaque session token on authenticated requests.
const SESSION_HEADER: &str = "x-portal-session";

/// Client for the portal management API.
#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PortalClient {
    /// Build a client for the portal named in `credentials`.
    pub fn new(credentials: &Credentials, timeout_ms: u64) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(!credentials.tls)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: credentials.base_url(),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    async fn send(
        &self,
        route: Route,
        token: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let url = format!("{}{}", self.base_url, route.path);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            headers.insert(
                SESSION_HEADER,
                HeaderValue::from_str(token)
                    .map_err(|_| BackendError::Protocol("invalid session token".into()))?,
            );
        }

        tracing::debug!("{} {url}", route.method);
        let mut request = self
            .http
            .request(route.method.clone(), &url)
            .headers(headers)
            .timeout(self.timeout);
        if !route.query.is_empty() {
            request = request.query(&route.query);
        }
        if let Some(body) = &route.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status.is_success() {
            if body.is_empty() {
                return Ok(serde_json::Value::Null);
            }
            serde_json::from_str(&body)
                .map_err(|e| BackendError::Protocol(format!("malformed response body: {e}")))
        } else {
            Err(classify_error(status.as_u16(), &body))
        }
    }
}

impl PortalBackend for PortalClient {
    fn login<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<SessionHandle, AuthError>> {
        Box::pin(async move {
            let route = Route {
                method: Method::POST,
                path: "/api/login".into(),
                query: Vec::new(),
                body: Some(serde_json::json!({
                    "user": credentials.user,
                    "password": credentials.password.expose(),
                })),
            };

            let body = self.send(route, None).await.map_err(login_failure)?;

            let token = body
                .get("session")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AuthError::LoginFailed {
                    message: "login response carried no session token".into(),
                })?;

            tracing::info!("Authenticated against {}", self.base_url);
            Ok(SessionHandle::new(token, credentials.scope))
        })
    }

    fn execute<'a>(
        &'a self,
        handle: &'a SessionHandle,
        operation: Operation,
        args: &'a Args,
    ) -> BoxFuture<'a, Result<serde_json::Value, BackendError>> {
        Box::pin(async move {
            let route = route(operation, args)?;
            self.send(route, Some(&handle.token)).await
        })
    }

    fn logout<'a>(&'a self, handle: &'a SessionHandle) -> BoxFuture<'a, Result<(), BackendError>> {
        Box::pin(async move {
            let route = Route {
                method: Method::POST,
                path: "/api/logout".into(),
                query: Vec::new(),
                body: None,
            };
            self.send(route, Some(&handle.token)).await.map(|_| ())
        })
    }
}

/// One concrete REST request.
#[derive(Debug)]
struct Route {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

/// Map an operation plus validated arguments to its REST request.
fn route(operation: Operation, args: &Args) -> Result<Route, BackendError> {
    let get = |path: &str, query: Vec<(String, String)>| Route {
        method: Method::GET,
        path: path.into(),
        query,
        body: None,
    };
    let post = |path: &str, body: serde_json::Value| Route {
        method: Method::POST,
        path: path.into(),
        query: Vec::new(),
        body: Some(body),
    };

    let route = match operation {
        Operation::CurrentSession => get("/api/currentSession", Vec::new()),
        Operation::ListDir => get(
            "/api/files/list",
            vec![
                ("path".into(), str_arg(args, "path")?.into()),
                (
                    "include_deleted".into(),
                    bool_arg(args, "include_deleted")?.to_string(),
                ),
            ],
        ),
        Operation::WalkTree => get(
            "/api/files/walk",
            vec![
                ("path".into(), str_arg(args, "path")?.into()),
                (
                    "include_deleted".into(),
                    bool_arg(args, "include_deleted")?.to_string(),
                ),
            ],
        ),
        Operation::CreateDir => post(
            "/api/files/mkdir",
            serde_json::json!({"path": str_arg(args, "path")?}),
        ),
        Operation::CreateDirs => post(
            "/api/files/makedirs",
            serde_json::json!({"path": str_arg(args, "path")?}),
        ),
        Operation::Copy => post(
            "/api/files/copy",
            serde_json::json!({
                "source": str_arg(args, "source")?,
                "destination": str_arg(args, "destination")?,
            }),
        ),
        Operation::Move => post(
            "/api/files/move",
            serde_json::json!({
                "source": str_arg(args, "source")?,
                "destination": str_arg(args, "destination")?,
            }),
        ),
        Operation::Rename => post(
            "/api/files/rename",
            serde_json::json!({
                "path": str_arg(args, "path")?,
                "new_name": str_arg(args, "new_name")?,
            }),
        ),
        Operation::Delete => post(
            "/api/files/delete",
            serde_json::json!({"paths": list_arg(args, "paths")?}),
        ),
        Operation::Recover => post(
            "/api/files/undelete",
            serde_json::json!({"paths": list_arg(args, "paths")?}),
        ),
        Operation::ListVersions => get(
            "/api/files/versions",
            vec![("path".into(), str_arg(args, "path")?.into())],
        ),
        Operation::PublicLink => post(
            "/api/files/public-link",
            serde_json::json!({
                "path": str_arg(args, "path")?,
                "access": str_arg(args, "access")?,
                "expire_in": int_arg(args, "expire_in")?,
            }),
        ),
        Operation::Permalink => get(
            "/api/files/permalink",
            vec![("path".into(), str_arg(args, "path")?.into())],
        ),
        Operation::ReadFile => get(
            "/api/files/content",
            vec![("path".into(), str_arg(args, "path")?.into())],
        ),
        Operation::WriteFile => post(
            "/api/files/content",
            serde_json::json!({
                "path": str_arg(args, "path")?,
                "content": str_arg(args, "content")?,
            }),
        ),
        Operation::BrowseTenant => post(
            "/api/portals/browse",
            serde_json::json!({"tenant": str_arg(args, "tenant")?}),
        ),
        Operation::BrowseGlobalAdmin => post("/api/portals/browse-global", serde_json::json!({})),
    };
    Ok(route)
}

// Argument accessors. The dispatcher validated the arguments against the
// tool's schema, so a miss here is a protocol bug, not a user error.

fn str_arg<'a>(args: &'a Args, name: &str) -> Result<&'a str, BackendError> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| BackendError::Protocol(format!("argument '{name}' missing after validation")))
}

fn bool_arg(args: &Args, name: &str) -> Result<bool, BackendError> {
    args.get(name)
        .and_then(|v| v.as_bool())
        .ok_or_else(|| BackendError::Protocol(format!("argument '{name}' missing after validation")))
}

fn int_arg(args: &Args, name: &str) -> Result<i64, BackendError> {
    args.get(name)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| BackendError::Protocol(format!("argument '{name}' missing after validation")))
}

fn list_arg<'a>(args: &'a Args, name: &str) -> Result<&'a Vec<serde_json::Value>, BackendError> {
    args.get(name)
        .and_then(|v| v.as_array())
        .ok_or_else(|| BackendError::Protocol(format!("argument '{name}' missing after validation")))
}

/// Map a failed `/api/login` exchange to an auth error. No session exists
/// yet, so a 401 here means the portal rejected the credentials, not that a
/// session expired.
fn login_failure(err: BackendError) -> AuthError {
    let message = match err {
        BackendError::SessionExpired => "credentials rejected".into(),
        BackendError::Server { status, message } => format!("{status} {message}"),
        other => other.to_string(),
    };
    AuthError::LoginFailed { message }
}

/// Classify a non-success portal response. A 401, or an error body whose
/// code names session expiry, signals the session manager to re-login.
fn classify_error(status: u16, body: &str) -> BackendError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }
    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        code: Option<String>,
        message: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorBody>(body).ok().and_then(|b| b.error);
    let code = detail.as_ref().and_then(|d| d.code.clone());
    let message = detail
        .and_then(|d| d.message)
        .unwrap_or_else(|| body.to_string());

    if status == 401 || matches!(code.as_deref(), Some("session_expired")) {
        return BackendError::SessionExpired;
    }
    BackendError::Server { status, message }
}
