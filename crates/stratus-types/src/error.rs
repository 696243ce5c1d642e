//! Error hierarchy for Stratus.

use thiserror::Error;

/// Errors from configuration and credential resolution. Unrecoverable:
/// the process refuses to start without complete credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },
}

/// Errors from authenticating against the portal.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication failed: {message}")]
    LoginFailed { message: String },

    #[error("Session refresh failed: {message}")]
    RefreshFailed { message: String },
}

/// Errors from portal operations once a session exists.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The portal rejected the session token. The session manager treats
    /// this as the one retryable condition.
    #[error("Session expired")]
    SessionExpired,

    #[error("Portal error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("timeout")]
    Timeout,

    #[error("Unexpected portal response: {0}")]
    Protocol(String),
}

/// Combined error surface of an authenticated portal call: either the
/// session could not be (re)established, or the operation itself failed.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Client-input errors detected before the portal is contacted.
/// Never retried, always surfaced verbatim.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid argument for tool '{tool}': {message}")]
    InvalidArgument { tool: String, message: String },

    #[error("Tool '{tool}' requires {required} scope")]
    Forbidden { tool: String, required: String },
}
