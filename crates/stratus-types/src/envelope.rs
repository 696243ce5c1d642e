//! The transport-agnostic result envelope.
//!
//! Every tool invocation, on every transport, ends in exactly one of the two
//! variants below. The serialized shape is `{"result": <payload>}` or
//! `{"error": {"kind": <string>, "message": <string>}}`; the `kind`
//! vocabulary is stable so clients can branch on it alone.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, BackendError, PortalError, ToolError};

/// Stable failure classification, shared across all transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownTool,
    Forbidden,
    InvalidArgument,
    Auth,
    Backend,
}

/// The error half of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one tool invocation. External tagging gives the wire shape
/// directly: `Success` serializes under `"result"`, `Failure` under
/// `"error"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResultEnvelope {
    #[serde(rename = "result")]
    Success(serde_json::Value),
    #[serde(rename = "error")]
    Failure(FailureDetail),
}

impl ResultEnvelope {
    pub fn success(payload: serde_json::Value) -> Self {
        ResultEnvelope::Success(payload)
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ResultEnvelope::Failure(FailureDetail {
            kind,
            message: message.into(),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResultEnvelope::Failure(_))
    }
}

impl From<ToolError> for ResultEnvelope {
    fn from(err: ToolError) -> Self {
        let kind = match &err {
            ToolError::UnknownTool { .. } => FailureKind::UnknownTool,
            ToolError::InvalidArgument { .. } => FailureKind::InvalidArgument,
            ToolError::Forbidden { .. } => FailureKind::Forbidden,
        };
        ResultEnvelope::failure(kind, err.to_string())
    }
}

impl From<PortalError> for ResultEnvelope {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::Auth(e) => e.into(),
            PortalError::Backend(e) => e.into(),
        }
    }
}

impl From<AuthError> for ResultEnvelope {
    fn from(err: AuthError) -> Self {
        ResultEnvelope::failure(FailureKind::Auth, err.to_string())
    }
}

impl From<BackendError> for ResultEnvelope {
    fn from(err: BackendError) -> Self {
        ResultEnvelope::failure(FailureKind::Backend, err.to_string())
    }
}
