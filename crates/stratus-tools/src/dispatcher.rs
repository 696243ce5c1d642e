//! The dispatcher: tool name + raw arguments in, result envelope out.
//!
//! Every exit path produces an envelope; nothing propagates to a transport
//! adapter. Validation order is fixed: registry lookup, scope check,
//! argument validation, and only then the portal call, so invalid requests
//! never cost a backend round-trip.

use std::sync::Arc;

use serde_json::Value;

use crate::registry::ToolRegistry;
use crate::validate::validate_args;
use stratus_portal::{Args, SessionManager};
use stratus_types::{ResultEnvelope, Scope, ToolError};

pub struct Dispatcher {
    registry: ToolRegistry,
    sessions: Arc<SessionManager>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry, sessions: Arc<SessionManager>) -> Self {
        Self { registry, sessions }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Scope the server's configured principal holds; transports pass it as
    /// the caller scope.
    pub fn caller_scope(&self) -> Scope {
        self.sessions.scope()
    }

    /// Dispatch one tool invocation. Infallible by contract.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        raw_args: &Value,
        caller_scope: Scope,
    ) -> ResultEnvelope {
        let Some(spec) = self.registry.lookup(tool_name) else {
            return ToolError::UnknownTool {
                name: tool_name.to_string(),
            }
            .into();
        };

        if !caller_scope.permits(spec.required_scope) {
            return ToolError::Forbidden {
                tool: spec.name.to_string(),
                required: spec.required_scope.to_string(),
            }
            .into();
        }

        let raw = match as_args(raw_args) {
            Ok(raw) => raw,
            Err(reason) => {
                return ToolError::InvalidArgument {
                    tool: spec.name.to_string(),
                    message: reason,
                }
                .into();
            }
        };

        let validated = match validate_args(spec, &raw) {
            Ok(args) => args,
            Err(err) => return err.into(),
        };

        tracing::debug!(tool = tool_name, "dispatching");
        match self.sessions.call(spec.operation, &validated).await {
            Ok(payload) => ResultEnvelope::success(payload),
            Err(err) => {
                tracing::warn!(tool = tool_name, "portal call failed: {err}");
                err.into()
            }
        }
    }
}

/// Accept an object or an absent argument payload; anything else is a
/// client error.
fn as_args(raw: &Value) -> Result<Args, String> {
    match raw {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Args::new()),
        other => Err(format!(
            "arguments must be an object, got {}",
            match other {
                Value::Array(_) => "array",
                Value::String(_) => "string",
                Value::Number(_) => "number",
                Value::Bool(_) => "boolean",
                _ => "null",
            }
        )),
    }
}
