//! Central argument validation against a tool's declarative schema.
//!
//! Transport clients send loosely-typed argument objects; this is the single
//! checkpoint that turns them into validated arguments. Unknown parameters
//! are rejected, missing required parameters are rejected, defaults are
//! inserted, and type mismatches are coerced only where unambiguous.

use serde_json::Value;

use stratus_portal::Args;
use stratus_types::{ParamKind, ToolError, ToolSpec};

/// Validate `raw` against `spec`'s parameter schema.
pub fn validate_args(spec: &ToolSpec, raw: &Args) -> Result<Args, ToolError> {
    for key in raw.keys() {
        if !spec.params.iter().any(|p| p.name == key) {
            return Err(invalid(spec, key, "unknown parameter"));
        }
    }

    let mut validated = Args::new();
    for param in &spec.params {
        match raw.get(param.name) {
            Some(value) => {
                let coerced = coerce(param.kind, value)
                    .ok_or_else(|| invalid(spec, param.name, mismatch_reason(param.kind, value)))?;
                validated.insert(param.name.to_string(), coerced);
            }
            None if param.required => {
                return Err(invalid(spec, param.name, "required parameter is missing"));
            }
            None => {
                if let Some(default) = &param.default {
                    validated.insert(param.name.to_string(), default.clone());
                }
            }
        }
    }
    Ok(validated)
}

/// Coerce `value` to `kind` where the conversion is unambiguous; `None`
/// means rejection.
fn coerce(kind: ParamKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (ParamKind::String, Value::String(_)) => Some(value.clone()),
        // A bare number for a string parameter has exactly one reading.
        (ParamKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),

        (ParamKind::Bool, Value::Bool(_)) => Some(value.clone()),
        (ParamKind::Bool, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },

        (ParamKind::Int, Value::Number(n)) => n.as_i64().map(Value::from),
        (ParamKind::Int, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),

        (ParamKind::StringList, Value::Array(items)) => {
            if items.iter().all(|item| item.is_string()) {
                Some(value.clone())
            } else {
                None
            }
        }

        _ => None,
    }
}

fn mismatch_reason(kind: ParamKind, value: &Value) -> String {
    format!("expected {}, got {}", kind.schema_type(), type_name(value))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid(spec: &ToolSpec, field: &str, reason: impl Into<String>) -> ToolError {
    ToolError::InvalidArgument {
        tool: spec.name.to_string(),
        message: format!("{field}: {}", reason.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratus_types::{Operation, ParamSpec, Scope};

    fn spec() -> ToolSpec {
        ToolSpec {
            name: "create_public_link",
            description: "Share a file",
            params: vec![
                ParamSpec::required("path", ParamKind::String, "Path"),
                ParamSpec::optional("access", ParamKind::String, json!("RO"), "Access level"),
                ParamSpec::optional("expire_in", ParamKind::Int, json!(30), "Days to expiry"),
            ],
            required_scope: Scope::User,
            operation: Operation::PublicLink,
        }
    }

    fn args_of(value: serde_json::Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn defaults_fill_omitted_optionals() {
        let validated = validate_args(&spec(), &args_of(json!({"path": "/a"}))).unwrap();
        assert_eq!(validated["path"], "/a");
        assert_eq!(validated["access"], "RO");
        assert_eq!(validated["expire_in"], 30);
    }

    #[test]
    fn missing_required_is_rejected() {
        let err = validate_args(&spec(), &Args::new()).unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArgument { ref message, .. } if message.contains("path")
        ));
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = validate_args(&spec(), &args_of(json!({"path": "/a", "mode": "fast"})))
            .unwrap_err();
        assert!(matches!(
            err,
            ToolError::InvalidArgument { ref message, .. } if message.contains("mode")
        ));
    }

    #[test]
    fn numeric_string_coerces_to_int() {
        let validated =
            validate_args(&spec(), &args_of(json!({"path": "/a", "expire_in": "14"}))).unwrap();
        assert_eq!(validated["expire_in"], 14);
    }

    #[test]
    fn non_numeric_string_for_int_is_rejected() {
        let err = validate_args(&spec(), &args_of(json!({"path": "/a", "expire_in": "soon"})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn fractional_number_for_int_is_rejected() {
        let err = validate_args(&spec(), &args_of(json!({"path": "/a", "expire_in": 1.5})))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArgument { .. }));
    }

    #[test]
    fn bool_string_spellings_coerce() {
        let spec = ToolSpec {
            name: "list_dir",
            description: "List",
            params: vec![
                ParamSpec::required("path", ParamKind::String, "Path"),
                ParamSpec::optional("include_deleted", ParamKind::Bool, json!(false), "Deleted"),
            ],
            required_scope: Scope::User,
            operation: Operation::ListDir,
        };
        let validated =
            validate_args(&spec, &args_of(json!({"path": "/", "include_deleted": "TRUE"})))
                .unwrap();
        assert_eq!(validated["include_deleted"], true);

        let err = validate_args(&spec, &args_of(json!({"path": "/", "include_deleted": "maybe"})));
        assert!(err.is_err());
    }

    #[test]
    fn string_list_rejects_mixed_items() {
        let spec = ToolSpec {
            name: "delete_items",
            description: "Delete",
            params: vec![ParamSpec::required("paths", ParamKind::StringList, "Paths")],
            required_scope: Scope::User,
            operation: Operation::Delete,
        };
        assert!(validate_args(&spec, &args_of(json!({"paths": ["/a", "/b"]}))).is_ok());
        assert!(validate_args(&spec, &args_of(json!({"paths": ["/a", 7]}))).is_err());
        assert!(validate_args(&spec, &args_of(json!({"paths": "/a"}))).is_err());
    }

    #[test]
    fn number_coerces_to_string_param() {
        let validated = validate_args(&spec(), &args_of(json!({"path": 42}))).unwrap();
        assert_eq!(validated["path"], "42");
    }
}
