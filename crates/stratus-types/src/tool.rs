//! Tool descriptions: parameter schemas and the backend operations they
//! resolve to.

use crate::session::Scope;

/// Backend operation a tool maps to. The portal client owns the translation
/// from operation to REST endpoint; nothing else in the system knows the
/// portal's URL layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentSession,
    ListDir,
    WalkTree,
    CreateDir,
    CreateDirs,
    Copy,
    Move,
    Rename,
    Delete,
    Recover,
    ListVersions,
    PublicLink,
    Permalink,
    ReadFile,
    WriteFile,
    BrowseTenant,
    BrowseGlobalAdmin,
}

/// Wire type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Bool,
    Int,
    StringList,
}

impl ParamKind {
    /// JSON-Schema type name, used in capability documents.
    pub fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Bool => "boolean",
            ParamKind::Int => "integer",
            ParamKind::StringList => "array",
        }
    }
}

/// Declarative schema for one tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Inserted when the caller omits the parameter. Only optional
    /// parameters carry defaults.
    pub default: Option<serde_json::Value>,
    pub description: &'static str,
}

impl ParamSpec {
    pub fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            description,
        }
    }

    pub fn optional(
        name: &'static str,
        kind: ParamKind,
        default: serde_json::Value,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            kind,
            required: false,
            default: Some(default),
            description,
        }
    }
}

/// A registered tool: unique name, parameter schema, scope requirement, and
/// the backend operation it invokes. Immutable after registry construction.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    pub required_scope: Scope,
    pub operation: Operation,
}

impl ToolSpec {
    /// Render the parameter schema as a JSON-Schema object, the shape MCP
    /// clients expect in `tools/list`.
    pub fn input_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for param in &self.params {
            let mut prop = serde_json::Map::new();
            prop.insert("type".into(), param.kind.schema_type().into());
            if param.kind == ParamKind::StringList {
                prop.insert("items".into(), serde_json::json!({"type": "string"}));
            }
            prop.insert("description".into(), param.description.into());
            if let Some(default) = &param.default {
                prop.insert("default".into(), default.clone());
            }
            properties.insert(param.name.to_string(), prop.into());
            if param.required {
                required.push(param.name);
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_spec() -> ToolSpec {
        ToolSpec {
            name: "list_dir",
            description: "List entries under a path",
            params: vec![
                ParamSpec::required("path", ParamKind::String, "Directory path"),
                ParamSpec::optional(
                    "include_deleted",
                    ParamKind::Bool,
                    json!(false),
                    "Include deleted entries",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::ListDir,
        }
    }

    #[test]
    fn input_schema_lists_required_params() {
        let schema = sample_spec().input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["path"]));
        assert_eq!(schema["properties"]["path"]["type"], "string");
        assert_eq!(schema["properties"]["include_deleted"]["type"], "boolean");
        assert_eq!(schema["properties"]["include_deleted"]["default"], false);
    }

    #[test]
    fn string_list_params_carry_item_type() {
        let spec = ToolSpec {
            name: "delete_items",
            description: "Delete paths",
            params: vec![ParamSpec::required(
                "paths",
                ParamKind::StringList,
                "Paths to delete",
            )],
            required_scope: Scope::User,
            operation: Operation::Delete,
        };
        let schema = spec.input_schema();
        assert_eq!(schema["properties"]["paths"]["type"], "array");
        assert_eq!(schema["properties"]["paths"]["items"]["type"], "string");
    }
}
