//! Tool registry for name-based lookup.

use std::collections::BTreeMap;

use stratus_types::ToolSpec;

use crate::catalog::builtin_tools;

/// Registry of available tools. Sealed at construction: tool availability
/// is deterministic for the lifetime of a server instance.
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, ToolSpec>,
}

impl ToolRegistry {
    /// Create the registry with all built-in tools.
    pub fn with_builtins() -> Self {
        let mut tools = BTreeMap::new();
        for spec in builtin_tools() {
            tools.insert(spec.name, spec);
        }
        Self { tools }
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    /// All registered specs, in stable name order. This is the capability
    /// document transports expose without authentication.
    pub fn specs(&self) -> impl Iterator<Item = &ToolSpec> {
        self.tools.values()
    }

    /// Tool definitions in the shape MCP clients expect from `tools/list`.
    pub fn mcp_definitions(&self) -> Vec<serde_json::Value> {
        self.specs()
            .map(|spec| {
                serde_json::json!({
                    "name": spec.name,
                    "description": spec.description,
                    "inputSchema": spec.input_schema(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
