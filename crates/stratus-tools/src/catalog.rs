//! The built-in tool catalog.
//!
//! Each entry names a tool, its declarative parameter schema, the scope it
//! requires, and the portal operation it resolves to. The catalog is the
//! whole tool surface: nothing is registered at runtime.

use serde_json::json;
use stratus_types::{Operation, ParamKind, ParamSpec, Scope, ToolSpec};

pub(crate) fn builtin_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "who_am_i",
            description: "Get information about the currently authenticated user.",
            params: vec![],
            required_scope: Scope::User,
            operation: Operation::CurrentSession,
        },
        ToolSpec {
            name: "list_dir",
            description: "List the contents of a directory in the portal.",
            params: vec![
                ParamSpec::required("path", ParamKind::String, "Directory path to list"),
                ParamSpec::optional(
                    "include_deleted",
                    ParamKind::Bool,
                    json!(false),
                    "Whether to include deleted files",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::ListDir,
        },
        ToolSpec {
            name: "walk_tree",
            description: "Recursively walk through a directory tree.",
            params: vec![
                ParamSpec::required(
                    "path",
                    ParamKind::String,
                    "Root directory path to start walking from",
                ),
                ParamSpec::optional(
                    "include_deleted",
                    ParamKind::Bool,
                    json!(false),
                    "Whether to include deleted files and directories",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::WalkTree,
        },
        ToolSpec {
            name: "create_dir",
            description: "Create a new directory in the portal.",
            params: vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "Path where the directory should be created",
            )],
            required_scope: Scope::User,
            operation: Operation::CreateDir,
        },
        ToolSpec {
            name: "create_dirs",
            description: "Create a directory and all necessary parent directories.",
            params: vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "Directory path to create, including parents",
            )],
            required_scope: Scope::User,
            operation: Operation::CreateDirs,
        },
        ToolSpec {
            name: "copy_item",
            description: "Copy a file or directory to a new location.",
            params: vec![
                ParamSpec::required("source", ParamKind::String, "Source file or directory path"),
                ParamSpec::required(
                    "destination",
                    ParamKind::String,
                    "Destination path for the copy",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::Copy,
        },
        ToolSpec {
            name: "move_item",
            description: "Move a file or directory to a new location.",
            params: vec![
                ParamSpec::required("source", ParamKind::String, "Source file or directory path"),
                ParamSpec::required(
                    "destination",
                    ParamKind::String,
                    "Destination path for the move",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::Move,
        },
        ToolSpec {
            name: "rename_item",
            description: "Rename a file or directory.",
            params: vec![
                ParamSpec::required(
                    "path",
                    ParamKind::String,
                    "Current path of the file or directory",
                ),
                ParamSpec::required(
                    "new_name",
                    ParamKind::String,
                    "New name for the file or directory",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::Rename,
        },
        ToolSpec {
            name: "delete_items",
            description: "Delete one or more files or directories.",
            params: vec![ParamSpec::required(
                "paths",
                ParamKind::StringList,
                "File or directory paths to delete",
            )],
            required_scope: Scope::User,
            operation: Operation::Delete,
        },
        ToolSpec {
            name: "recover_items",
            description: "Recover previously deleted files or directories.",
            params: vec![ParamSpec::required(
                "paths",
                ParamKind::StringList,
                "File or directory paths to recover",
            )],
            required_scope: Scope::User,
            operation: Operation::Recover,
        },
        ToolSpec {
            name: "list_versions",
            description: "List all versions of a specific file.",
            params: vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "Path to the file",
            )],
            required_scope: Scope::User,
            operation: Operation::ListVersions,
        },
        ToolSpec {
            name: "create_public_link",
            description: "Create a public link for sharing a file or directory.",
            params: vec![
                ParamSpec::required(
                    "path",
                    ParamKind::String,
                    "Path to the file or directory to share",
                ),
                ParamSpec::optional(
                    "access",
                    ParamKind::String,
                    json!("RO"),
                    "Access level: 'RO' for read-only, 'RW' for read-write",
                ),
                ParamSpec::optional(
                    "expire_in",
                    ParamKind::Int,
                    json!(30),
                    "Number of days until the link expires",
                ),
            ],
            required_scope: Scope::User,
            operation: Operation::PublicLink,
        },
        ToolSpec {
            name: "get_permalink",
            description: "Get a permanent link to a file or directory.",
            params: vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "Path to the file or directory",
            )],
            required_scope: Scope::User,
            operation: Operation::Permalink,
        },
        ToolSpec {
            name: "read_file",
            description: "Read the contents of a text file from the portal.",
            params: vec![ParamSpec::required(
                "path",
                ParamKind::String,
                "Path to the file to read",
            )],
            required_scope: Scope::User,
            operation: Operation::ReadFile,
        },
        ToolSpec {
            name: "write_file",
            description: "Upload content directly to the portal as a file.",
            params: vec![
                ParamSpec::required("path", ParamKind::String, "Destination file path"),
                ParamSpec::required("content", ParamKind::String, "Content to upload"),
            ],
            required_scope: Scope::User,
            operation: Operation::WriteFile,
        },
        ToolSpec {
            name: "browse_tenant",
            description: "Browse to a specific tenant. Requires global administrator privileges.",
            params: vec![ParamSpec::required(
                "tenant",
                ParamKind::String,
                "Name of the tenant to browse to",
            )],
            required_scope: Scope::Admin,
            operation: Operation::BrowseTenant,
        },
        ToolSpec {
            name: "browse_global_admin",
            description: "Browse to the global administration scope.",
            params: vec![],
            required_scope: Scope::Admin,
            operation: Operation::BrowseGlobalAdmin,
        },
    ]
}
