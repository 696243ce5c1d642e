//! Tool catalog, argument validation, and dispatch for Stratus.

mod catalog;
mod dispatcher;
mod registry;
mod validate;

pub use dispatcher::Dispatcher;
pub use registry::ToolRegistry;
pub use validate::validate_args;
