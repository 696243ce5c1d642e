//! Shared types and error hierarchy for Stratus.

pub mod envelope;
pub mod error;
pub mod session;
pub mod tool;

pub use envelope::{FailureDetail, FailureKind, ResultEnvelope};
pub use error::{AuthError, BackendError, ConfigError, PortalError, ToolError};
pub use session::{Credentials, Scope, Secret, SessionHandle};
pub use tool::{Operation, ParamKind, ParamSpec, ToolSpec};
