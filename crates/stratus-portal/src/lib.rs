//! Portal REST client and session management for Stratus.

pub mod backend;
pub mod client;
pub mod session;

pub use backend::{Args, BoxFuture, PortalBackend};
pub use client::PortalClient;
pub use session::SessionManager;
