//! Credentials, scopes, and the portal session handle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Authorization scope of a portal principal.
///
/// `Admin` subsumes `User`: an admin session may invoke every tool a user
/// session may.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    User,
    Admin,
}

impl Scope {
    /// Whether a caller holding this scope may invoke a tool that
    /// requires `required`.
    pub fn permits(self, required: Scope) -> bool {
        match required {
            Scope::User => true,
            Scope::Admin => self == Scope::Admin,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Admin => "admin",
        }
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Scope::User),
            "admin" => Ok(Scope::Admin),
            other => Err(format!("must be \"admin\" or \"user\", got \"{other}\"")),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret string that never leaks through Debug, Display, or serde.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the secret for use in an outbound request. Call sites are the
    /// only place the raw value appears.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl Serialize for Secret {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Connection parameters for the portal, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Secret,
    pub scope: Scope,
    /// Verify TLS certificates when connecting.
    pub tls: bool,
}

impl Credentials {
    /// Base URL of the portal API.
    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }
}

/// An authenticated portal session. Owned by the session manager; cloned
/// handles let concurrent calls proceed while establishment stays exclusive.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    /// Opaque backend session token.
    pub token: String,
    pub established_at: DateTime<Utc>,
    pub scope: Scope,
}

impl SessionHandle {
    pub fn new(token: impl Into<String>, scope: Scope) -> Self {
        Self {
            token: token.into(),
            established_at: Utc::now(),
            scope,
        }
    }
}
