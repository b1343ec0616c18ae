use thiserror::Error;

use crate::link::LinkError;
use crate::property::PropertyError;
use crate::proxy::ProxyError;
use crate::session::SessionError;

/// Errors raised by the definition registry, the proxy manager and state
/// file handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No definition exists under the requested group and type
    #[error("no proxy definition for `{group}.{name}`")]
    UnknownDefinition { group: String, name: String },

    /// A definition's sub-proxy chain references itself
    #[error("proxy definition `{group}.{name}` is part of a sub-proxy cycle")]
    DefinitionCycle { group: String, name: String },

    /// No proxy is registered under the requested group and name
    #[error("no proxy registered as `{group}.{name}`")]
    UnknownEntry { group: String, name: String },

    /// A definitions document or state file could not be parsed
    #[error("parse failure: {reason}")]
    Parse { reason: String },

    /// The state file was written by a newer, incompatible version
    #[error("state file version `{found}` is not supported")]
    UnsupportedVersion { found: String },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Link(#[from] LinkError),
}
