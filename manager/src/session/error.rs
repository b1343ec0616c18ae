use thiserror::Error;
use vizsync_codec::CodecError;

use crate::ident::GlobalId;
use crate::proxy::ProxyError;

/// Errors raised when a received instruction cannot be executed against the
/// local native objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No builder is registered for the named native class
    #[error("no builder registered for native class `{class}`")]
    UnknownClass { class: String },

    /// An instruction addressed an object id that does not exist here
    #[error("no native object with id {id}")]
    UnknownObject { id: GlobalId },

    /// The object does not implement the invoked method
    #[error("native class `{class}` has no method `{method}`")]
    UnknownMethod { class: String, method: String },

    /// The method was invoked with the wrong argument shape
    #[error("method `{method}` expects {expected}")]
    BadArguments {
        method: String,
        expected: &'static str,
    },

    /// A full-state payload arrived for a proxy that was never instantiated
    #[error("state for {id} names no native object to apply to")]
    MissingNativeId { id: GlobalId },
}

/// Errors raised by a process controller while moving messages to and from
/// its server processes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The connection to the process has been closed
    #[error("connection to the server process is closed")]
    Closed,

    /// The transport failed while sending or receiving
    #[error("transport failure: {0}")]
    Transport(String),

    /// The message could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A pull request failed on the remote side
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors surfaced by session-level operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No proxy is registered under the given id
    #[error("no proxy registered under {id}")]
    UnknownGlobalId { id: GlobalId },

    /// A proxy-level failure
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    /// A controller-level failure
    #[error(transparent)]
    Controller(#[from] ControllerError),
}
