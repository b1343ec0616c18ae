use thiserror::Error;

use crate::ident::GlobalId;
use crate::property::PropertyError;

/// Errors that can occur during proxy operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// A property name was looked up that the proxy does not carry
    #[error("proxy {id} has no property named `{name}`")]
    UnknownProperty { id: GlobalId, name: String },

    /// A push or pull was attempted before the remote objects exist
    #[error("proxy {id}: remote objects have not been created yet")]
    ObjectsNotCreated { id: GlobalId },

    /// The proxy has already been destroyed
    #[error("proxy {id} has been destroyed")]
    Destroyed { id: GlobalId },

    /// A state snapshot for a different native class was loaded
    #[error("proxy {id}: state snapshot is for class `{actual}`, expected `{expected}`")]
    StateClassMismatch {
        id: GlobalId,
        expected: String,
        actual: String,
    },

    /// A property-level failure during push, pull or state load
    #[error(transparent)]
    Property(#[from] PropertyError),
}
