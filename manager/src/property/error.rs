use thiserror::Error;

use crate::ident::GlobalId;

/// Errors that can occur while configuring, pushing or pulling properties
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// A definition carried no property name
    #[error("property definition has an empty name")]
    EmptyName,

    /// A pushable definition carried no remote command
    #[error("property `{name}` has no command and is not information-only")]
    EmptyCommand { name: String },

    /// An attribute only meaningful for reference properties appeared on a
    /// scalar definition
    #[error("property `{name}`: attribute `{attribute}` is only valid on reference properties")]
    MisplacedAttribute {
        name: String,
        attribute: &'static str,
    },

    /// Information-only reference properties are not supported
    #[error("property `{name}` cannot be both information-only and reference-valued")]
    InformationOnlyReference { name: String },

    /// A non-repeatable property was given the wrong number of elements
    #[error("property `{name}` expects exactly {expected} element(s), got {actual}")]
    WrongElementCount {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Element index out of range
    #[error("property `{name}`: element index {index} out of range (length {length})")]
    IndexOutOfRange {
        name: String,
        index: usize,
        length: usize,
    },

    /// A referenced proxy could not be resolved to a wire id
    #[error("property `{name}`: referenced object {id} could not be resolved")]
    UnresolvedReference { name: String, id: GlobalId },

    /// Pull attempted on a property that is not information-only
    #[error("property `{name}` is {kind}-valued and cannot be pulled")]
    InvalidPull { name: String, kind: &'static str },

    /// Element assignment attempted on a property that is not scalar-valued
    #[error("property `{name}` is {kind}-valued and does not take elements")]
    InvalidElements { name: String, kind: &'static str },

    /// The remote object could not supply the requested information
    #[error("property `{name}`: remote could not supply information: {reason}")]
    PullUnavailable { name: String, reason: String },

    /// A snapshot of the wrong shape was loaded into a property
    #[error("property `{name}`: snapshot holds {actual} values, expected {expected}")]
    SnapshotKindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}
