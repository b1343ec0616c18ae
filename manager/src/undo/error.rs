use thiserror::Error;

use crate::ident::GlobalId;

/// Errors that can occur while recording or replaying undo sets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
    /// The undo stack is empty
    #[error("nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty
    #[error("nothing to redo")]
    NothingToRedo,

    /// Undo or redo was requested while a set was still being recorded
    #[error("an undo set is still open; close it before replaying")]
    SetStillOpen,

    /// The element was replayed before both sides of the transition were
    /// captured
    #[error("undo element for {id} has no captured transition")]
    IncompleteElement { id: GlobalId },

    /// A captured state names a different object than the element
    #[error("undo element for {expected} was given a state for {actual}")]
    IdMismatch {
        expected: GlobalId,
        actual: GlobalId,
    },

    /// The object a plain state transition addresses no longer exists
    #[error("no object with id {id} exists to apply the transition to")]
    ObjectMissing { id: GlobalId },

    /// Re-applying a captured state failed inside the session
    #[error("applying captured state for {id} failed: {reason}")]
    Apply { id: GlobalId, reason: String },
}
