use log::debug;

use crate::ident::GlobalId;
use crate::message::ProxyState;
use crate::session::Session;

use super::error::UndoError;

/// One side of a recorded transition.
///
/// `Absent` means the object did not exist on that side, which is how
/// creations and deletions are represented without a separate element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Capture {
    Absent,
    Present(ProxyState),
}

impl Capture {
    pub fn is_absent(&self) -> bool {
        matches!(self, Capture::Absent)
    }
}

/// A single reversible transition of one object: the full state before and
/// the full state after.
///
/// Replaying never re-runs the original operations; it re-applies whichever
/// captured side the direction asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoElement {
    global_id: GlobalId,
    before: Option<Capture>,
    after: Option<Capture>,
}

impl UndoElement {
    pub fn new(global_id: GlobalId) -> Self {
        Self {
            global_id,
            before: None,
            after: None,
        }
    }

    pub fn transition(
        global_id: GlobalId,
        before: Capture,
        after: Capture,
    ) -> Result<Self, UndoError> {
        let mut element = Self::new(global_id);
        element.set_undo_redo_state(before, after)?;
        Ok(element)
    }

    pub fn global_id(&self) -> GlobalId {
        self.global_id
    }

    /// Record both sides of the transition. Fails, leaving the element
    /// unchanged, if either captured state names a different object.
    pub fn set_undo_redo_state(
        &mut self,
        before: Capture,
        after: Capture,
    ) -> Result<(), UndoError> {
        for capture in [&before, &after] {
            if let Capture::Present(state) = capture {
                if state.global_id != self.global_id {
                    return Err(UndoError::IdMismatch {
                        expected: self.global_id,
                        actual: state.global_id,
                    });
                }
            }
        }
        self.before = Some(before);
        self.after = Some(after);
        Ok(())
    }

    pub fn before(&self) -> Option<&Capture> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Capture> {
        self.after.as_ref()
    }

    /// Re-apply the before side, reverting the transition.
    pub fn undo(&self, session: &mut Session) -> Result<(), UndoError> {
        let (Some(before), Some(after)) = (&self.before, &self.after) else {
            return Err(UndoError::IncompleteElement { id: self.global_id });
        };
        self.apply(session, before, after.is_absent())
    }

    /// Re-apply the after side, replaying the transition.
    pub fn redo(&self, session: &mut Session) -> Result<(), UndoError> {
        let (Some(before), Some(after)) = (&self.before, &self.after) else {
            return Err(UndoError::IncompleteElement { id: self.global_id });
        };
        self.apply(session, after, before.is_absent())
    }

    /// `may_recreate` is true when the opposite side of the transition is
    /// `Absent`: the object is then expected to be missing and is rebuilt
    /// from the captured state. For a plain state-to-state transition a
    /// missing object is an error instead.
    fn apply(
        &self,
        session: &mut Session,
        target: &Capture,
        may_recreate: bool,
    ) -> Result<(), UndoError> {
        match target {
            Capture::Absent => {
                // Reverting to non-existence. A later operation may already
                // have removed the object; that is not a failure.
                if !session.is_registered(self.global_id) {
                    debug!(
                        "undo element: {} is already gone, nothing to delete",
                        self.global_id
                    );
                    return Ok(());
                }
                session
                    .remove_proxy_silently(self.global_id)
                    .map_err(|error| UndoError::Apply {
                        id: self.global_id,
                        reason: error.to_string(),
                    })
            }
            Capture::Present(state) => {
                if !session.is_registered(self.global_id) && !may_recreate {
                    return Err(UndoError::ObjectMissing { id: self.global_id });
                }
                session
                    .restore_proxy_silently(state)
                    .map_err(|error| UndoError::Apply {
                        id: self.global_id,
                        reason: error.to_string(),
                    })
            }
        }
    }
}
