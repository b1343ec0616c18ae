use super::element::UndoElement;

/// A labeled group of transitions recorded between one begin/end pair.
/// Undone and redone as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSet {
    label: String,
    elements: Vec<UndoElement>,
}

impl UndoSet {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            elements: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn add(&mut self, element: UndoElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[UndoElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Two stacks of sets. Recording a new set clears the redo side, so history
/// is always linear.
#[derive(Debug, Default)]
pub struct UndoStack {
    undo: Vec<UndoSet>,
    redo: Vec<UndoSet>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, set: UndoSet) {
        self.redo.clear();
        self.undo.push(set);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(UndoSet::label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(UndoSet::label)
    }

    pub fn pop_undo(&mut self) -> Option<UndoSet> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<UndoSet> {
        self.redo.pop()
    }

    /// Re-file a set after replaying it in the given direction, or put it
    /// back where it came from after a failed replay.
    pub fn restore_undo(&mut self, set: UndoSet) {
        self.undo.push(set);
    }

    pub fn restore_redo(&mut self, set: UndoSet) {
        self.redo.push(set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::GlobalId;
    use crate::undo::element::{Capture, UndoElement};

    fn creation_set(label: &str, id: u64) -> UndoSet {
        let mut set = UndoSet::new(label);
        set.add(
            UndoElement::transition(
                GlobalId::from_value(id),
                Capture::Absent,
                Capture::Absent,
            )
            .unwrap(),
        );
        set
    }

    #[test]
    fn recording_clears_the_redo_side() {
        let mut stack = UndoStack::new();
        stack.push(creation_set("create sphere", 300));
        let set = stack.pop_undo().unwrap();
        stack.restore_redo(set);
        assert!(stack.can_redo());

        stack.push(creation_set("create cone", 301));
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_label(), Some("create cone"));
    }
}
