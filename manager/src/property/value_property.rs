use vizsync_codec::Variant;

use crate::message::{PropertySnapshot, SnapshotValues, Stream};
use crate::ident::GlobalId;

use super::{definition::PropertyDefinition, error::PropertyError};

/// A scalar-valued property: an ordered list of variants pushed through one
/// remote command.
#[derive(Debug, Clone)]
pub struct ValueProperty {
    name: String,
    command: String,
    elements: Vec<Variant>,
    default_values: Vec<Variant>,
    repeatable: bool,
    immediate_update: bool,
    update_self: bool,
    do_update: bool,
    modified: bool,
}

impl ValueProperty {
    pub fn new(definition: &PropertyDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            command: definition.command.clone(),
            elements: definition.default_values.clone(),
            default_values: definition.default_values.clone(),
            repeatable: definition.repeatable,
            immediate_update: definition.immediate_update,
            update_self: definition.update_self,
            do_update: true,
            // Defaults have never been pushed, so they count as pending.
            modified: !definition.default_values.is_empty(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn elements(&self) -> &[Variant] {
        &self.elements
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn do_update(&self) -> bool {
        self.do_update
    }

    pub fn set_do_update(&mut self, do_update: bool) {
        self.do_update = do_update;
    }

    pub fn immediate_update(&self) -> bool {
        self.immediate_update
    }

    pub fn update_self(&self) -> bool {
        self.update_self
    }

    pub fn set_elements(&mut self, elements: Vec<Variant>) -> Result<(), PropertyError> {
        if !self.repeatable
            && !self.default_values.is_empty()
            && elements.len() != self.default_values.len()
        {
            return Err(PropertyError::WrongElementCount {
                name: self.name.clone(),
                expected: self.default_values.len(),
                actual: elements.len(),
            });
        }
        self.elements = elements;
        self.modified = true;
        Ok(())
    }

    pub fn set_element(&mut self, index: usize, value: Variant) -> Result<(), PropertyError> {
        let length = self.elements.len();
        let slot = self
            .elements
            .get_mut(index)
            .ok_or(PropertyError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                length,
            })?;
        *slot = value;
        self.modified = true;
        Ok(())
    }

    pub fn reset_to_default(&mut self) {
        self.elements = self.default_values.clone();
        self.modified = true;
    }

    /// Append the push instruction for `target` and clear the modified flag.
    pub fn push(&mut self, stream: &mut Stream, targets: &[GlobalId]) {
        for target in targets {
            stream.invoke(*target, &self.command, self.elements.clone());
        }
        self.modified = false;
    }

    pub fn snapshot(&self) -> PropertySnapshot {
        PropertySnapshot {
            name: self.name.clone(),
            command: self.command.clone(),
            information_only: false,
            values: SnapshotValues::Elements(self.elements.clone()),
        }
    }

    pub fn load_snapshot(&mut self, snapshot: &PropertySnapshot) -> Result<(), PropertyError> {
        match &snapshot.values {
            SnapshotValues::Elements(elements) => {
                self.elements = elements.clone();
                self.modified = true;
                Ok(())
            }
            SnapshotValues::References(_) => Err(PropertyError::SnapshotKindMismatch {
                name: self.name.clone(),
                expected: "elements",
                actual: "references",
            }),
        }
    }

    /// Rebuild a property from a snapshot alone, for side-channel-free state
    /// loading. Flags not captured by snapshots fall back to defaults.
    pub fn from_snapshot(snapshot: &PropertySnapshot) -> Result<Self, PropertyError> {
        let SnapshotValues::Elements(elements) = &snapshot.values else {
            return Err(PropertyError::SnapshotKindMismatch {
                name: snapshot.name.clone(),
                expected: "elements",
                actual: "references",
            });
        };
        Ok(Self {
            name: snapshot.name.clone(),
            command: snapshot.command.clone(),
            elements: elements.clone(),
            default_values: Vec::new(),
            repeatable: true,
            immediate_update: false,
            update_self: false,
            do_update: true,
            modified: true,
        })
    }
}
