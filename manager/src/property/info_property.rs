use vizsync_codec::Variant;

use crate::message::{PropertySnapshot, SnapshotValues};

use super::{definition::PropertyDefinition, error::PropertyError};

/// An information-only property: read-only on the client, populated by
/// pulling a freshly computed result from the remote object. This is the
/// only place remote-to-client data flow occurs.
#[derive(Debug, Clone)]
pub struct InfoProperty {
    name: String,
    /// The remote gather method invoked by a pull.
    command: String,
    values: Vec<Variant>,
}

impl InfoProperty {
    pub fn new(definition: &PropertyDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            command: definition.command.clone(),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn values(&self) -> &[Variant] {
        &self.values
    }

    pub fn populate(&mut self, values: Vec<Variant>) {
        self.values = values;
    }

    pub fn snapshot(&self) -> PropertySnapshot {
        PropertySnapshot {
            name: self.name.clone(),
            command: self.command.clone(),
            information_only: true,
            values: SnapshotValues::Elements(self.values.clone()),
        }
    }

    pub fn load_snapshot(&mut self, snapshot: &PropertySnapshot) -> Result<(), PropertyError> {
        match &snapshot.values {
            SnapshotValues::Elements(elements) => {
                self.values = elements.clone();
                Ok(())
            }
            SnapshotValues::References(_) => Err(PropertyError::SnapshotKindMismatch {
                name: self.name.clone(),
                expected: "elements",
                actual: "references",
            }),
        }
    }

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
            values: elements.clone(),
        })
    }
}
