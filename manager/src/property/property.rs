use vizsync_codec::Variant;

use crate::ident::GlobalId;
use crate::message::{PropertySnapshot, SnapshotValues, Stream};

use super::{
    definition::{PropertyDefinition, PropertyKind},
    error::PropertyError,
    info_property::InfoProperty,
    reference_property::ReferenceProperty,
    value_property::ValueProperty,
    ObjectResolver,
};

/// A named, typed, remotely-pushable unit of state belonging to a proxy.
///
/// A closed set of kinds rather than an open hierarchy: every kind implements
/// the same push/pull/snapshot contract and callers dispatch on the enum.
#[derive(Debug, Clone)]
pub enum Property {
    Value(ValueProperty),
    Reference(ReferenceProperty),
    Info(InfoProperty),
}

impl Property {
    pub fn from_definition(definition: &PropertyDefinition) -> Result<Self, PropertyError> {
        definition.validate()?;
        if definition.information_only {
            return Ok(Property::Info(InfoProperty::new(definition)));
        }
        match definition.kind {
            PropertyKind::Value => Ok(Property::Value(ValueProperty::new(definition))),
            PropertyKind::Reference => Ok(Property::Reference(ReferenceProperty::new(definition))),
        }
    }

    /// Rebuild a property from a snapshot alone, for side-channel-free state
    /// loading.
    pub fn from_snapshot(snapshot: &PropertySnapshot) -> Result<Self, PropertyError> {
        if snapshot.information_only {
            return Ok(Property::Info(InfoProperty::from_snapshot(snapshot)?));
        }
        match &snapshot.values {
            SnapshotValues::Elements(_) => Ok(Property::Value(ValueProperty::from_snapshot(snapshot)?)),
            SnapshotValues::References(_) => {
                Ok(Property::Reference(ReferenceProperty::from_snapshot(snapshot)?))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Property::Value(property) => property.name(),
            Property::Reference(property) => property.name(),
            Property::Info(property) => property.name(),
        }
    }

    pub fn command(&self) -> &str {
        match self {
            Property::Value(property) => property.command(),
            Property::Reference(property) => property.command(),
            Property::Info(property) => property.command(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Property::Value(_) => "value",
            Property::Reference(_) => "reference",
            Property::Info(_) => "information",
        }
    }

    pub fn is_information_only(&self) -> bool {
        matches!(self, Property::Info(_))
    }

    pub fn is_modified(&self) -> bool {
        match self {
            Property::Value(property) => property.is_modified(),
            Property::Reference(property) => property.is_modified(),
            Property::Info(_) => false,
        }
    }

    pub fn do_update(&self) -> bool {
        match self {
            Property::Value(property) => property.do_update(),
            Property::Reference(property) => property.do_update(),
            Property::Info(_) => false,
        }
    }

    pub fn set_do_update(&mut self, do_update: bool) {
        match self {
            Property::Value(property) => property.set_do_update(do_update),
            Property::Reference(property) => property.set_do_update(do_update),
            Property::Info(_) => {}
        }
    }

    pub fn immediate_update(&self) -> bool {
        match self {
            Property::Value(property) => property.immediate_update(),
            Property::Reference(property) => property.immediate_update(),
            Property::Info(_) => false,
        }
    }

    pub fn update_self(&self) -> bool {
        match self {
            Property::Value(property) => property.update_self(),
            Property::Reference(property) => property.update_self(),
            Property::Info(_) => false,
        }
    }

    /// Append this property's push instructions for every target to `stream`.
    ///
    /// Returns `Ok(false)` without touching the stream for information-only
    /// properties. On any failure the output stream, the modified flag and
    /// the reference baseline are all left untouched.
    pub fn push(
        &mut self,
        stream: &mut Stream,
        targets: &[GlobalId],
        resolver: &dyn ObjectResolver,
    ) -> Result<bool, PropertyError> {
        match self {
            Property::Info(_) => Ok(false),
            Property::Value(property) => {
                property.push(stream, targets);
                Ok(true)
            }
            Property::Reference(property) => {
                let mut staged = Stream::new();
                for target in targets {
                    property.append_push(&mut staged, *target, resolver)?;
                }
                stream.extend(staged);
                property.commit_push();
                Ok(true)
            }
        }
    }

    /// Populate the property from a freshly pulled result. Only
    /// information-only properties accept pulled data.
    pub fn pull(&mut self, values: Vec<Variant>) -> Result<(), PropertyError> {
        match self {
            Property::Info(property) => {
                property.populate(values);
                Ok(())
            }
            other => Err(PropertyError::InvalidPull {
                name: other.name().to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    pub fn snapshot(&self) -> PropertySnapshot {
        match self {
            Property::Value(property) => property.snapshot(),
            Property::Reference(property) => property.snapshot(),
            Property::Info(property) => property.snapshot(),
        }
    }

    pub fn load_snapshot(&mut self, snapshot: &PropertySnapshot) -> Result<(), PropertyError> {
        match self {
            Property::Value(property) => property.load_snapshot(snapshot),
            Property::Reference(property) => property.load_snapshot(snapshot),
            Property::Info(property) => property.load_snapshot(snapshot),
        }
    }

    pub fn as_value(&self) -> Option<&ValueProperty> {
        match self {
            Property::Value(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_value_mut(&mut self) -> Option<&mut ValueProperty> {
        match self {
            Property::Value(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceProperty> {
        match self {
            Property::Reference(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_reference_mut(&mut self) -> Option<&mut ReferenceProperty> {
        match self {
            Property::Reference(property) => Some(property),
            _ => None,
        }
    }

    pub fn as_info(&self) -> Option<&InfoProperty> {
        match self {
            Property::Info(property) => Some(property),
            _ => None,
        }
    }
}
