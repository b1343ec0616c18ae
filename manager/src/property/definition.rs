use log::warn;
use serde::{Deserialize, Serialize};
use vizsync_codec::Variant;

use super::error::PropertyError;

/// How a reference-valued property resolves a logical proxy handle to the
/// concrete id its wire argument carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// The referenced proxy's wrapped native object. The default when the
    /// `argument_type` attribute is absent (documented, not a fallback).
    #[default]
    #[serde(rename = "VTK")]
    Native,
    /// The referenced proxy itself, by global id.
    #[serde(rename = "SMProxy")]
    Proxy,
    /// The referenced proxy's kernel-side companion, which shares its
    /// global id.
    #[serde(rename = "Kernel")]
    Kernel,
}

/// Value domain of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// A list of scalar variants.
    #[default]
    Value,
    /// A list of proxy references.
    Reference,
}

/// The parsed form of one `<Property .../>` element of a proxy definition.
///
/// Attribute names mirror the definition schema; unknown combinations are
/// rejected by [`PropertyDefinition::validate`] at load time, never silently
/// defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub argument_type: ReferenceKind,
    #[serde(default)]
    pub clean_command: Option<String>,
    #[serde(default)]
    pub remove_command: Option<String>,
    #[serde(default)]
    pub null_on_empty: bool,
    #[serde(default)]
    pub information_only: bool,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub immediate_update: bool,
    #[serde(default)]
    pub update_self: bool,
    #[serde(default)]
    pub default_values: Vec<Variant>,
}

impl PropertyDefinition {
    /// A scalar-valued definition with defaults, the common case.
    pub fn value(name: &str, command: &str, default_values: Vec<Variant>) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            kind: PropertyKind::Value,
            argument_type: ReferenceKind::default(),
            clean_command: None,
            remove_command: None,
            null_on_empty: false,
            information_only: false,
            repeatable: false,
            immediate_update: false,
            update_self: false,
            default_values,
        }
    }

    /// A reference-valued definition.
    pub fn reference(name: &str, command: &str) -> Self {
        Self {
            name: name.to_string(),
            command: command.to_string(),
            kind: PropertyKind::Reference,
            argument_type: ReferenceKind::default(),
            clean_command: None,
            remove_command: None,
            null_on_empty: false,
            information_only: false,
            repeatable: true,
            immediate_update: false,
            update_self: false,
            default_values: Vec::new(),
        }
    }

    /// An information-only definition; `command` is the remote gather method.
    pub fn information(name: &str, command: &str) -> Self {
        let mut definition = Self::value(name, command, Vec::new());
        definition.information_only = true;
        definition
    }

    pub fn validate(&self) -> Result<(), PropertyError> {
        if self.name.is_empty() {
            return Err(PropertyError::EmptyName);
        }
        if self.command.is_empty() && !self.information_only {
            return Err(PropertyError::EmptyCommand {
                name: self.name.clone(),
            });
        }
        if self.kind == PropertyKind::Value {
            if self.clean_command.is_some() {
                return Err(PropertyError::MisplacedAttribute {
                    name: self.name.clone(),
                    attribute: "clean_command",
                });
            }
            if self.remove_command.is_some() {
                return Err(PropertyError::MisplacedAttribute {
                    name: self.name.clone(),
                    attribute: "remove_command",
                });
            }
            if self.null_on_empty {
                return Err(PropertyError::MisplacedAttribute {
                    name: self.name.clone(),
                    attribute: "null_on_empty",
                });
            }
        }
        if self.kind == PropertyKind::Reference && self.information_only {
            return Err(PropertyError::InformationOnlyReference {
                name: self.name.clone(),
            });
        }
        if self.clean_command.is_some() && self.remove_command.is_some() {
            // Only one of the two is ever active; the clean command wins.
            warn!(
                "property `{}` configures both clean_command and remove_command; remove_command is ignored",
                self.name
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_a_configuration_error() {
        let definition = PropertyDefinition::value("", "SetRadius", Vec::new());
        assert_eq!(definition.validate(), Err(PropertyError::EmptyName));
    }

    #[test]
    fn pushable_property_requires_a_command() {
        let definition = PropertyDefinition::value("Radius", "", Vec::new());
        assert!(matches!(
            definition.validate(),
            Err(PropertyError::EmptyCommand { .. })
        ));
    }

    #[test]
    fn information_property_may_omit_the_command_check() {
        let definition = PropertyDefinition::information("TimestepValues", "GetTimestepValues");
        assert_eq!(definition.validate(), Ok(()));
    }

    #[test]
    fn reference_attributes_are_rejected_on_scalars() {
        let mut definition = PropertyDefinition::value("Radius", "SetRadius", Vec::new());
        definition.clean_command = Some("RemoveAllInputs".to_string());
        assert_eq!(
            definition.validate(),
            Err(PropertyError::MisplacedAttribute {
                name: "Radius".to_string(),
                attribute: "clean_command",
            })
        );
    }

    #[test]
    fn information_only_references_are_rejected() {
        let mut definition = PropertyDefinition::reference("Input", "AddInputConnection");
        definition.information_only = true;
        assert!(matches!(
            definition.validate(),
            Err(PropertyError::InformationOnlyReference { .. })
        ));
    }

    #[test]
    fn argument_type_defaults_to_native() {
        let definition: PropertyDefinition =
            serde_json::from_str(r#"{ "name": "Input", "command": "AddInputConnection", "kind": "reference" }"#)
                .unwrap();
        assert_eq!(definition.argument_type, ReferenceKind::Native);
    }

    #[test]
    fn argument_type_uses_schema_vocabulary() {
        let definition: PropertyDefinition = serde_json::from_str(
            r#"{ "name": "Source", "command": "SetSource", "kind": "reference", "argument_type": "SMProxy" }"#,
        )
        .unwrap();
        assert_eq!(definition.argument_type, ReferenceKind::Proxy);
    }
}
