use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::ident::{GlobalId, Location};
use crate::property::{Property, PropertyDefinition};
use crate::proxy::Proxy;

use super::error::RegistryError;

/// A named slot inside a proxy definition, filled by instantiating another
/// definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubProxyDefinition {
    pub name: String,
    pub group: String,
    pub proxy_type: String,
}

fn default_location() -> Location {
    Location::SERVERS
}

/// The parsed form of one proxy definition: which native class to
/// instantiate, where, and with which properties and sub-proxies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyDefinition {
    pub group: String,
    pub proxy_type: String,
    pub class_name: String,
    #[serde(default = "default_location")]
    pub location: Location,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    #[serde(default)]
    pub sub_proxies: Vec<SubProxyDefinition>,
}

impl ProxyDefinition {
    pub fn validate(&self) -> Result<(), RegistryError> {
        for property in &self.properties {
            property.validate()?;
        }
        Ok(())
    }
}

/// A post-instantiation hook, for definitions that need behavior the schema
/// cannot express.
pub type ProxyCustomizer = fn(&mut Proxy);

/// Sub-proxy chains deeper than this are treated as definition cycles.
const MAX_SUB_PROXY_DEPTH: usize = 32;

/// All known proxy definitions, keyed by `(group, type)`.
///
/// Definitions are validated when they enter the registry, so instantiation
/// can assume well-formed attribute combinations.
#[derive(Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<(String, String), ProxyDefinition>,
    customizers: HashMap<(String, String), ProxyCustomizer>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: ProxyDefinition) -> Result<(), RegistryError> {
        definition.validate()?;
        let key = (definition.group.clone(), definition.proxy_type.clone());
        if self.definitions.insert(key, definition).is_some() {
            warn!("a proxy definition was replaced by a re-registration");
        }
        Ok(())
    }

    pub fn register_customizer(&mut self, group: &str, proxy_type: &str, hook: ProxyCustomizer) {
        self.customizers
            .insert((group.to_string(), proxy_type.to_string()), hook);
    }

    pub fn definition(&self, group: &str, proxy_type: &str) -> Option<&ProxyDefinition> {
        self.definitions
            .get(&(group.to_string(), proxy_type.to_string()))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Load a JSON array of definitions, returning how many were added.
    pub fn load_json(&mut self, text: &str) -> Result<usize, RegistryError> {
        let definitions: Vec<ProxyDefinition> =
            serde_json::from_str(text).map_err(|error| RegistryError::Parse {
                reason: error.to_string(),
            })?;
        let count = definitions.len();
        for definition in definitions {
            self.register(definition)?;
        }
        Ok(count)
    }

    /// Build an unregistered proxy from a definition, allocating ids through
    /// `next_id` for it and every sub-proxy.
    pub fn instantiate(
        &self,
        group: &str,
        proxy_type: &str,
        next_id: &mut dyn FnMut() -> GlobalId,
    ) -> Result<Proxy, RegistryError> {
        self.instantiate_at_depth(group, proxy_type, next_id, 0)
    }

    fn instantiate_at_depth(
        &self,
        group: &str,
        proxy_type: &str,
        next_id: &mut dyn FnMut() -> GlobalId,
        depth: usize,
    ) -> Result<Proxy, RegistryError> {
        if depth > MAX_SUB_PROXY_DEPTH {
            return Err(RegistryError::DefinitionCycle {
                group: group.to_string(),
                name: proxy_type.to_string(),
            });
        }
        let definition =
            self.definition(group, proxy_type)
                .ok_or_else(|| RegistryError::UnknownDefinition {
                    group: group.to_string(),
                    name: proxy_type.to_string(),
                })?;
        let mut proxy = Proxy::new(
            next_id(),
            &definition.class_name,
            group,
            proxy_type,
            definition.location,
        );
        for property_definition in &definition.properties {
            proxy.add_property(Property::from_definition(property_definition)?);
        }
        for sub in &definition.sub_proxies {
            let sub_proxy =
                self.instantiate_at_depth(&sub.group, &sub.proxy_type, next_id, depth + 1)?;
            proxy.add_sub_proxy(&sub.name, sub_proxy);
        }
        if let Some(hook) = self
            .customizers
            .get(&(group.to_string(), proxy_type.to_string()))
        {
            hook(&mut proxy);
        }
        Ok(proxy)
    }
}
