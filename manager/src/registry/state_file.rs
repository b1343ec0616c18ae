use log::info;
use serde::{Deserialize, Serialize};

use crate::ident::GlobalId;
use crate::link::LinkState;
use crate::message::ProxyState;

use super::error::RegistryError;

/// Version written into every state file this build produces.
pub const STATE_VERSION: &str = "3.0";

const CURRENT_MAJOR: u32 = 3;

/// Group names that were renamed in version 3. Files from older versions are
/// rewritten on load.
const LEGACY_GROUP_RENAMES: [(&str, &str); 3] = [
    ("animation_scenes", "animation"),
    ("lookup_tables", "transfer_functions"),
    ("implicit_functions", "slice_functions"),
];

/// One named entry of a registration collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionItem {
    pub id: GlobalId,
    pub name: String,
}

/// The registered names of one group, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyCollection {
    pub name: String,
    pub items: Vec<CollectionItem>,
}

/// The persisted form of a whole server manager: every registered proxy's
/// full state, the name registrations grouping them, and the links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerManagerState {
    pub version: String,
    #[serde(default)]
    pub proxies: Vec<ProxyState>,
    #[serde(default)]
    pub collections: Vec<ProxyCollection>,
    #[serde(default)]
    pub links: Vec<LinkState>,
}

impl Default for ServerManagerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerManagerState {
    pub fn new() -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            proxies: Vec::new(),
            collections: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, RegistryError> {
        serde_json::to_string_pretty(self).map_err(|error| RegistryError::Parse {
            reason: error.to_string(),
        })
    }

    /// Parse a state file, upgrading older versions in place. Files written
    /// by a newer major version are rejected.
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        let mut state: ServerManagerState =
            serde_json::from_str(text).map_err(|error| RegistryError::Parse {
                reason: error.to_string(),
            })?;
        let (major, minor) = parse_version(&state.version)?;
        if major > CURRENT_MAJOR {
            return Err(RegistryError::UnsupportedVersion {
                found: state.version.clone(),
            });
        }
        if major < CURRENT_MAJOR {
            info!(
                "upgrading state file from version {}.{} to {}",
                major, minor, STATE_VERSION
            );
            state.upgrade_group_names();
            state.version = STATE_VERSION.to_string();
        }
        Ok(state)
    }

    fn upgrade_group_names(&mut self) {
        for collection in &mut self.collections {
            if let Some(renamed) = legacy_rename(&collection.name) {
                collection.name = renamed.to_string();
            }
        }
        for proxy in &mut self.proxies {
            if let Some(renamed) = legacy_rename(&proxy.group) {
                proxy.group = renamed.to_string();
            }
        }
    }
}

fn legacy_rename(group: &str) -> Option<&'static str> {
    LEGACY_GROUP_RENAMES
        .iter()
        .find(|(old, _)| *old == group)
        .map(|(_, new)| *new)
}

fn parse_version(text: &str) -> Result<(u32, u32), RegistryError> {
    let mut parts = text.split('.');
    let major = parts
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .ok_or_else(|| RegistryError::Parse {
            reason: format!("`{}` is not a version", text),
        })?;
    let minor = parts
        .next()
        .and_then(|part| part.parse::<u32>().ok())
        .unwrap_or(0);
    Ok((major, minor))
}
