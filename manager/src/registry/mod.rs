mod definition;
mod error;
mod manager;
mod state_file;

pub use definition::{DefinitionRegistry, ProxyCustomizer, ProxyDefinition, SubProxyDefinition};
pub use error::RegistryError;
pub use manager::ProxyManager;
pub use state_file::{
    CollectionItem, ProxyCollection, ServerManagerState, STATE_VERSION,
};
