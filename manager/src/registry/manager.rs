use std::collections::HashMap;

use log::warn;

use crate::ident::GlobalId;
use crate::link::LinkRegistry;
use crate::message::ProxyState;
use crate::session::Session;

use super::definition::DefinitionRegistry;
use super::error::RegistryError;
use super::state_file::{CollectionItem, ProxyCollection, ServerManagerState};

/// The name-keyed view over the session's proxies.
///
/// The manager never owns a proxy; it owns the definitions they are built
/// from and a `(group, name)` index of global ids. Everything stateful is
/// resolved through the session.
pub struct ProxyManager {
    definitions: DefinitionRegistry,
    registered: HashMap<(String, String), GlobalId>,
    order: Vec<(String, String)>,
}

impl ProxyManager {
    pub fn new(definitions: DefinitionRegistry) -> Self {
        Self {
            definitions,
            registered: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    pub fn definitions_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.definitions
    }

    /// Instantiate a definition and hand the proxy to the session. The proxy
    /// is not yet registered under a name; callers decide whether it appears
    /// in the name index.
    pub fn new_proxy(
        &self,
        session: &mut Session,
        group: &str,
        proxy_type: &str,
    ) -> Result<GlobalId, RegistryError> {
        let proxy = {
            let mut next_id = || session.next_global_id();
            self.definitions.instantiate(group, proxy_type, &mut next_id)?
        };
        Ok(session.register_proxy(proxy))
    }

    /// File a proxy under a user-visible name. Re-registering a taken name
    /// replaces the entry and warns.
    pub fn register(&mut self, group: &str, name: &str, id: GlobalId) {
        let key = (group.to_string(), name.to_string());
        if self.registered.insert(key.clone(), id).is_some() {
            warn!("`{}.{}` was already registered, overwriting", group, name);
        } else {
            self.order.push(key);
        }
    }

    pub fn unregister(&mut self, group: &str, name: &str) -> Option<GlobalId> {
        let key = (group.to_string(), name.to_string());
        let removed = self.registered.remove(&key);
        if removed.is_some() {
            self.order.retain(|existing| *existing != key);
        }
        removed
    }

    pub fn find(&self, group: &str, name: &str) -> Option<GlobalId> {
        self.registered
            .get(&(group.to_string(), name.to_string()))
            .copied()
    }

    pub fn names_in_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = (&'a str, GlobalId)> + 'a {
        self.order
            .iter()
            .filter(move |(existing_group, _)| existing_group == group)
            .filter_map(|key| {
                self.registered
                    .get(key)
                    .map(|id| (key.1.as_str(), *id))
            })
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Push pending modifications of every registered proxy, in registration
    /// order. Entries whose proxy has disappeared from the session are
    /// skipped with a warning.
    pub fn update_all_registered(&self, session: &mut Session) -> Result<(), RegistryError> {
        for key in &self.order {
            let Some(id) = self.registered.get(key) else {
                continue;
            };
            if !session.is_registered(*id) {
                warn!(
                    "`{}.{}` points at {} which is no longer alive, skipping",
                    key.0, key.1, id
                );
                continue;
            }
            session.update_proxy(*id)?;
        }
        Ok(())
    }

    /// Capture everything needed to rebuild this manager's world: each
    /// registered proxy's full state, the name collections, and the links.
    pub fn save_state(&self, session: &Session, links: &LinkRegistry) -> ServerManagerState {
        let mut state = ServerManagerState::new();
        let mut seen = Vec::new();
        for (group, name) in &self.order {
            let Some(id) = self.registered.get(&(group.clone(), name.clone())) else {
                continue;
            };
            let index = match state
                .collections
                .iter()
                .position(|collection| collection.name == *group)
            {
                Some(index) => index,
                None => {
                    state.collections.push(ProxyCollection {
                        name: group.clone(),
                        items: Vec::new(),
                    });
                    state.collections.len() - 1
                }
            };
            state.collections[index].items.push(CollectionItem {
                id: *id,
                name: name.clone(),
            });
            if !seen.contains(id) {
                seen.push(*id);
                if let Some(proxy) = session.proxy(*id) {
                    state.proxies.push(proxy.full_state());
                }
            }
        }
        state.links = links.save_states();
        state
    }

    /// Rebuild proxies, name registrations and links from a state file. The
    /// proxies are re-created in the session and pushed; collection entries
    /// whose proxy state is missing are skipped with a warning.
    pub fn load_state(
        &mut self,
        session: &mut Session,
        links: &mut LinkRegistry,
        state: &ServerManagerState,
    ) -> Result<(), RegistryError> {
        for proxy_state in &state.proxies {
            claim_state_ids(session, proxy_state);
            session.restore_proxy_silently(proxy_state)?;
        }
        for collection in &state.collections {
            for item in &collection.items {
                if !session.is_registered(item.id) {
                    warn!(
                        "state file names `{}.{}` as {} but carries no state for it, skipping",
                        collection.name, item.name, item.id
                    );
                    continue;
                }
                self.register(&collection.name, &item.name, item.id);
            }
        }
        links.load_states(&state.links, session)?;
        Ok(())
    }
}

/// Reserve every id a persisted proxy carries before it is rebuilt.
fn claim_state_ids(session: &mut Session, state: &ProxyState) {
    session.claim_id(state.global_id);
    if let Some(native) = state.native_id {
        session.claim_id(native);
    }
    for (_, sub_state) in &state.sub_proxies {
        claim_state_ids(session, sub_state);
    }
}
