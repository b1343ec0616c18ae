use std::collections::HashMap;

use log::warn;

use crate::session::Session;

use super::error::LinkError;
use super::link::{Cascade, Link, LinkState};
use crate::ident::GlobalId;

/// All links of one server manager, keyed by user-visible name.
///
/// Notifications cascade: a value copied into a linked proxy is itself
/// treated as a modification, so chains of links settle in one call. Each
/// link fires at most once per cascade, which is what terminates cycles.
#[derive(Default)]
pub struct LinkRegistry {
    order: Vec<String>,
    links: HashMap<String, Link>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, link: Link) {
        if self.links.insert(name.to_string(), link).is_some() {
            warn!("link `{}` was already registered, overwriting", name);
        } else {
            self.order.push(name.to_string());
        }
    }

    pub fn unregister(&mut self, name: &str) -> Option<Link> {
        let removed = self.links.remove(name);
        if removed.is_some() {
            self.order.retain(|existing| existing != name);
        }
        removed
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|name| name.as_str())
    }

    /// Fan a property modification out through every link, following copies
    /// transitively until the cascade settles. The origin pair counts as
    /// visited, so opposite-direction links never write back into it.
    pub fn notify_property_modified(
        &mut self,
        session: &mut Session,
        id: GlobalId,
        property: &str,
    ) -> Result<(), LinkError> {
        let mut cascade = Cascade::seeded(id, property);
        let result = self.run_cascade(session, &mut cascade);
        for link in self.links.values_mut() {
            link.rearm();
        }
        result
    }

    /// Tell every propagate-updates link that a proxy was pushed.
    pub fn notify_proxy_updated(
        &mut self,
        session: &mut Session,
        id: GlobalId,
    ) -> Result<(), LinkError> {
        let mut result = Ok(());
        for name in self.order.clone() {
            if let Some(link) = self.links.get_mut(&name) {
                if let Err(error) = link.on_proxy_updated(session, id) {
                    result = Err(error);
                    break;
                }
            }
        }
        for link in self.links.values_mut() {
            link.rearm();
        }
        result
    }

    fn run_cascade(
        &mut self,
        session: &mut Session,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        while let Some((source, property)) = cascade.pop() {
            for name in self.order.clone() {
                if let Some(link) = self.links.get_mut(&name) {
                    link.on_property_modified(session, source, &property, cascade)?;
                }
            }
        }
        Ok(())
    }

    /// Persisted form of every link, in registration order.
    pub fn save_states(&self) -> Vec<LinkState> {
        self.order
            .iter()
            .filter_map(|name| self.links.get(name).map(|link| link.to_state(name)))
            .collect()
    }

    /// Re-attach persisted links against the live registry. Fails on the
    /// first link whose endpoints cannot be resolved.
    pub fn load_states(&mut self, states: &[LinkState], session: &Session) -> Result<(), LinkError> {
        for state in states {
            let link = Link::from_state(state, session)?;
            self.register(&state.name, link);
        }
        Ok(())
    }
}
