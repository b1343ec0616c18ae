use std::collections::HashMap;

use log::warn;

use crate::ident::{GlobalId, IdAllocator, Location};
use crate::message::{Instruction, PropertySnapshot, ProxyState, Stream};
use crate::property::{ObjectResolver, Property};

use super::error::ProxyError;

/// Lifecycle of a proxy, derived from its creation flags and pending
/// modifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyStatus {
    /// No remote objects exist yet.
    Uninstantiated,
    /// Remote objects exist, no properties have been pushed.
    Created,
    /// Last push succeeded and no modifications are pending.
    Synchronized,
    /// At least one property changed locally and has not been pushed.
    Modified,
    /// Terminal; the remote objects have been deleted.
    Destroyed,
}

/// Client-side stand-in for one or more server-side native objects.
///
/// A proxy owns its properties and its named sub-proxies, knows which native
/// class it instantiates and where, and assembles the instruction streams the
/// session sends. It never talks to a transport itself; the session is the
/// single dispatch point.
pub struct Proxy {
    global_id: GlobalId,
    class_name: String,
    group: String,
    proxy_type: String,
    location: Location,
    /// Wire id of the wrapped native object, assigned at creation.
    native_id: Option<GlobalId>,
    created: bool,
    pushed_once: bool,
    destroyed: bool,
    // Insertion order is kept separately so state dumps are reproducible.
    property_order: Vec<String>,
    properties: HashMap<String, Property>,
    sub_proxy_order: Vec<String>,
    sub_proxies: HashMap<String, Proxy>,
}

impl Proxy {
    pub fn new(
        global_id: GlobalId,
        class_name: &str,
        group: &str,
        proxy_type: &str,
        location: Location,
    ) -> Self {
        Self {
            global_id,
            class_name: class_name.to_string(),
            group: group.to_string(),
            proxy_type: proxy_type.to_string(),
            location,
            native_id: None,
            created: false,
            pushed_once: false,
            destroyed: false,
            property_order: Vec::new(),
            properties: HashMap::new(),
            sub_proxy_order: Vec::new(),
            sub_proxies: HashMap::new(),
        }
    }

    /// Rebuild a proxy from a full-state snapshot with no other side channel.
    pub fn from_state(state: &ProxyState) -> Result<Self, ProxyError> {
        let mut proxy = Proxy::new(
            state.global_id,
            &state.class_name,
            &state.group,
            &state.proxy_type,
            state.location,
        );
        for snapshot in &state.properties {
            proxy.add_property(Property::from_snapshot(snapshot)?);
        }
        for (name, sub_state) in &state.sub_proxies {
            proxy.add_sub_proxy(name, Proxy::from_state(sub_state)?);
        }
        Ok(proxy)
    }

    pub fn global_id(&self) -> GlobalId {
        self.global_id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn proxy_type(&self) -> &str {
        &self.proxy_type
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Wire id of the wrapped native object, once created.
    pub fn native_id(&self) -> Option<GlobalId> {
        self.native_id
    }

    pub fn status(&self) -> ProxyStatus {
        if self.destroyed {
            ProxyStatus::Destroyed
        } else if !self.created {
            ProxyStatus::Uninstantiated
        } else if self.has_modified_properties() {
            ProxyStatus::Modified
        } else if !self.pushed_once {
            ProxyStatus::Created
        } else {
            ProxyStatus::Synchronized
        }
    }

    pub fn has_modified_properties(&self) -> bool {
        self.property_order
            .iter()
            .filter_map(|name| self.properties.get(name))
            .any(|property| property.is_modified())
            || self
                .sub_proxy_order
                .iter()
                .filter_map(|name| self.sub_proxies.get(name))
                .any(|sub| sub.has_modified_properties())
    }

    /// Register a property under its name. Re-adding under an existing name
    /// replaces the entry (and warns); it does not merge.
    pub fn add_property(&mut self, property: Property) {
        let name = property.name().to_string();
        if self.properties.insert(name.clone(), property).is_some() {
            warn!(
                "proxy {}: property `{}` was already registered, overwriting",
                self.global_id, name
            );
        } else {
            self.property_order.push(name);
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.property_order.iter().map(|name| name.as_str())
    }

    pub fn add_sub_proxy(&mut self, name: &str, proxy: Proxy) {
        if self.sub_proxies.insert(name.to_string(), proxy).is_some() {
            warn!(
                "proxy {}: sub-proxy `{}` was already registered, overwriting",
                self.global_id, name
            );
        } else {
            self.sub_proxy_order.push(name.to_string());
        }
    }

    pub fn sub_proxy(&self, name: &str) -> Option<&Proxy> {
        self.sub_proxies.get(name)
    }

    pub fn sub_proxy_mut(&mut self, name: &str) -> Option<&mut Proxy> {
        self.sub_proxies.get_mut(name)
    }

    /// Instructions instantiating the native object(s), or `None` if they
    /// already exist. Side effect happens at most once no matter how often
    /// this is called.
    pub fn creation_stream(&mut self, allocator: &mut IdAllocator) -> Option<Stream> {
        if self.created || self.destroyed {
            return None;
        }
        let mut stream = Stream::new();
        let native = allocator.next_id();
        stream.append(Instruction::New {
            id: native,
            class: self.class_name.clone(),
        });
        self.native_id = Some(native);
        for name in &self.sub_proxy_order {
            let sub = self
                .sub_proxies
                .get_mut(name)
                .expect("sub-proxy order out of sync with map");
            if let Some(sub_stream) = sub.creation_stream(allocator) {
                stream.extend(sub_stream);
            }
        }
        self.created = true;
        Some(stream)
    }

    /// Every wire id this proxy fans out to, sub-proxies included.
    pub fn object_ids(&self) -> Vec<GlobalId> {
        let mut ids = Vec::new();
        if let Some(native) = self.native_id {
            ids.push(native);
        }
        for name in &self.sub_proxy_order {
            if let Some(sub) = self.sub_proxies.get(name) {
                ids.extend(sub.object_ids());
            }
        }
        ids
    }

    /// Assemble push instructions for every modified property (and every
    /// modified sub-proxy property) into one aggregated stream.
    ///
    /// Modified flags clear as values are appended; the caller sends the
    /// stream in one round trip so all targeted processes receive the
    /// identical instruction sequence.
    pub fn modified_stream(&mut self, resolver: &dyn ObjectResolver) -> Result<Stream, ProxyError> {
        if self.destroyed {
            return Err(ProxyError::Destroyed { id: self.global_id });
        }
        let native = self.native_id.ok_or(ProxyError::ObjectsNotCreated {
            id: self.global_id,
        })?;
        let own_id = self.global_id;
        let mut stream = Stream::new();
        for name in &self.property_order {
            let property = self
                .properties
                .get_mut(name)
                .expect("property order out of sync with map");
            if property.is_modified() && property.do_update() {
                let target = if property.update_self() { own_id } else { native };
                property.push(&mut stream, &[target], resolver)?;
            }
        }
        for name in &self.sub_proxy_order {
            let sub = self
                .sub_proxies
                .get_mut(name)
                .expect("sub-proxy order out of sync with map");
            stream.extend(sub.modified_stream(resolver)?);
        }
        Ok(stream)
    }

    /// Record that the last assembled stream was sent.
    pub fn mark_synchronized(&mut self) {
        self.pushed_once = true;
        for sub in self.sub_proxies.values_mut() {
            sub.mark_synchronized();
        }
    }

    /// Instructions deleting every remote object this proxy owns. Terminal;
    /// the receiving side treats deletion of an already-absent id as a no-op.
    pub fn deletion_stream(&mut self) -> Stream {
        let mut stream = Stream::new();
        for name in &self.sub_proxy_order {
            let sub = self
                .sub_proxies
                .get_mut(name)
                .expect("sub-proxy order out of sync with map");
            stream.extend(sub.deletion_stream());
        }
        if let Some(native) = self.native_id {
            stream.append(Instruction::Delete { id: native });
        }
        self.destroyed = true;
        stream
    }

    /// Complete snapshot: every property's current value, identity and
    /// location. The primitive undo/redo and session persistence build on.
    pub fn full_state(&self) -> ProxyState {
        ProxyState {
            global_id: self.global_id,
            location: self.location,
            native_id: self.native_id,
            class_name: self.class_name.clone(),
            group: self.group.clone(),
            proxy_type: self.proxy_type.clone(),
            properties: self
                .property_order
                .iter()
                .filter_map(|name| self.properties.get(name))
                .map(|property| property.snapshot())
                .collect(),
            sub_proxies: self
                .sub_proxy_order
                .iter()
                .filter_map(|name| {
                    self.sub_proxies
                        .get(name)
                        .map(|sub| (name.clone(), sub.full_state()))
                })
                .collect(),
        }
    }

    /// Re-apply a full-state snapshot. Properties named by the snapshot but
    /// absent locally are re-created from it, so an entire configuration can
    /// be restored with no other side channel. Loaded properties are marked
    /// modified; a following update pushes them.
    pub fn load_state(&mut self, state: &ProxyState) -> Result<(), ProxyError> {
        if state.class_name != self.class_name {
            return Err(ProxyError::StateClassMismatch {
                id: self.global_id,
                expected: self.class_name.clone(),
                actual: state.class_name.clone(),
            });
        }
        self.location = state.location;
        for snapshot in &state.properties {
            match self.properties.get_mut(&snapshot.name) {
                Some(property) => property.load_snapshot(snapshot)?,
                None => self.add_property(Property::from_snapshot(snapshot)?),
            }
        }
        for (name, sub_state) in &state.sub_proxies {
            match self.sub_proxies.get_mut(name) {
                Some(sub) => sub.load_state(sub_state)?,
                None => self.add_sub_proxy(name, Proxy::from_state(sub_state)?),
            }
        }
        Ok(())
    }

    pub fn property_snapshot(&self, name: &str) -> Option<PropertySnapshot> {
        self.properties.get(name).map(|property| property.snapshot())
    }

    pub fn load_property_snapshot(
        &mut self,
        name: &str,
        snapshot: &PropertySnapshot,
    ) -> Result<(), ProxyError> {
        let property = self
            .properties
            .get_mut(name)
            .ok_or_else(|| ProxyError::UnknownProperty {
                id: self.global_id,
                name: name.to_string(),
            })?;
        property.load_snapshot(snapshot)?;
        Ok(())
    }
}
