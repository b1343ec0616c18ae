use std::collections::HashMap;

use log::{debug, warn};
use vizsync_codec::Variant;

use crate::ident::{GlobalId, IdAllocator, Location};
use crate::message::{Message, ProxyState, Stream};
use crate::property::{ObjectResolver, PropertyError, ReferenceKind};
use crate::proxy::{Proxy, ProxyError};
use crate::undo::{Capture, UndoElement, UndoError, UndoSet, UndoStack};

use super::controller::ProcessController;
use super::error::SessionError;

/// Resolves reference arguments against the session's live registry.
///
/// `VTK`-kinded references resolve to the referenced proxy's wrapped native
/// object; `SMProxy` and `Kernel` references resolve to the proxy's own
/// global id.
struct RegistryResolver<'a> {
    registry: &'a HashMap<GlobalId, Proxy>,
}

impl ObjectResolver for RegistryResolver<'_> {
    fn resolve(&self, id: GlobalId, kind: ReferenceKind) -> Option<GlobalId> {
        let proxy = self.registry.get(&id)?;
        match kind {
            ReferenceKind::Native => proxy.native_id(),
            ReferenceKind::Proxy | ReferenceKind::Kernel => Some(proxy.global_id()),
        }
    }
}

/// Before-states captured while an undo set records. After-states are read
/// from the registry when the set closes, so elements describe exactly the
/// net transition between the two boundaries.
struct PendingSet {
    label: String,
    order: Vec<GlobalId>,
    before: HashMap<GlobalId, Capture>,
}

impl PendingSet {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            order: Vec::new(),
            before: HashMap::new(),
        }
    }

    fn capture(&mut self, id: GlobalId, registry: &HashMap<GlobalId, Proxy>) {
        if self.before.contains_key(&id) {
            return;
        }
        let capture = match registry.get(&id) {
            Some(proxy) => Capture::Present(proxy.full_state()),
            None => Capture::Absent,
        };
        self.order.push(id);
        self.before.insert(id, capture);
    }

    fn finalize(mut self, registry: &HashMap<GlobalId, Proxy>) -> UndoSet {
        let mut set = UndoSet::new(&self.label);
        for id in &self.order {
            let Some(before) = self.before.remove(id) else {
                continue;
            };
            let after = match registry.get(id) {
                Some(proxy) => Capture::Present(proxy.full_state()),
                None => Capture::Absent,
            };
            if before == after {
                continue;
            }
            match UndoElement::transition(*id, before, after) {
                Ok(element) => set.add(element),
                Err(error) => warn!("dropping undo capture for {}: {}", id, error),
            }
        }
        set
    }
}

/// The single dispatch point between client-side proxies and the server
/// processes.
///
/// The session exclusively owns the id-to-proxy registry, allocates every
/// global id, routes messages by location against its capability, and
/// records undo sets across the operations it performs. All other components
/// hold ids and resolve them here.
pub struct Session {
    allocator: IdAllocator,
    registry: HashMap<GlobalId, Proxy>,
    data: Box<dyn ProcessController>,
    render: Option<Box<dyn ProcessController>>,
    capability: Location,
    undo_stack: UndoStack,
    pending: Option<PendingSet>,
}

impl Session {
    /// A session whose data server doubles as the render server.
    pub fn new(data: Box<dyn ProcessController>) -> Self {
        Self {
            allocator: IdAllocator::new(),
            registry: HashMap::new(),
            data,
            render: None,
            capability: Location::CLIENT | Location::DATA_SERVER | Location::DATA_SERVER_ROOT,
            undo_stack: UndoStack::new(),
            pending: None,
        }
    }

    /// A session with a dedicated render-server connection.
    pub fn with_render_server(
        data: Box<dyn ProcessController>,
        render: Box<dyn ProcessController>,
    ) -> Self {
        let mut session = Self::new(data);
        session.render = Some(render);
        session.capability =
            session.capability | Location::RENDER_SERVER | Location::RENDER_SERVER_ROOT;
        session
    }

    pub fn has_render_server(&self) -> bool {
        self.render.is_some()
    }

    pub fn capability(&self) -> Location {
        self.capability
    }

    pub fn next_global_id(&mut self) -> GlobalId {
        self.allocator.next_id()
    }

    /// Adopt an id minted elsewhere, typically read from a state file, so
    /// future allocations cannot collide with it.
    pub fn claim_id(&mut self, id: GlobalId) {
        self.allocator.advance_past(id);
    }

    /// Id of a session-scoped singleton. Stable across sessions.
    pub fn reserved_id(slot: u8) -> GlobalId {
        IdAllocator::reserved(slot)
    }

    /// The location mask a message will actually reach: render-server bits
    /// degrade to data-server bits when no render connection exists, then
    /// the result is clipped to this session's capability.
    pub fn route(&self, location: Location) -> Location {
        let effective = if self.render.is_some() {
            location
        } else {
            location.demote_render_to_data()
        };
        effective & self.capability
    }

    /// Route a message to every server process its location selects.
    pub fn push(&mut self, message: &Message) -> Result<(), SessionError> {
        let effective = self.route(message.location);
        if effective.is_none() {
            debug!(
                "message for {} routes nowhere (location {:?})",
                message.global_id, message.location
            );
            return Ok(());
        }
        let routed = message.retargeted(effective);
        if effective.intersects(Location::DATA_SERVER | Location::DATA_SERVER_ROOT) {
            self.data.process(&routed)?;
        }
        if effective.intersects(Location::RENDER_SERVER | Location::RENDER_SERVER_ROOT) {
            if let Some(render) = self.render.as_mut() {
                render.process(&routed)?;
            }
        }
        Ok(())
    }

    /// Take ownership of a proxy. The id must have been allocated by this
    /// session and never registered before.
    ///
    /// # Panics
    ///
    /// Panics if a proxy is already registered under the same id; ids are
    /// never reused, so a duplicate is a programming error.
    pub fn register_proxy(&mut self, proxy: Proxy) -> GlobalId {
        let id = proxy.global_id();
        self.capture_before(id);
        if self.registry.insert(id, proxy).is_some() {
            panic!("a proxy is already registered under {}", id);
        }
        id
    }

    pub fn is_registered(&self, id: GlobalId) -> bool {
        self.registry.contains_key(&id)
    }

    pub fn proxy(&self, id: GlobalId) -> Option<&Proxy> {
        self.registry.get(&id)
    }

    /// Mutable access to a registered proxy. Recorded as a touch in the open
    /// undo set, if any.
    pub fn proxy_mut(&mut self, id: GlobalId) -> Option<&mut Proxy> {
        self.capture_before(id);
        self.registry.get_mut(&id)
    }

    pub fn proxy_count(&self) -> usize {
        self.registry.len()
    }

    /// Instantiate the proxy's remote objects if they do not exist yet.
    /// Calling this again is a no-op.
    pub fn create_proxy_objects(&mut self, id: GlobalId) -> Result<(), SessionError> {
        self.capture_before(id);
        let proxy = self
            .registry
            .get_mut(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let Some(stream) = proxy.creation_stream(&mut self.allocator) else {
            return Ok(());
        };
        let location = proxy.location();
        self.push(&Message::instructions(id, location, stream))
    }

    /// Aggregate every modified property into one stream and send it in a
    /// single round trip. Ensures the remote objects exist first, so a plain
    /// update on a fresh proxy instantiates and configures it in one call.
    pub fn update_proxy(&mut self, id: GlobalId) -> Result<(), SessionError> {
        self.capture_before(id);
        self.create_proxy_objects(id)?;
        // The proxy leaves the registry while its stream is assembled so the
        // resolver can read the other entries.
        let mut proxy = self
            .registry
            .remove(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let result = proxy.modified_stream(&RegistryResolver {
            registry: &self.registry,
        });
        let location = proxy.location();
        self.registry.insert(id, proxy);
        let stream = result?;
        if stream.is_empty() {
            return Ok(());
        }
        self.push(&Message::instructions(id, location, stream))?;
        if let Some(proxy) = self.registry.get_mut(&id) {
            proxy.mark_synchronized();
        }
        Ok(())
    }

    /// Assign new elements to a scalar property. Properties flagged
    /// immediate-update are pushed in the same call; everything else stays
    /// staged until the next update.
    pub fn set_property_elements(
        &mut self,
        id: GlobalId,
        name: &str,
        elements: Vec<Variant>,
    ) -> Result<(), SessionError> {
        self.capture_before(id);
        let proxy = self
            .registry
            .get_mut(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let property = proxy
            .property_mut(name)
            .ok_or_else(|| ProxyError::UnknownProperty {
                id,
                name: name.to_string(),
            })?;
        let kind = property.kind_name();
        let immediate = property.immediate_update();
        let value = property
            .as_value_mut()
            .ok_or(ProxyError::Property(PropertyError::InvalidElements {
                name: name.to_string(),
                kind,
            }))?;
        value.set_elements(elements).map_err(ProxyError::from)?;
        if immediate {
            self.update_proxy(id)?;
        }
        Ok(())
    }

    /// Remove a proxy and delete its remote objects. The single deletion
    /// path; everything else funnels through here.
    pub fn unregister_proxy(&mut self, id: GlobalId) -> Result<(), SessionError> {
        self.capture_before(id);
        self.remove_proxy_silently(id)
    }

    /// Send the proxy's complete state as one self-applying message.
    pub fn push_full_state(&mut self, id: GlobalId) -> Result<(), SessionError> {
        let proxy = self
            .registry
            .get(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let message = Message::state(proxy.location(), proxy.full_state());
        self.push(&message)
    }

    /// Refresh an information-only property from the remote side. The local
    /// value is replaced only if the round trip succeeds.
    pub fn pull_property(&mut self, id: GlobalId, name: &str) -> Result<(), SessionError> {
        let proxy = self
            .registry
            .get(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let property = proxy
            .property(name)
            .ok_or_else(|| ProxyError::UnknownProperty {
                id,
                name: name.to_string(),
            })?;
        if !property.is_information_only() {
            return Err(SessionError::Proxy(ProxyError::Property(
                PropertyError::InvalidPull {
                    name: name.to_string(),
                    kind: property.kind_name(),
                },
            )));
        }
        let command = property.command().to_string();
        let native = proxy
            .native_id()
            .ok_or(ProxyError::ObjectsNotCreated { id })?;
        let values = self.data.pull(native, &command).map_err(SessionError::from)?;
        if let Some(property) = self
            .registry
            .get_mut(&id)
            .and_then(|proxy| proxy.property_mut(name))
        {
            property.pull(values).map_err(ProxyError::from)?;
        }
        Ok(())
    }

    /// Invoke a method on the proxy's wrapped native object, outside any
    /// property. Used for actions like triggering a render.
    pub fn invoke(
        &mut self,
        id: GlobalId,
        method: &str,
        args: Vec<Variant>,
    ) -> Result<(), SessionError> {
        let proxy = self
            .registry
            .get(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let native = proxy
            .native_id()
            .ok_or(ProxyError::ObjectsNotCreated { id })?;
        let location = proxy.location();
        let mut stream = Stream::new();
        stream.invoke(native, method, args);
        self.push(&Message::instructions(id, location, stream))
    }

    // ---- undo recording ----

    /// Open a labeled undo set. Every proxy touched until the matching
    /// `end_undo_set` has its before-state captured on first touch.
    pub fn begin_undo_set(&mut self, label: &str) {
        if self.pending.is_some() {
            warn!(
                "undo set `{}` opened while another was recording; the older one is discarded",
                label
            );
        }
        self.pending = Some(PendingSet::new(label));
    }

    /// Close the open undo set and file it, dropping no-op captures.
    pub fn end_undo_set(&mut self) {
        let Some(pending) = self.pending.take() else {
            warn!("end_undo_set without a matching begin_undo_set");
            return;
        };
        let set = pending.finalize(&self.registry);
        if !set.is_empty() {
            self.undo_stack.push(set);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.undo_label()
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.undo_stack.redo_label()
    }

    /// Revert the most recent set, element by element in reverse order. On
    /// failure the set stays on the undo stack.
    pub fn undo(&mut self) -> Result<(), UndoError> {
        if self.pending.is_some() {
            return Err(UndoError::SetStillOpen);
        }
        let set = self
            .undo_stack
            .pop_undo()
            .ok_or(UndoError::NothingToUndo)?;
        let mut failure = None;
        for element in set.elements().iter().rev() {
            if let Err(error) = element.undo(self) {
                failure = Some(error);
                break;
            }
        }
        match failure {
            Some(error) => {
                warn!("undo of `{}` failed: {}", set.label(), error);
                self.undo_stack.restore_undo(set);
                Err(error)
            }
            None => {
                self.undo_stack.restore_redo(set);
                Ok(())
            }
        }
    }

    /// Replay the most recently undone set in forward order.
    pub fn redo(&mut self) -> Result<(), UndoError> {
        if self.pending.is_some() {
            return Err(UndoError::SetStillOpen);
        }
        let set = self
            .undo_stack
            .pop_redo()
            .ok_or(UndoError::NothingToRedo)?;
        let mut failure = None;
        for element in set.elements() {
            if let Err(error) = element.redo(self) {
                failure = Some(error);
                break;
            }
        }
        match failure {
            Some(error) => {
                warn!("redo of `{}` failed: {}", set.label(), error);
                self.undo_stack.restore_redo(set);
                Err(error)
            }
            None => {
                self.undo_stack.restore_undo(set);
                Ok(())
            }
        }
    }

    fn capture_before(&mut self, id: GlobalId) {
        if let Some(pending) = self.pending.as_mut() {
            pending.capture(id, &self.registry);
        }
    }

    // ---- replay plumbing, bypasses undo capture ----

    /// Remove a proxy and delete its remote objects without recording the
    /// transition.
    pub(crate) fn remove_proxy_silently(&mut self, id: GlobalId) -> Result<(), SessionError> {
        let mut proxy = self
            .registry
            .remove(&id)
            .ok_or(SessionError::UnknownGlobalId { id })?;
        let stream = proxy.deletion_stream();
        let location = proxy.location();
        if !stream.is_empty() {
            self.push(&Message::instructions(id, location, stream))?;
        }
        Ok(())
    }

    /// Bring a proxy to the captured state: load it over the live proxy, or
    /// rebuild and re-register it if it no longer exists, then create and
    /// push as needed.
    pub(crate) fn restore_proxy_silently(&mut self, state: &ProxyState) -> Result<(), SessionError> {
        let id = state.global_id;
        match self.registry.remove(&id) {
            Some(mut proxy) => {
                let result = proxy.load_state(state);
                self.registry.insert(id, proxy);
                result?;
            }
            None => {
                let proxy = Proxy::from_state(state)?;
                self.registry.insert(id, proxy);
            }
        }
        self.create_proxy_objects(id)?;
        self.update_proxy(id)
    }
}
