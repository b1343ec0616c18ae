use log::debug;
use serde::{Deserialize, Serialize};

use crate::ident::GlobalId;
use crate::proxy::ProxyError;
use crate::session::Session;

use super::camera_link::CameraLink;
use super::error::LinkError;
use super::property_link::PropertyLink;

/// Which way values flow through an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkDirection {
    Input,
    Output,
    InputOutput,
}

impl LinkDirection {
    pub fn is_input(&self) -> bool {
        matches!(self, LinkDirection::Input | LinkDirection::InputOutput)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, LinkDirection::Output | LinkDirection::InputOutput)
    }
}

/// One proxy participating in a proxy-level link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub id: GlobalId,
    pub direction: LinkDirection,
}

/// The worklist of one notification: pending copies still to fan out, and
/// every `(proxy, property)` pair already written.
///
/// The visited list is seeded with the origin, so a cycle of links can never
/// copy back into the property the user just changed.
pub(super) struct Cascade {
    pending: Vec<(GlobalId, String)>,
    visited: Vec<(GlobalId, String)>,
}

impl Cascade {
    pub(super) fn seeded(id: GlobalId, property: &str) -> Self {
        let entry = (id, property.to_string());
        Self {
            pending: vec![entry.clone()],
            visited: vec![entry],
        }
    }

    pub(super) fn pop(&mut self) -> Option<(GlobalId, String)> {
        self.pending.pop()
    }

    pub(super) fn already_visited(&self, id: GlobalId, property: &str) -> bool {
        self.visited
            .iter()
            .any(|(visited_id, visited_property)| *visited_id == id && visited_property == property)
    }

    /// Record a completed copy so it fans out further but is never repeated.
    pub(super) fn record(&mut self, id: GlobalId, property: &str) {
        let entry = (id, property.to_string());
        self.pending.push(entry.clone());
        self.visited.push(entry);
    }
}

/// Copy one property's current value between two proxies, without pushing.
///
/// The copied value is only marked modified; the caller decides when the
/// target proxy is updated. Returns `Ok(false)` when the target simply does
/// not carry the property, which is not an error for links.
pub(super) fn copy_property(
    session: &mut Session,
    source: GlobalId,
    source_property: &str,
    target: GlobalId,
    target_property: &str,
) -> Result<bool, LinkError> {
    let mut snapshot = session
        .proxy(source)
        .ok_or(LinkError::UnknownProxy { id: source })?
        .property_snapshot(source_property)
        .ok_or_else(|| LinkError::UnknownProperty {
            id: source,
            name: source_property.to_string(),
        })?;
    snapshot.name = target_property.to_string();
    let proxy = session
        .proxy_mut(target)
        .ok_or(LinkError::UnknownProxy { id: target })?;
    match proxy.load_property_snapshot(target_property, &snapshot) {
        Ok(()) => Ok(true),
        Err(ProxyError::UnknownProperty { .. }) => {
            debug!(
                "link target {} has no `{}`, value not copied",
                target, target_property
            );
            Ok(false)
        }
        Err(error) => Err(LinkError::CopyFailed {
            name: target_property.to_string(),
            origin: source,
            target,
            reason: error.to_string(),
        }),
    }
}

/// Mirrors every shared property between its endpoints: a change on any
/// input endpoint is copied to every output endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProxyLink {
    endpoints: Vec<Endpoint>,
    propagate_updates: bool,
    fired: bool,
}

impl ProxyLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_endpoint(&mut self, id: GlobalId, direction: LinkDirection) {
        self.endpoints.push(Endpoint { id, direction });
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// When set, an update of an input endpoint also updates every output
    /// endpoint.
    pub fn set_propagate_updates(&mut self, propagate: bool) {
        self.propagate_updates = propagate;
    }

    pub fn propagate_updates(&self) -> bool {
        self.propagate_updates
    }

    pub(super) fn fired(&self) -> bool {
        self.fired
    }

    pub(super) fn set_fired(&mut self) {
        self.fired = true;
    }

    pub(super) fn rearm_inner(&mut self) {
        self.fired = false;
    }

    pub(super) fn is_input(&self, id: GlobalId) -> bool {
        self.endpoints
            .iter()
            .any(|endpoint| endpoint.id == id && endpoint.direction.is_input())
    }

    pub(super) fn outputs_excluding(&self, source: GlobalId) -> Vec<GlobalId> {
        self.endpoints
            .iter()
            .filter(|endpoint| endpoint.direction.is_output() && endpoint.id != source)
            .map(|endpoint| endpoint.id)
            .collect()
    }

    pub(super) fn on_property_modified(
        &mut self,
        session: &mut Session,
        source: GlobalId,
        property: &str,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        if self.fired || !self.is_input(source) {
            return Ok(());
        }
        self.fired = true;
        for target in self.outputs_excluding(source) {
            if cascade.already_visited(target, property) {
                continue;
            }
            if copy_property(session, source, property, target, property)? {
                cascade.record(target, property);
            }
        }
        Ok(())
    }

    pub(super) fn on_proxy_updated(
        &mut self,
        session: &mut Session,
        source: GlobalId,
    ) -> Result<(), LinkError> {
        if !self.propagate_updates || self.fired || !self.is_input(source) {
            return Ok(());
        }
        self.fired = true;
        for target in self.outputs_excluding(source) {
            session
                .update_proxy(target)
                .map_err(|error| LinkError::Propagation {
                    reason: error.to_string(),
                })?;
        }
        Ok(())
    }
}

/// A proxy link that only mirrors selection properties, leaving the rest of
/// the proxies' state independent.
#[derive(Debug, Clone, Default)]
pub struct SelectionLink {
    link: ProxyLink,
}

const SELECTION_PREFIX: &str = "Selection";

impl SelectionLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_endpoint(&mut self, id: GlobalId, direction: LinkDirection) {
        self.link.add_endpoint(id, direction);
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        self.link.endpoints()
    }

    pub(super) fn on_property_modified(
        &mut self,
        session: &mut Session,
        source: GlobalId,
        property: &str,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        if !property.starts_with(SELECTION_PREFIX) {
            return Ok(());
        }
        self.link
            .on_property_modified(session, source, property, cascade)
    }
}

/// The closed set of link kinds.
#[derive(Debug, Clone)]
pub enum Link {
    Proxy(ProxyLink),
    Property(PropertyLink),
    Camera(CameraLink),
    Selection(SelectionLink),
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        match self {
            Link::Proxy(_) => LinkKind::Proxy,
            Link::Property(_) => LinkKind::Property,
            Link::Camera(_) => LinkKind::Camera,
            Link::Selection(_) => LinkKind::Selection,
        }
    }

    pub(super) fn on_property_modified(
        &mut self,
        session: &mut Session,
        source: GlobalId,
        property: &str,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        match self {
            Link::Proxy(link) => link.on_property_modified(session, source, property, cascade),
            Link::Property(link) => link.on_property_modified(session, source, property, cascade),
            Link::Camera(link) => link.on_property_modified(session, source, property, cascade),
            Link::Selection(link) => link.on_property_modified(session, source, property, cascade),
        }
    }

    pub(super) fn on_proxy_updated(
        &mut self,
        session: &mut Session,
        source: GlobalId,
    ) -> Result<(), LinkError> {
        match self {
            Link::Proxy(link) => link.on_proxy_updated(session, source),
            Link::Property(_) | Link::Camera(_) | Link::Selection(_) => Ok(()),
        }
    }

    /// Clear the once-per-cascade guard.
    pub(super) fn rearm(&mut self) {
        match self {
            Link::Proxy(link) => link.rearm_inner(),
            Link::Property(link) => link.rearm(),
            Link::Camera(link) => link.rearm(),
            Link::Selection(link) => link.link.rearm_inner(),
        }
    }

    pub fn to_state(&self, name: &str) -> LinkState {
        let (endpoints, propagate_updates) = match self {
            Link::Proxy(link) => (
                link.endpoints()
                    .iter()
                    .map(|endpoint| EndpointState {
                        id: endpoint.id,
                        direction: endpoint.direction,
                        property: None,
                    })
                    .collect(),
                link.propagate_updates(),
            ),
            Link::Property(link) => (link.endpoint_states(), false),
            Link::Camera(link) => (
                link.endpoints()
                    .iter()
                    .map(|endpoint| EndpointState {
                        id: endpoint.id,
                        direction: endpoint.direction,
                        property: None,
                    })
                    .collect(),
                false,
            ),
            Link::Selection(link) => (
                link.endpoints()
                    .iter()
                    .map(|endpoint| EndpointState {
                        id: endpoint.id,
                        direction: endpoint.direction,
                        property: None,
                    })
                    .collect(),
                false,
            ),
        };
        LinkState {
            name: name.to_string(),
            kind: self.kind(),
            endpoints,
            propagate_updates,
        }
    }

    /// Rebuild a link from persisted state. Every endpoint must resolve to a
    /// live proxy.
    pub fn from_state(state: &LinkState, session: &Session) -> Result<Self, LinkError> {
        for endpoint in &state.endpoints {
            if !session.is_registered(endpoint.id) {
                return Err(LinkError::UnresolvedEndpoint {
                    link: state.name.clone(),
                    id: endpoint.id,
                });
            }
        }
        match state.kind {
            LinkKind::Proxy => {
                let mut link = ProxyLink::new();
                link.set_propagate_updates(state.propagate_updates);
                for endpoint in &state.endpoints {
                    link.add_endpoint(endpoint.id, endpoint.direction);
                }
                Ok(Link::Proxy(link))
            }
            LinkKind::Selection => {
                let mut link = SelectionLink::new();
                for endpoint in &state.endpoints {
                    link.add_endpoint(endpoint.id, endpoint.direction);
                }
                Ok(Link::Selection(link))
            }
            LinkKind::Camera => {
                let mut link = CameraLink::new();
                for endpoint in &state.endpoints {
                    link.add_endpoint(endpoint.id, endpoint.direction);
                }
                Ok(Link::Camera(link))
            }
            LinkKind::Property => Ok(Link::Property(PropertyLink::from_endpoint_states(
                &state.name,
                &state.endpoints,
            )?)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    Proxy,
    Property,
    Camera,
    Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointState {
    pub id: GlobalId,
    pub direction: LinkDirection,
    #[serde(default)]
    pub property: Option<String>,
}

/// The persisted form of a link, as stored in a state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkState {
    pub name: String,
    pub kind: LinkKind,
    pub endpoints: Vec<EndpointState>,
    #[serde(default)]
    pub propagate_updates: bool,
}
