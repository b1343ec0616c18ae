use crate::ident::GlobalId;
use crate::session::Session;

use super::error::LinkError;
use super::link::{copy_property, Cascade, EndpointState, LinkDirection};

/// One (proxy, property) pair participating in a property link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEndpoint {
    pub id: GlobalId,
    pub property: String,
    pub direction: LinkDirection,
}

/// Mirrors individual properties, which need not share a name, between
/// proxies. The finest-grained link kind.
#[derive(Debug, Clone, Default)]
pub struct PropertyLink {
    endpoints: Vec<PropertyEndpoint>,
    fired: bool,
}

impl PropertyLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_endpoint(&mut self, id: GlobalId, property: &str, direction: LinkDirection) {
        self.endpoints.push(PropertyEndpoint {
            id,
            property: property.to_string(),
            direction,
        });
    }

    pub fn endpoints(&self) -> &[PropertyEndpoint] {
        &self.endpoints
    }

    fn matches_input(&self, id: GlobalId, property: &str) -> bool {
        self.endpoints.iter().any(|endpoint| {
            endpoint.id == id && endpoint.property == property && endpoint.direction.is_input()
        })
    }

    pub(super) fn on_property_modified(
        &mut self,
        session: &mut Session,
        source: GlobalId,
        property: &str,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        if self.fired || !self.matches_input(source, property) {
            return Ok(());
        }
        self.fired = true;
        let targets: Vec<(GlobalId, String)> = self
            .endpoints
            .iter()
            .filter(|endpoint| {
                endpoint.direction.is_output()
                    && !(endpoint.id == source && endpoint.property == property)
            })
            .map(|endpoint| (endpoint.id, endpoint.property.clone()))
            .collect();
        for (target, target_property) in targets {
            if cascade.already_visited(target, &target_property) {
                continue;
            }
            if copy_property(session, source, property, target, &target_property)? {
                cascade.record(target, &target_property);
            }
        }
        Ok(())
    }

    pub(super) fn rearm(&mut self) {
        self.fired = false;
    }

    pub(super) fn endpoint_states(&self) -> Vec<EndpointState> {
        self.endpoints
            .iter()
            .map(|endpoint| EndpointState {
                id: endpoint.id,
                direction: endpoint.direction,
                property: Some(endpoint.property.clone()),
            })
            .collect()
    }

    /// Rebuild from persisted endpoints. Every endpoint of a property link
    /// must name a property; a stateless endpoint fails the load.
    pub(super) fn from_endpoint_states(
        name: &str,
        states: &[EndpointState],
    ) -> Result<Self, LinkError> {
        let mut link = Self::new();
        for state in states {
            let property =
                state
                    .property
                    .as_deref()
                    .ok_or_else(|| LinkError::MissingEndpointProperty {
                        link: name.to_string(),
                        id: state.id,
                    })?;
            link.add_endpoint(state.id, property, state.direction);
        }
        Ok(link)
    }
}
