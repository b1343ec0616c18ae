use crate::ident::GlobalId;
use crate::session::Session;

use super::error::LinkError;
use super::link::{copy_property, Cascade, Endpoint, LinkDirection, ProxyLink};

/// The camera properties kept in lockstep between linked views.
const CAMERA_PROPERTIES: [&str; 3] = ["CameraPosition", "CameraFocalPoint", "CameraViewUp"];

const INFO_SUFFIX: &str = "Info";

/// Keeps the cameras of two or more views synchronized.
///
/// Interaction lands in the information variants of the camera properties;
/// both the plain and the `Info` forms feed the link, and the copied value
/// always lands in the plain form on the other views. Every view that
/// received a new camera is re-rendered.
#[derive(Debug, Clone, Default)]
pub struct CameraLink {
    link: ProxyLink,
}

impl CameraLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_endpoint(&mut self, id: GlobalId, direction: LinkDirection) {
        self.link.add_endpoint(id, direction);
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        self.link.endpoints()
    }

    /// The plain camera property a change to `property` maps onto, or `None`
    /// when the property is not part of the camera set.
    fn base_property(property: &str) -> Option<&'static str> {
        CAMERA_PROPERTIES
            .iter()
            .copied()
            .find(|base| property == *base || property.strip_suffix(INFO_SUFFIX) == Some(*base))
    }

    pub(super) fn on_property_modified(
        &mut self,
        session: &mut Session,
        source: GlobalId,
        property: &str,
        cascade: &mut Cascade,
    ) -> Result<(), LinkError> {
        let Some(base) = Self::base_property(property) else {
            return Ok(());
        };
        if self.link.fired() || !self.link.is_input(source) {
            return Ok(());
        }
        self.link.set_fired();
        for target in self.link.outputs_excluding(source) {
            if cascade.already_visited(target, base) {
                continue;
            }
            if copy_property(session, source, property, target, base)? {
                cascade.record(target, base);
                session
                    .update_proxy(target)
                    .and_then(|_| session.invoke(target, "StillRender", Vec::new()))
                    .map_err(|error| LinkError::Propagation {
                        reason: error.to_string(),
                    })?;
            }
        }
        Ok(())
    }

    pub(super) fn rearm(&mut self) {
        self.link.rearm_inner();
    }
}
