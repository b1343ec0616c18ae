mod camera_link;
mod error;
#[allow(clippy::module_inception)]
mod link;
mod property_link;
mod registry;

pub use camera_link::CameraLink;
pub use error::LinkError;
pub use link::{
    Endpoint, EndpointState, Link, LinkDirection, LinkKind, LinkState, ProxyLink, SelectionLink,
};
pub use property_link::{PropertyEndpoint, PropertyLink};
pub use registry::LinkRegistry;
