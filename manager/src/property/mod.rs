mod definition;
mod error;
mod info_property;
#[allow(clippy::module_inception)]
mod property;
mod reference_property;
mod value_property;

pub use definition::{PropertyDefinition, PropertyKind, ReferenceKind};
pub use error::PropertyError;
pub use info_property::InfoProperty;
pub use property::Property;
pub use reference_property::ReferenceProperty;
pub use value_property::ValueProperty;

use crate::ident::GlobalId;

/// Resolves a logical proxy handle to the concrete id a reference argument
/// carries on the wire.
///
/// This indirection is what lets a property hold proxy handles while the wire
/// format only knows object ids; the session's registry implements it.
pub trait ObjectResolver {
    fn resolve(&self, id: GlobalId, kind: ReferenceKind) -> Option<GlobalId>;
}
