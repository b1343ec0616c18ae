mod global_id;
mod id_allocator;
mod location;

pub use global_id::{GlobalId, RESERVED_ID_MAX};
pub use id_allocator::IdAllocator;
pub use location::Location;
