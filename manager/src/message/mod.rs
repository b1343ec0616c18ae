mod envelope;
mod instruction;
mod proxy_state;
mod stream;

pub use envelope::{Message, Payload};
pub use instruction::Instruction;
pub use proxy_state::{PropertySnapshot, ProxyState, SnapshotValues};
pub use stream::Stream;
