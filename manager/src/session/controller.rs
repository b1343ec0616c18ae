use vizsync_codec::Variant;

use crate::ident::GlobalId;
use crate::message::Message;

use super::error::ControllerError;

/// One end of the client-to-server pipe.
///
/// A controller owns the connection to one server process group (data or
/// render) and moves messages across it. The session never talks to a
/// transport directly; it hands every outgoing message to a controller and
/// asks a controller whenever it needs freshly computed values back.
pub trait ProcessController {
    /// Deliver a message for execution. Push traffic is one-way: a controller
    /// reports transport-level failures, but execution failures on the far
    /// side do not travel back through this call.
    fn process(&mut self, message: &Message) -> Result<(), ControllerError>;

    /// Invoke a gather method on a remote object and return its result. This
    /// is the only remote-to-client data path.
    fn pull(&mut self, id: GlobalId, method: &str) -> Result<Vec<Variant>, ControllerError>;
}
