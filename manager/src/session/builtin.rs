use log::warn;
use vizsync_codec::{ByteReader, ByteWriter, Variant, Wire};

use crate::ident::GlobalId;
use crate::message::{Message, Payload};

use super::controller::ProcessController;
use super::dispatcher::{Dispatcher, NativeFactory};
use super::error::ControllerError;

/// A controller whose "server" runs in-process.
///
/// Messages still make a full trip through the wire codec before the
/// dispatcher sees them, so the builtin configuration exercises exactly the
/// bytes a socket transport would carry.
pub struct BuiltinController {
    dispatcher: Dispatcher,
}

impl BuiltinController {
    pub fn new(factory: NativeFactory) -> Self {
        Self {
            dispatcher: Dispatcher::new(factory),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn round_trip(message: &Message) -> Result<Message, ControllerError> {
        let mut writer = ByteWriter::new();
        message.ser(&mut writer);
        let bytes = writer.to_bytes();
        let mut reader = ByteReader::new(&bytes);
        Ok(Message::de(&mut reader)?)
    }
}

impl ProcessController for BuiltinController {
    fn process(&mut self, message: &Message) -> Result<(), ControllerError> {
        let received = Self::round_trip(message)?;
        let result = match &received.payload {
            Payload::Instructions(stream) => self.dispatcher.execute(stream),
            Payload::State(state) => self.dispatcher.apply_state(state),
        };
        // Push traffic is one-way: execution failures are diagnosed locally
        // instead of travelling back to the sender.
        if let Err(error) = result {
            warn!(
                "builtin server failed executing message for {}: {}",
                received.global_id, error
            );
        }
        Ok(())
    }

    fn pull(&mut self, id: GlobalId, method: &str) -> Result<Vec<Variant>, ControllerError> {
        Ok(self.dispatcher.gather(id, method)?)
    }
}
