mod builtin;
mod connect;
mod controller;
mod dispatcher;
mod error;
#[allow(clippy::module_inception)]
mod session;

pub use builtin::BuiltinController;
pub use connect::{
    establish, ConnectAbort, ConnectError, Connector, Scheme, ServerUrl, DEFAULT_DATA_PORT,
    DEFAULT_RENDER_PORT,
};
pub use controller::ProcessController;
pub use dispatcher::{Dispatcher, NativeBuilder, NativeFactory, NativeObject};
pub use error::{ControllerError, DispatchError, SessionError};
pub use session::Session;
