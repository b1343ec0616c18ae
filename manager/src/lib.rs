//! # Vizsync Manager
//! Client-side server-manager layer: proxies mirror remote native objects,
//! sessions route typed instruction streams to the server processes, and the
//! registry, links and undo stack keep the mirrored state coherent.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use vizsync_codec::{ByteReader, ByteWriter, CodecError, Variant, Wire};

mod ident;
mod link;
mod message;
mod property;
mod proxy;
mod registry;
mod session;
mod undo;

pub use ident::{GlobalId, IdAllocator, Location, RESERVED_ID_MAX};
pub use link::{
    CameraLink, Endpoint, EndpointState, Link, LinkDirection, LinkError, LinkKind, LinkRegistry,
    LinkState, PropertyEndpoint, PropertyLink, ProxyLink, SelectionLink,
};
pub use message::{
    Instruction, Message, Payload, PropertySnapshot, ProxyState, SnapshotValues, Stream,
};
pub use property::{
    InfoProperty, ObjectResolver, Property, PropertyDefinition, PropertyError, PropertyKind,
    ReferenceKind, ReferenceProperty, ValueProperty,
};
pub use proxy::{Proxy, ProxyError, ProxyStatus};
pub use registry::{
    CollectionItem, DefinitionRegistry, ProxyCollection, ProxyCustomizer, ProxyDefinition,
    ProxyManager, RegistryError, ServerManagerState, SubProxyDefinition, STATE_VERSION,
};
pub use session::{
    establish, BuiltinController, ConnectAbort, ConnectError, Connector, ControllerError,
    DispatchError, Dispatcher, NativeBuilder, NativeFactory, NativeObject, ProcessController,
    Scheme, ServerUrl, Session, SessionError, DEFAULT_DATA_PORT, DEFAULT_RENDER_PORT,
};
pub use undo::{Capture, UndoElement, UndoError, UndoSet, UndoStack};
