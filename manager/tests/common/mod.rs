#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use vizsync_manager::{
    ControllerError, DispatchError, GlobalId, Instruction, Message, NativeFactory, NativeObject,
    Payload, ProcessController, Property, PropertyDefinition, Proxy, Session, Variant,
};

/// A controller that remembers every message it is handed and answers pulls
/// from a scripted table.
pub struct RecordingController {
    pub seen: Rc<RefCell<Vec<Message>>>,
    pub pull_replies: HashMap<(GlobalId, String), Vec<Variant>>,
}

impl RecordingController {
    pub fn new(seen: Rc<RefCell<Vec<Message>>>) -> Self {
        Self {
            seen,
            pull_replies: HashMap::new(),
        }
    }

    pub fn script_pull(&mut self, id: GlobalId, method: &str, reply: Vec<Variant>) {
        self.pull_replies.insert((id, method.to_string()), reply);
    }
}

impl ProcessController for RecordingController {
    fn process(&mut self, message: &Message) -> Result<(), ControllerError> {
        self.seen.borrow_mut().push(message.clone());
        Ok(())
    }

    fn pull(&mut self, id: GlobalId, method: &str) -> Result<Vec<Variant>, ControllerError> {
        self.pull_replies
            .get(&(id, method.to_string()))
            .cloned()
            .ok_or(ControllerError::Dispatch(DispatchError::UnknownObject {
                id,
            }))
    }
}

/// A session backed by a single recording controller, plus the record.
pub fn recording_session() -> (Session, Rc<RefCell<Vec<Message>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let session = Session::new(Box::new(RecordingController::new(seen.clone())));
    (session, seen)
}

/// A session with separate recording data and render controllers.
pub fn recording_session_with_render(
) -> (Session, Rc<RefCell<Vec<Message>>>, Rc<RefCell<Vec<Message>>>) {
    let data = Rc::new(RefCell::new(Vec::new()));
    let render = Rc::new(RefCell::new(Vec::new()));
    let session = Session::with_render_server(
        Box::new(RecordingController::new(data.clone())),
        Box::new(RecordingController::new(render.clone())),
    );
    (session, data, render)
}

/// Flatten every recorded instruction into `(target, method)` pairs, with
/// `New` and `Delete` rendered as pseudo-methods.
pub fn recorded_calls(messages: &[Message]) -> Vec<(GlobalId, String)> {
    let mut calls = Vec::new();
    for message in messages {
        if let Payload::Instructions(stream) = &message.payload {
            for instruction in stream {
                match instruction {
                    Instruction::New { id, class } => {
                        calls.push((*id, format!("New:{}", class)));
                    }
                    Instruction::Invoke { id, method, .. } => calls.push((*id, method.clone())),
                    Instruction::Delete { id } => calls.push((*id, "Delete".to_string())),
                }
            }
        }
    }
    calls
}

/// Just the invoked method names, in order.
pub fn recorded_methods(messages: &[Message]) -> Vec<String> {
    recorded_calls(messages)
        .into_iter()
        .map(|(_, method)| method)
        .collect()
}

/// A sphere-source proxy with a scalar Radius and a three-element Center.
pub fn sphere_proxy(id: GlobalId, location: vizsync_manager::Location) -> Proxy {
    let mut proxy = Proxy::new(id, "SphereSource", "sources", "Sphere", location);
    proxy.add_property(
        Property::from_definition(&PropertyDefinition::value(
            "Radius",
            "SetRadius",
            vec![Variant::Float64(1.0)],
        ))
        .expect("valid definition"),
    );
    proxy.add_property(
        Property::from_definition(&PropertyDefinition::value(
            "Center",
            "SetCenter",
            vec![
                Variant::Float64(0.0),
                Variant::Float64(0.0),
                Variant::Float64(0.0),
            ],
        ))
        .expect("valid definition"),
    );
    proxy
}

/// Shared observable state for `SphereNative` instances built by one factory.
pub type SphereLog = Rc<RefCell<Vec<(String, Vec<Variant>)>>>;

/// A native sphere source that logs every call it receives.
pub struct SphereNative {
    pub log: SphereLog,
    pub radius: f64,
}

impl NativeObject for SphereNative {
    fn class_name(&self) -> &str {
        "SphereSource"
    }

    fn invoke(&mut self, method: &str, args: &[Variant]) -> Result<Vec<Variant>, DispatchError> {
        self.log
            .borrow_mut()
            .push((method.to_string(), args.to_vec()));
        match method {
            "SetRadius" => {
                let value = args
                    .first()
                    .and_then(Variant::as_f64)
                    .ok_or(DispatchError::BadArguments {
                        method: method.to_string(),
                        expected: "one float",
                    })?;
                self.radius = value;
                Ok(Vec::new())
            }
            "GetRadius" => Ok(vec![Variant::Float64(self.radius)]),
            "SetCenter" => Ok(Vec::new()),
            other => Err(DispatchError::UnknownMethod {
                class: "SphereSource".to_string(),
                method: other.to_string(),
            }),
        }
    }
}

/// A native filter that tracks its current input connections.
pub struct PipelineNative {
    pub inputs: Rc<RefCell<Vec<u64>>>,
}

impl NativeObject for PipelineNative {
    fn class_name(&self) -> &str {
        "ShrinkFilter"
    }

    fn invoke(&mut self, method: &str, args: &[Variant]) -> Result<Vec<Variant>, DispatchError> {
        let object_arg = || {
            args.first()
                .and_then(Variant::as_object)
                .ok_or(DispatchError::BadArguments {
                    method: method.to_string(),
                    expected: "one object reference",
                })
        };
        match method {
            "AddInput" => {
                let id = object_arg()?;
                self.inputs.borrow_mut().push(id);
                Ok(Vec::new())
            }
            "RemoveInput" => {
                let id = object_arg()?;
                self.inputs.borrow_mut().retain(|existing| *existing != id);
                Ok(Vec::new())
            }
            "RemoveAllInputs" => {
                self.inputs.borrow_mut().clear();
                Ok(Vec::new())
            }
            "SetInput" => {
                let id = object_arg()?;
                let mut inputs = self.inputs.borrow_mut();
                inputs.clear();
                if id != 0 {
                    inputs.push(id);
                }
                Ok(Vec::new())
            }
            other => Err(DispatchError::UnknownMethod {
                class: "ShrinkFilter".to_string(),
                method: other.to_string(),
            }),
        }
    }
}

/// A factory building loggable spheres and pipeline filters.
pub fn observable_factory(sphere_log: SphereLog, inputs: Rc<RefCell<Vec<u64>>>) -> NativeFactory {
    let mut factory = NativeFactory::new();
    factory.register(
        "SphereSource",
        Box::new(move || -> Box<dyn NativeObject> {
            Box::new(SphereNative {
                log: sphere_log.clone(),
                radius: 0.0,
            })
        }),
    );
    factory.register(
        "ShrinkFilter",
        Box::new(move || -> Box<dyn NativeObject> {
            Box::new(PipelineNative {
                inputs: inputs.clone(),
            })
        }),
    );
    factory
}
