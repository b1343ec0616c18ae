use std::collections::HashMap;

use log::{debug, warn};
use vizsync_codec::Variant;

use crate::ident::GlobalId;
use crate::message::{Instruction, ProxyState, SnapshotValues, Stream};

use super::error::DispatchError;

/// A server-side native object: anything that can be instantiated by class
/// name and driven by method invocations.
pub trait NativeObject {
    fn class_name(&self) -> &str;

    /// Execute one method. Methods that produce no result return an empty
    /// vector; gather methods return the values a pull carries back.
    fn invoke(&mut self, method: &str, args: &[Variant]) -> Result<Vec<Variant>, DispatchError>;
}

pub type NativeBuilder = Box<dyn Fn() -> Box<dyn NativeObject>>;

/// String-keyed registry of native class builders.
#[derive(Default)]
pub struct NativeFactory {
    builders: HashMap<String, NativeBuilder>,
}

impl NativeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, class: &str, builder: NativeBuilder) {
        if self.builders.insert(class.to_string(), builder).is_some() {
            warn!("native class `{}` was already registered, overwriting", class);
        }
    }

    pub fn build(&self, class: &str) -> Result<Box<dyn NativeObject>, DispatchError> {
        let builder = self
            .builders
            .get(class)
            .ok_or_else(|| DispatchError::UnknownClass {
                class: class.to_string(),
            })?;
        Ok((builder)())
    }
}

/// Executes decoded instruction streams against a table of live native
/// objects. This is the receiving half of the protocol: what a server process
/// runs when a message arrives.
pub struct Dispatcher {
    factory: NativeFactory,
    objects: HashMap<GlobalId, Box<dyn NativeObject>>,
}

impl Dispatcher {
    pub fn new(factory: NativeFactory) -> Self {
        Self {
            factory,
            objects: HashMap::new(),
        }
    }

    pub fn has_object(&self, id: GlobalId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Execute a stream in append order. Execution stops at the first
    /// failing instruction.
    pub fn execute(&mut self, stream: &Stream) -> Result<(), DispatchError> {
        for instruction in stream {
            match instruction {
                Instruction::New { id, class } => {
                    if self.objects.contains_key(id) {
                        // The sender guards creation; a duplicate means a
                        // replayed stream, not a new object.
                        debug!("object {} already exists, skipping New", id);
                        continue;
                    }
                    let object = self.factory.build(class)?;
                    self.objects.insert(*id, object);
                }
                Instruction::Invoke { id, method, args } => {
                    let object = self
                        .objects
                        .get_mut(id)
                        .ok_or(DispatchError::UnknownObject { id: *id })?;
                    object.invoke(method, args)?;
                }
                Instruction::Delete { id } => {
                    if self.objects.remove(id).is_none() {
                        // Deleting an absent id is a no-op.
                        debug!("object {} already deleted", id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply a full-state snapshot: instantiate the wrapped object if needed,
    /// then replay every non-information property command against it.
    pub fn apply_state(&mut self, state: &ProxyState) -> Result<(), DispatchError> {
        let native = state
            .native_id
            .ok_or(DispatchError::MissingNativeId { id: state.global_id })?;
        if !self.objects.contains_key(&native) {
            let object = self.factory.build(&state.class_name)?;
            self.objects.insert(native, object);
        }
        for snapshot in &state.properties {
            if snapshot.information_only {
                continue;
            }
            let args = match &snapshot.values {
                SnapshotValues::Elements(elements) => elements.clone(),
                SnapshotValues::References(references) => references
                    .iter()
                    .map(|id| Variant::Object(id.value()))
                    .collect(),
            };
            let object = self
                .objects
                .get_mut(&native)
                .ok_or(DispatchError::UnknownObject { id: native })?;
            object.invoke(&snapshot.command, &args)?;
        }
        for (_, sub_state) in &state.sub_proxies {
            self.apply_state(sub_state)?;
        }
        Ok(())
    }

    /// Invoke a gather method on a live object, returning its result. Serves
    /// pull requests.
    pub fn gather(
        &mut self,
        id: GlobalId,
        method: &str,
    ) -> Result<Vec<Variant>, DispatchError> {
        let object = self
            .objects
            .get_mut(&id)
            .ok_or(DispatchError::UnknownObject { id })?;
        object.invoke(method, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        calls: Vec<String>,
    }

    impl NativeObject for Counter {
        fn class_name(&self) -> &str {
            "Counter"
        }

        fn invoke(
            &mut self,
            method: &str,
            _args: &[Variant],
        ) -> Result<Vec<Variant>, DispatchError> {
            match method {
                "GetCount" => Ok(vec![Variant::Int(self.calls.len() as i64)]),
                other => {
                    self.calls.push(other.to_string());
                    Ok(Vec::new())
                }
            }
        }
    }

    fn factory() -> NativeFactory {
        let mut factory = NativeFactory::new();
        factory.register(
            "Counter",
            Box::new(|| -> Box<dyn NativeObject> { Box::new(Counter { calls: Vec::new() }) }),
        );
        factory
    }

    #[test]
    fn streams_execute_in_append_order() {
        let mut dispatcher = Dispatcher::new(factory());
        let id = GlobalId::from_value(400);
        let mut stream = Stream::new();
        stream.append(Instruction::New {
            id,
            class: "Counter".to_string(),
        });
        stream.invoke(id, "Tick", vec![]);
        stream.invoke(id, "Tock", vec![]);
        dispatcher.execute(&stream).unwrap();
        assert_eq!(
            dispatcher.gather(id, "GetCount").unwrap(),
            vec![Variant::Int(2)]
        );
    }

    #[test]
    fn unknown_class_and_object_are_diagnosed() {
        let mut dispatcher = Dispatcher::new(factory());
        let mut stream = Stream::new();
        stream.append(Instruction::New {
            id: GlobalId::from_value(400),
            class: "Widget".to_string(),
        });
        assert!(matches!(
            dispatcher.execute(&stream),
            Err(DispatchError::UnknownClass { .. })
        ));

        let mut invoke = Stream::new();
        invoke.invoke(GlobalId::from_value(401), "Tick", vec![]);
        assert!(matches!(
            dispatcher.execute(&invoke),
            Err(DispatchError::UnknownObject { .. })
        ));
    }

    #[test]
    fn delete_of_an_absent_id_is_a_no_op() {
        let mut dispatcher = Dispatcher::new(factory());
        let mut stream = Stream::new();
        stream.append(Instruction::Delete {
            id: GlobalId::from_value(400),
        });
        dispatcher.execute(&stream).unwrap();
        assert_eq!(dispatcher.object_count(), 0);
    }
}
