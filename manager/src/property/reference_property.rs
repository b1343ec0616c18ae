use vizsync_codec::Variant;

use crate::ident::GlobalId;
use crate::message::{PropertySnapshot, SnapshotValues, Stream};

use super::{
    definition::{PropertyDefinition, ReferenceKind},
    error::PropertyError,
    ObjectResolver,
};

/// A reference-valued property: an ordered list of proxy handles, resolved
/// to concrete wire ids only at push time.
///
/// Three push policies exist for keeping the remote side's reference set in
/// step, selected by configuration and checked in this order:
/// a clean command re-adds everything after a single clear-all call; a remove
/// command diffs the previously pushed set against the current one; with
/// neither configured each reference is re-issued additively, and
/// `null_on_empty` substitutes one null call when the list is empty so the
/// remote's current input is explicitly cleared rather than left stale.
#[derive(Debug, Clone)]
pub struct ReferenceProperty {
    name: String,
    command: String,
    argument_type: ReferenceKind,
    clean_command: Option<String>,
    remove_command: Option<String>,
    null_on_empty: bool,
    immediate_update: bool,
    update_self: bool,
    do_update: bool,
    references: Vec<GlobalId>,
    /// The reference set as of the last successful push; the baseline the
    /// remove-command policy diffs against.
    pushed_references: Vec<GlobalId>,
    modified: bool,
}

impl ReferenceProperty {
    pub fn new(definition: &PropertyDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            command: definition.command.clone(),
            argument_type: definition.argument_type,
            clean_command: definition.clean_command.clone(),
            remove_command: definition.remove_command.clone(),
            null_on_empty: definition.null_on_empty,
            immediate_update: definition.immediate_update,
            update_self: definition.update_self,
            do_update: true,
            references: Vec::new(),
            pushed_references: Vec::new(),
            modified: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn references(&self) -> &[GlobalId] {
        &self.references
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn do_update(&self) -> bool {
        self.do_update
    }

    pub fn set_do_update(&mut self, do_update: bool) {
        self.do_update = do_update;
    }

    pub fn immediate_update(&self) -> bool {
        self.immediate_update
    }

    pub fn update_self(&self) -> bool {
        self.update_self
    }

    pub fn set_references(&mut self, references: Vec<GlobalId>) {
        self.references = references;
        self.modified = true;
    }

    pub fn add_reference(&mut self, id: GlobalId) {
        self.references.push(id);
        self.modified = true;
    }

    pub fn remove_reference(&mut self, id: GlobalId) {
        self.references.retain(|existing| *existing != id);
        self.modified = true;
    }

    pub fn clear_references(&mut self) {
        self.references.clear();
        self.modified = true;
    }

    /// Append push instructions for one target. The caller stages the output
    /// and calls [`ReferenceProperty::commit_push`] once every target
    /// succeeded; a resolution failure leaves flags and baseline untouched.
    pub fn append_push(
        &self,
        stream: &mut Stream,
        target: GlobalId,
        resolver: &dyn ObjectResolver,
    ) -> Result<(), PropertyError> {
        if let Some(clean) = &self.clean_command {
            // The remote side has no fine-grained remove: clear, then re-add
            // every current reference.
            stream.invoke(target, clean, Vec::new());
            for id in &self.references {
                let argument = self.resolve_argument(*id, resolver)?;
                stream.invoke(target, &self.command, vec![argument]);
            }
        } else if let Some(remove) = &self.remove_command {
            for id in &self.pushed_references {
                if !self.references.contains(id) {
                    let argument = self.resolve_argument(*id, resolver)?;
                    stream.invoke(target, remove, vec![argument]);
                }
            }
            for id in &self.references {
                if !self.pushed_references.contains(id) {
                    let argument = self.resolve_argument(*id, resolver)?;
                    stream.invoke(target, &self.command, vec![argument]);
                }
            }
        } else if self.references.is_empty() {
            if self.null_on_empty {
                stream.invoke(target, &self.command, vec![Variant::Object(0)]);
            }
        } else {
            for id in &self.references {
                let argument = self.resolve_argument(*id, resolver)?;
                stream.invoke(target, &self.command, vec![argument]);
            }
        }
        Ok(())
    }

    /// Record a successful push: the current set becomes the diff baseline
    /// and the modified flag clears.
    pub fn commit_push(&mut self) {
        self.pushed_references = self.references.clone();
        self.modified = false;
    }

    fn resolve_argument(
        &self,
        id: GlobalId,
        resolver: &dyn ObjectResolver,
    ) -> Result<Variant, PropertyError> {
        let resolved =
            resolver
                .resolve(id, self.argument_type)
                .ok_or(PropertyError::UnresolvedReference {
                    name: self.name.clone(),
                    id,
                })?;
        Ok(Variant::Object(resolved.value()))
    }

    pub fn snapshot(&self) -> PropertySnapshot {
        PropertySnapshot {
            name: self.name.clone(),
            command: self.command.clone(),
            information_only: false,
            values: SnapshotValues::References(self.references.clone()),
        }
    }

    pub fn load_snapshot(&mut self, snapshot: &PropertySnapshot) -> Result<(), PropertyError> {
        match &snapshot.values {
            SnapshotValues::References(references) => {
                self.references = references.clone();
                self.modified = true;
                Ok(())
            }
            SnapshotValues::Elements(_) => Err(PropertyError::SnapshotKindMismatch {
                name: self.name.clone(),
                expected: "references",
                actual: "elements",
            }),
        }
    }

    pub fn from_snapshot(snapshot: &PropertySnapshot) -> Result<Self, PropertyError> {
        let SnapshotValues::References(references) = &snapshot.values else {
            return Err(PropertyError::SnapshotKindMismatch {
                name: snapshot.name.clone(),
                expected: "references",
                actual: "elements",
            });
        };
        let mut property = Self::new(&PropertyDefinition::reference(
            &snapshot.name,
            &snapshot.command,
        ));
        property.references = references.clone();
        property.modified = true;
        Ok(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Instruction;
    use std::collections::HashMap;

    struct MapResolver {
        map: HashMap<GlobalId, GlobalId>,
    }

    impl MapResolver {
        fn identity(ids: &[u64]) -> Self {
            let map = ids
                .iter()
                .map(|value| {
                    (
                        GlobalId::from_value(*value),
                        GlobalId::from_value(*value + 1000),
                    )
                })
                .collect();
            Self { map }
        }
    }

    impl ObjectResolver for MapResolver {
        fn resolve(&self, id: GlobalId, _kind: ReferenceKind) -> Option<GlobalId> {
            self.map.get(&id).copied()
        }
    }

    fn gid(value: u64) -> GlobalId {
        GlobalId::from_value(value)
    }

    fn methods(stream: &Stream) -> Vec<(String, Vec<Variant>)> {
        stream
            .iter()
            .map(|instruction| match instruction {
                Instruction::Invoke { method, args, .. } => (method.clone(), args.clone()),
                other => panic!("unexpected instruction {:?}", other),
            })
            .collect()
    }

    #[test]
    fn remove_command_diffs_against_the_pushed_baseline() {
        let mut definition = PropertyDefinition::reference("Input", "AddInput");
        definition.remove_command = Some("RemoveInput".to_string());
        let mut property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[1, 2, 3, 4]);
        let target = gid(300);

        property.set_references(vec![gid(1), gid(2), gid(3)]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, target, &resolver).unwrap();
        property.commit_push();
        assert_eq!(stream.len(), 3);

        property.set_references(vec![gid(2), gid(3), gid(4)]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, target, &resolver).unwrap();
        property.commit_push();

        let calls = methods(&stream);
        assert_eq!(
            calls,
            vec![
                ("RemoveInput".to_string(), vec![Variant::Object(1001)]),
                ("AddInput".to_string(), vec![Variant::Object(1004)]),
            ]
        );
    }

    #[test]
    fn clean_command_clears_then_re_adds_everything() {
        let mut definition = PropertyDefinition::reference("Input", "AddInput");
        definition.clean_command = Some("RemoveAllInputs".to_string());
        let mut property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[1, 2]);

        property.set_references(vec![gid(1), gid(2)]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();

        let calls = methods(&stream);
        assert_eq!(calls[0].0, "RemoveAllInputs");
        assert_eq!(calls.len(), 3);
    }

    #[test]
    fn clean_command_wins_over_remove_command() {
        let mut definition = PropertyDefinition::reference("Input", "AddInput");
        definition.clean_command = Some("RemoveAllInputs".to_string());
        definition.remove_command = Some("RemoveInput".to_string());
        let mut property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[1]);

        property.set_references(vec![gid(1)]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();
        property.commit_push();

        property.clear_references();
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();
        let calls = methods(&stream);
        // No RemoveInput call: the clean path handles the empty set alone.
        assert_eq!(calls, vec![("RemoveAllInputs".to_string(), Vec::new())]);
    }

    #[test]
    fn null_on_empty_pushes_an_explicit_null() {
        let mut definition = PropertyDefinition::reference("Source", "SetSource");
        definition.null_on_empty = true;
        let mut property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[1]);

        property.set_references(vec![gid(1)]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();
        property.commit_push();

        property.clear_references();
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();
        assert_eq!(
            methods(&stream),
            vec![("SetSource".to_string(), vec![Variant::Object(0)])]
        );
    }

    #[test]
    fn empty_list_without_null_on_empty_emits_nothing() {
        let definition = PropertyDefinition::reference("Source", "SetSource");
        let property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[]);
        let mut stream = Stream::new();
        property.append_push(&mut stream, gid(300), &resolver).unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let definition = PropertyDefinition::reference("Input", "AddInput");
        let mut property = ReferenceProperty::new(&definition);
        let resolver = MapResolver::identity(&[]);

        property.set_references(vec![gid(99)]);
        let mut stream = Stream::new();
        let result = property.append_push(&mut stream, gid(300), &resolver);
        assert_eq!(
            result,
            Err(PropertyError::UnresolvedReference {
                name: "Input".to_string(),
                id: gid(99),
            })
        );
    }
}
