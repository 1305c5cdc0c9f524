//! A message whose shape is known only through its descriptor.

use std::collections::BTreeMap;
use std::fmt;

use crate::descriptor::{FieldDescriptor, Kind, MessageDescriptor};
use crate::error::{ReflectError, Result};
use crate::reflect::ReflectMessage;
use crate::value::{Value, ValueRef};

#[derive(Clone, PartialEq)]
struct Slot {
    field: FieldDescriptor,
    value: Value,
}

/// A mutable message instance backed by a [`MessageDescriptor`].
///
/// Fields and extensions share one map keyed by field number; the pool
/// guarantees the numbers never collide.
#[derive(Clone, PartialEq)]
pub struct DynamicMessage {
    desc: MessageDescriptor,
    fields: BTreeMap<u32, Slot>,
}

impl DynamicMessage {
    pub fn new(desc: MessageDescriptor) -> Self {
        Self {
            desc,
            fields: BTreeMap::new(),
        }
    }

    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.desc
    }

    /// Set fields and their values, ordered by field number.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &Value)> {
        self.fields
            .values()
            .filter(|slot| !is_empty_list(&slot.value))
            .map(|slot| (&slot.field, &slot.value))
    }

    pub fn has_field(&self, field: &FieldDescriptor) -> bool {
        self.get_field(field)
            .is_some_and(|value| !is_empty_list(value))
    }

    pub fn get_field(&self, field: &FieldDescriptor) -> Option<&Value> {
        let slot = self.fields.get(&field.number())?;
        (slot.field == *field).then_some(&slot.value)
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<&Value> {
        let field = self.desc.get_field_by_name(name)?;
        self.get_field(&field)
    }

    /// Value of an extension of this message, by the extension's full name.
    pub fn get_extension_by_name(&self, full_name: &str) -> Option<&Value> {
        let field = self.desc.get_extension_by_full_name(full_name)?;
        self.get_field(&field)
    }

    /// Assigns a field. Repeated fields take a [`Value::List`].
    pub fn set_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.check_owner(field)?;
        let kind = field.kind();
        let valid = match &value {
            Value::List(items) if field.is_list() => items.iter().all(|v| v.is_valid_for(&kind)),
            other => !field.is_list() && other.is_valid_for(&kind),
        };
        if !valid {
            return Err(type_mismatch(field));
        }
        self.fields.insert(
            field.number(),
            Slot {
                field: field.clone(),
                value,
            },
        );
        Ok(())
    }

    pub fn set_field_by_name(&mut self, name: &str, value: Value) -> Result<()> {
        let field = self
            .desc
            .get_field_by_name(name)
            .ok_or_else(|| ReflectError::FieldNotInMessage {
                field: name.to_string(),
                message: self.desc.full_name().to_string(),
            })?;
        self.set_field(&field, value)
    }

    /// Appends one element to a repeated field.
    pub fn push_field(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.check_owner(field)?;
        if !field.is_list() {
            return Err(ReflectError::NotRepeated {
                field: field.full_name().to_string(),
            });
        }
        if !value.is_valid_for(&field.kind()) {
            return Err(type_mismatch(field));
        }
        match &mut self.list_slot(field).value {
            Value::List(items) => {
                items.push(value);
                Ok(())
            }
            _ => Err(type_mismatch(field)),
        }
    }

    pub fn clear_field(&mut self, field: &FieldDescriptor) {
        if self.get_field(field).is_some() {
            self.fields.remove(&field.number());
        }
    }

    fn list_slot(&mut self, field: &FieldDescriptor) -> &mut Slot {
        self.fields.entry(field.number()).or_insert_with(|| Slot {
            field: field.clone(),
            value: Value::List(Vec::new()),
        })
    }

    fn check_owner(&self, field: &FieldDescriptor) -> Result<()> {
        if field.containing_message() != self.desc {
            return Err(ReflectError::FieldNotInMessage {
                field: field.full_name().to_string(),
                message: self.desc.full_name().to_string(),
            });
        }
        Ok(())
    }
}

impl ReflectMessage for DynamicMessage {
    fn descriptor(&self) -> MessageDescriptor {
        self.desc.clone()
    }

    fn list_fields(&self) -> Vec<FieldDescriptor> {
        self.fields().map(|(field, _)| field.clone()).collect()
    }

    fn has_field(&self, field: &FieldDescriptor) -> bool {
        DynamicMessage::has_field(self, field)
    }

    fn field_size(&self, field: &FieldDescriptor) -> usize {
        match self.get_field(field) {
            Some(Value::List(items)) => items.len(),
            Some(_) => 1,
            None => 0,
        }
    }

    fn get(&self, field: &FieldDescriptor, index: usize) -> Option<ValueRef<'_>> {
        match self.get_field(field)? {
            Value::List(items) => ValueRef::from_value(items.get(index)?),
            value => ValueRef::from_value(value),
        }
    }

    fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.set_field(field, value)
    }

    fn add(&mut self, field: &FieldDescriptor, value: Value) -> Result<()> {
        self.push_field(field, value)
    }

    fn mutable_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn ReflectMessage> {
        self.check_owner(field)?;
        let Kind::Message(sub) = field.kind() else {
            return Err(not_a_message(field));
        };
        if field.is_list() {
            return Err(type_mismatch(field));
        }
        let slot = self.fields.entry(field.number()).or_insert_with(|| Slot {
            field: field.clone(),
            value: Value::Message(DynamicMessage::new(sub)),
        });
        match &mut slot.value {
            Value::Message(message) => Ok(message as &mut dyn ReflectMessage),
            _ => Err(type_mismatch(field)),
        }
    }

    fn add_message(&mut self, field: &FieldDescriptor) -> Result<&mut dyn ReflectMessage> {
        self.check_owner(field)?;
        let Kind::Message(sub) = field.kind() else {
            return Err(not_a_message(field));
        };
        if !field.is_list() {
            return Err(ReflectError::NotRepeated {
                field: field.full_name().to_string(),
            });
        }
        match &mut self.list_slot(field).value {
            Value::List(items) => {
                items.push(Value::Message(DynamicMessage::new(sub)));
                match items.last_mut() {
                    Some(Value::Message(message)) => Ok(message as &mut dyn ReflectMessage),
                    _ => Err(type_mismatch(field)),
                }
            }
            _ => Err(type_mismatch(field)),
        }
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.desc.full_name());
        for (field, value) in self.fields() {
            out.field(field.full_name(), value);
        }
        out.finish()
    }
}

fn is_empty_list(value: &Value) -> bool {
    matches!(value, Value::List(items) if items.is_empty())
}

fn type_mismatch(field: &FieldDescriptor) -> ReflectError {
    ReflectError::TypeMismatch {
        field: field.full_name().to_string(),
    }
}

fn not_a_message(field: &FieldDescriptor) -> ReflectError {
    ReflectError::NotAMessage {
        field: field.full_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::{EnumDef, FieldDef, FieldType, MessageDef};
    use crate::descriptor::DescriptorPool;

    fn pool() -> DescriptorPool {
        DescriptorPool::builder()
            .enumeration(EnumDef::new("t.Mood").value("HAPPY", 1).value("SAD", 2))
            .message(
                MessageDef::new("t.Person")
                    .field(FieldDef::required("name", 1, FieldType::String))
                    .field(FieldDef::optional("age", 2, FieldType::Uint32))
                    .field(FieldDef::repeated("nicknames", 3, FieldType::String))
                    .field(FieldDef::optional("friend", 4, FieldType::Message("t.Person".into())))
                    .field(FieldDef::repeated("pets", 5, FieldType::Message("t.Pet".into())))
                    .field(FieldDef::optional("mood", 6, FieldType::Enum("t.Mood".into()))),
            )
            .message(MessageDef::new("t.Pet").field(FieldDef::optional("kind", 1, FieldType::String)))
            .extension("t", "t.Person", FieldDef::optional("score", 100, FieldType::Int64))
            .build()
            .expect("pool must build")
    }

    fn person() -> DynamicMessage {
        DynamicMessage::new(pool().get_message_by_name("t.Person").unwrap())
    }

    #[test]
    fn test_set_and_get() {
        let mut msg = person();
        msg.set_field_by_name("name", Value::String("ada".into()))
            .unwrap();
        assert_eq!(msg.get_field_by_name("name"), Some(&Value::String("ada".into())));
        assert!(msg.get_field_by_name("age").is_none());
        let age = msg.descriptor().get_field_by_name("age").unwrap();
        assert!(!msg.has_field(&age));
        msg.set_field(&age, Value::U32(36)).unwrap();
        assert!(msg.has_field(&age));
        assert_eq!(msg.field_size(&age), 1);
    }

    #[test]
    fn test_type_mismatch() {
        let mut msg = person();
        let err = msg.set_field_by_name("age", Value::I32(1)).unwrap_err();
        assert_eq!(err, ReflectError::TypeMismatch { field: "t.Person.age".into() });
        let err = msg
            .set_field_by_name("nicknames", Value::String("x".into()))
            .unwrap_err();
        assert!(matches!(err, ReflectError::TypeMismatch { .. }));
    }

    #[test]
    fn test_foreign_field_rejected() {
        let pool = pool();
        let pet_kind = pool
            .get_message_by_name("t.Pet")
            .unwrap()
            .get_field_by_name("kind")
            .unwrap();
        let mut msg = person();
        let err = msg.set_field(&pet_kind, Value::String("cat".into())).unwrap_err();
        assert!(matches!(err, ReflectError::FieldNotInMessage { .. }));
    }

    #[test]
    fn test_repeated_presence() {
        let mut msg = person();
        let nicknames = msg.descriptor().get_field_by_name("nicknames").unwrap();
        msg.set_field(&nicknames, Value::List(Vec::new())).unwrap();
        assert!(!msg.has_field(&nicknames));
        assert!(msg.list_fields().is_empty());
        msg.add(&nicknames, Value::String("a".into())).unwrap();
        msg.add(&nicknames, Value::String("b".into())).unwrap();
        assert_eq!(msg.field_size(&nicknames), 2);
        assert!(matches!(msg.get(&nicknames, 1), Some(ValueRef::String("b"))));
        assert!(msg.get(&nicknames, 2).is_none());
    }

    #[test]
    fn test_add_to_singular_fails() {
        let mut msg = person();
        let age = msg.descriptor().get_field_by_name("age").unwrap();
        let err = msg.add(&age, Value::U32(1)).unwrap_err();
        assert_eq!(err, ReflectError::NotRepeated { field: "t.Person.age".into() });
    }

    #[test]
    fn test_mutable_message_creates_once() {
        let mut msg = person();
        let friend = msg.descriptor().get_field_by_name("friend").unwrap();
        let name = msg.descriptor().get_field_by_name("name").unwrap();
        msg.mutable_message(&friend)
            .unwrap()
            .set(&name, Value::String("bob".into()))
            .unwrap();
        assert!(msg.has_field(&friend));
        let inner = msg.mutable_message(&friend).unwrap();
        assert!(inner.has_field(&name));
    }

    #[test]
    fn test_add_message_appends() {
        let mut msg = person();
        let pets = msg.descriptor().get_field_by_name("pets").unwrap();
        msg.add_message(&pets).unwrap();
        msg.add_message(&pets).unwrap();
        assert_eq!(msg.field_size(&pets), 2);
        let age = msg.descriptor().get_field_by_name("age").unwrap();
        assert!(matches!(msg.add_message(&age), Err(ReflectError::NotAMessage { .. })));
    }

    #[test]
    fn test_extension_values() {
        let mut msg = person();
        let score = msg.descriptor().get_extension_by_full_name("t.score").unwrap();
        msg.set_field(&score, Value::I64(-5)).unwrap();
        assert_eq!(msg.get_extension_by_name("t.score"), Some(&Value::I64(-5)));
        assert_eq!(msg.list_fields(), vec![score.clone()]);
        msg.clear_field(&score);
        assert!(!msg.has_field(&score));
    }

    #[test]
    fn test_list_fields_ordered_by_number() {
        let mut msg = person();
        msg.set_field_by_name("mood", Value::EnumNumber(2)).unwrap();
        msg.set_field_by_name("name", Value::String("x".into())).unwrap();
        let names: Vec<String> = msg
            .list_fields()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["name", "mood"]);
    }
}
