//! Message to JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pb_reflect::{EnumDescriptor, FieldDescriptor, Kind, ReflectMessage, ValueRef};
use serde_json::{Map, Number, Value};
use tracing::trace;

use crate::error::{Error, Result};
use crate::extensions::ExtensionStrategy;
use crate::options::Options;

pub(crate) struct Encoder<'a> {
    pub(crate) options: &'a Options,
    pub(crate) extensions: &'a ExtensionStrategy,
}

impl Encoder<'_> {
    /// Encodes every set field of `message`. A message without set fields
    /// becomes an empty object.
    ///
    /// An ordinary field named like the nested namespace key cannot share an
    /// object with extensions, so that combination fails with
    /// [`Error::NamespaceConflict`] whichever field comes first.
    pub(crate) fn encode(&self, message: &dyn ReflectMessage) -> Result<Map<String, Value>> {
        trace!(message_type = message.descriptor().full_name(), "encoding message");
        let namespace = self.extensions.namespace();
        let mut namespace_taken = false;
        let mut first_extension: Option<FieldDescriptor> = None;
        let mut root = Map::new();
        for field in message.list_fields() {
            let value = if field.is_list() {
                let count = message.field_size(&field);
                if count == 0 {
                    continue;
                }
                let mut items = Vec::with_capacity(count);
                for index in 0..count {
                    items.push(self.encode_field(message, &field, index)?);
                }
                Value::Array(items)
            } else if message.has_field(&field) {
                self.encode_field(message, &field, 0)?
            } else {
                continue;
            };

            if field.is_extension() {
                if let Some(key) = namespace.filter(|_| namespace_taken) {
                    return Err(namespace_conflict(&field, key));
                }
                self.extensions.write(&field, &mut root, value)?;
                first_extension.get_or_insert(field);
            } else {
                if let Some(key) = namespace.filter(|key| *key == field.name()) {
                    if let Some(extension) = &first_extension {
                        return Err(namespace_conflict(extension, key));
                    }
                    namespace_taken = true;
                }
                root.insert(field.name().to_string(), value);
            }
        }
        Ok(root)
    }

    fn encode_field(
        &self,
        message: &dyn ReflectMessage,
        field: &FieldDescriptor,
        index: usize,
    ) -> Result<Value> {
        let value = message
            .get(field, index)
            .ok_or_else(|| cannot_convert(field))?;
        match (field.kind(), value) {
            (Kind::Double, ValueRef::F64(v)) => real(field, v),
            (Kind::Float, ValueRef::F32(v)) => real(field, f64::from(v)),
            (Kind::Int32, ValueRef::I32(v)) => Ok(Value::from(v)),
            (Kind::Int64, ValueRef::I64(v)) => Ok(Value::from(v)),
            (Kind::Uint32, ValueRef::U32(v)) => Ok(Value::from(v)),
            (Kind::Uint64, ValueRef::U64(v)) => Ok(Value::from(v)),
            (Kind::Bool, ValueRef::Bool(v)) => Ok(Value::Bool(v)),
            (Kind::String, ValueRef::String(v)) => Ok(Value::String(v.to_string())),
            (Kind::Bytes, ValueRef::Bytes(v)) => Ok(Value::String(STANDARD.encode(v))),
            (Kind::Message(_), ValueRef::Message(sub)) => self.encode(sub).map(Value::Object),
            (Kind::Enum(desc), ValueRef::EnumNumber(number)) => Ok(self.encode_enum(&desc, number)),
            _ => Err(cannot_convert(field)),
        }
    }

    /// Numbers without a declared value are written as numbers whatever the
    /// options say.
    fn encode_enum(&self, desc: &EnumDescriptor, number: i32) -> Value {
        if self.options.enum_as_number() {
            return Value::from(number);
        }
        match desc.get_value(number) {
            Some(value) => match self.options.enum_hook(desc.full_name()) {
                Some(hook) => Value::String(hook.pre_serialize(value.name())),
                None => Value::String(value.name().to_string()),
            },
            None => Value::from(number),
        }
    }
}

fn real(field: &FieldDescriptor, value: f64) -> Result<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| cannot_convert(field))
}

fn namespace_conflict(extension: &FieldDescriptor, key: &str) -> Error {
    Error::NamespaceConflict {
        field: extension.full_name().to_string(),
        key: key.to_string(),
    }
}

fn cannot_convert(field: &FieldDescriptor) -> Error {
    Error::CannotConvert {
        field: field.name().to_string(),
    }
}
