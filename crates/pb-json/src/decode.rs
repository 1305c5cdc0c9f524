//! JSON to message.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pb_reflect::{EnumDescriptor, FieldDescriptor, Kind, MessageDescriptor, ReflectMessage};
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::extensions::ExtensionStrategy;
use crate::options::Options;
use crate::writer;

pub(crate) struct Decoder<'a> {
    pub(crate) options: &'a Options,
    pub(crate) extensions: &'a mut ExtensionStrategy,
}

impl Decoder<'_> {
    /// Populates `message` from `object`. Fields assigned before a failing key
    /// keep their new values.
    pub(crate) fn decode(&mut self, message: &mut dyn ReflectMessage, object: Map<String, Value>) -> Result<()> {
        let desc = message.descriptor();
        trace!(message_type = desc.full_name(), keys = object.len(), "decoding message");
        for (key, value) in object {
            if let Some(field) = self.resolve(&desc, &key) {
                self.assign(message, &field, value)?;
                continue;
            }
            if self.extensions.read(&desc, &key, value) {
                for (field, value) in self.extensions.take_matches() {
                    self.assign(message, &field, value)?;
                }
                continue;
            }
            if !self.options.ignore_unknown_fields() {
                return Err(Error::UnknownField(key));
            }
            debug!(message_type = desc.full_name(), key = %key, "ignoring unknown field");
        }
        Ok(())
    }

    fn resolve(&self, desc: &MessageDescriptor, key: &str) -> Option<FieldDescriptor> {
        if let Some(field) = desc.get_field_by_name(key) {
            return Some(field);
        }
        if !self.options.deserialize_ignore_case() {
            return None;
        }
        desc.fields().find(|field| field.name().eq_ignore_ascii_case(key))
    }

    fn assign(&mut self, message: &mut dyn ReflectMessage, field: &FieldDescriptor, value: Value) -> Result<()> {
        if !field.is_list() {
            return self.assign_one(message, field, value);
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    self.assign_one(message, field, item)?;
                }
                Ok(())
            }
            _ => Err(Error::NotArray {
                field: field.name().to_string(),
            }),
        }
    }

    fn assign_one(&mut self, message: &mut dyn ReflectMessage, field: &FieldDescriptor, value: Value) -> Result<()> {
        if value.is_null() {
            if field.is_required() {
                return Err(Error::RequiredNull {
                    field: field.name().to_string(),
                });
            }
            return Ok(());
        }

        let converted = match field.kind() {
            Kind::Double => pb_reflect::Value::F64(unpack_real(field, &value)?),
            Kind::Float => pb_reflect::Value::F32(unpack_f32(field, &value)?),
            Kind::Int32 => pb_reflect::Value::I32(unpack_integer(field, &value)?),
            Kind::Int64 => pb_reflect::Value::I64(unpack_integer(field, &value)?),
            Kind::Uint32 => pb_reflect::Value::U32(unpack_integer(field, &value)?),
            Kind::Uint64 => pb_reflect::Value::U64(unpack_integer(field, &value)?),
            Kind::Bool => match value {
                Value::Bool(flag) => pb_reflect::Value::Bool(flag),
                _ => return Err(unpack(field, "expected a boolean")),
            },
            Kind::String => pb_reflect::Value::String(self.text(field, value)?),
            Kind::Bytes => {
                let text = self.text(field, value)?;
                let bytes = STANDARD.decode(text).map_err(|source| Error::Base64 {
                    field: field.name().to_string(),
                    source,
                })?;
                pb_reflect::Value::Bytes(bytes)
            }
            Kind::Message(_) => {
                let Value::Object(object) = value else {
                    return Err(Error::NotObject {
                        field: field.name().to_string(),
                    });
                };
                let sub = if field.is_list() {
                    message.add_message(field)?
                } else {
                    message.mutable_message(field)?
                };
                return self.decode(sub, object);
            }
            Kind::Enum(desc) => match self.enum_number(field, &desc, value)? {
                Some(number) => pb_reflect::Value::EnumNumber(number),
                None => return Ok(()),
            },
            _ => {
                return Err(Error::CannotConvert {
                    field: field.name().to_string(),
                })
            }
        };

        if field.is_list() {
            message.add(field, converted)?;
        } else {
            message.set(field, converted)?;
        }
        Ok(())
    }

    fn text(&self, field: &FieldDescriptor, value: Value) -> Result<String> {
        match value {
            Value::String(text) => Ok(text),
            other if self.options.implicit_string_cast() => {
                Ok(writer::to_string(&other, self.options.real_precision()))
            }
            _ => Err(Error::NotString {
                field: field.name().to_string(),
            }),
        }
    }

    /// `None` for an empty string, which leaves the field unset.
    fn enum_number(&self, field: &FieldDescriptor, desc: &EnumDescriptor, value: Value) -> Result<Option<i32>> {
        let found = match value {
            Value::Number(number) if !number.is_f64() => {
                let found = number
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .and_then(|n| desc.get_value(n));
                match found {
                    Some(found) => found,
                    None => return Err(enum_not_found(field, number.to_string())),
                }
            }
            Value::String(name) if name.is_empty() => {
                debug!(field = field.full_name(), "skipping empty enum value");
                return Ok(None);
            }
            Value::String(name) => {
                let name = match self.options.enum_hook(desc.full_name()) {
                    Some(hook) => hook.pre_deserialize(&name),
                    None => name,
                };
                match desc.get_value_by_name(&name) {
                    Some(found) => found,
                    None => return Err(enum_not_found(field, name)),
                }
            }
            _ => {
                return Err(Error::NotIntegerOrString {
                    field: field.name().to_string(),
                })
            }
        };
        Ok(Some(found.number()))
    }
}

fn number<'v>(field: &FieldDescriptor, value: &'v Value) -> Result<&'v Number> {
    match value {
        Value::Number(number) => Ok(number),
        _ => Err(unpack(field, "expected a number")),
    }
}

fn unpack_real(field: &FieldDescriptor, value: &Value) -> Result<f64> {
    number(field, value)?
        .as_f64()
        .ok_or_else(|| unpack(field, "expected a real"))
}

fn unpack_f32(field: &FieldDescriptor, value: &Value) -> Result<f32> {
    let real = unpack_real(field, value)?;
    let narrowed = real as f32;
    if narrowed.is_infinite() {
        return Err(unpack(field, format!("{real} does not fit a float")));
    }
    Ok(narrowed)
}

/// Accepts only JSON integers that fit `T`; reals are rejected even when
/// integral.
fn unpack_integer<T>(field: &FieldDescriptor, value: &Value) -> Result<T>
where
    T: TryFrom<i64> + TryFrom<u64>,
{
    let number = number(field, value)?;
    let converted = if let Some(n) = number.as_i64() {
        <T as TryFrom<i64>>::try_from(n).ok()
    } else if let Some(n) = number.as_u64() {
        <T as TryFrom<u64>>::try_from(n).ok()
    } else {
        return Err(unpack(field, "expected an integer"));
    };
    converted.ok_or_else(|| unpack(field, format!("{number} is out of range")))
}

fn unpack(field: &FieldDescriptor, reason: impl Into<String>) -> Error {
    Error::Unpack {
        field: field.name().to_string(),
        reason: reason.into(),
    }
}

fn enum_not_found(field: &FieldDescriptor, value: String) -> Error {
    Error::EnumValueNotFound {
        field: field.name().to_string(),
        value,
    }
}
