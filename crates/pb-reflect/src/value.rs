//! Field values.

use crate::descriptor::Kind;
use crate::dynamic::DynamicMessage;
use crate::reflect::ReflectMessage;

/// An owned field value.
///
/// Enum fields hold the value number; the name is resolved through the
/// field's [`EnumDescriptor`](crate::EnumDescriptor).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    EnumNumber(i32),
    Message(DynamicMessage),
    List(Vec<Value>),
}

impl Value {
    /// Checks a single (non-list) value against a field kind.
    pub fn is_valid_for(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Bool(_), Kind::Bool)
            | (Value::I32(_), Kind::Int32)
            | (Value::I64(_), Kind::Int64)
            | (Value::U32(_), Kind::Uint32)
            | (Value::U64(_), Kind::Uint64)
            | (Value::F32(_), Kind::Float)
            | (Value::F64(_), Kind::Double)
            | (Value::String(_), Kind::String)
            | (Value::Bytes(_), Kind::Bytes) => true,
            (Value::EnumNumber(_), Kind::Enum(_)) => true,
            (Value::Message(message), Kind::Message(desc)) => message.descriptor() == desc,
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }
}

/// A borrowed view of one element of a field, as handed out by
/// [`ReflectMessage::get`].
#[derive(Debug, Clone, Copy)]
pub enum ValueRef<'a> {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(&'a str),
    Bytes(&'a [u8]),
    EnumNumber(i32),
    Message(&'a dyn ReflectMessage),
}

impl<'a> ValueRef<'a> {
    /// Borrows a single value. Lists have no single-element view.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        Some(match value {
            Value::Bool(v) => ValueRef::Bool(*v),
            Value::I32(v) => ValueRef::I32(*v),
            Value::I64(v) => ValueRef::I64(*v),
            Value::U32(v) => ValueRef::U32(*v),
            Value::U64(v) => ValueRef::U64(*v),
            Value::F32(v) => ValueRef::F32(*v),
            Value::F64(v) => ValueRef::F64(*v),
            Value::String(v) => ValueRef::String(v),
            Value::Bytes(v) => ValueRef::Bytes(v),
            Value::EnumNumber(v) => ValueRef::EnumNumber(*v),
            Value::Message(v) => ValueRef::Message(v),
            Value::List(_) => return None,
        })
    }
}
