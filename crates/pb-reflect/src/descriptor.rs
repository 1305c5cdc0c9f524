//! Descriptor handles.
//!
//! A [`DescriptorPool`] owns every message, enum and extension of a schema.
//! The descriptor types below are cheap handles (shared pool plus an index),
//! so they can be cloned freely and compared by identity. Recursive message
//! types are plain index references inside the pool.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::def::PoolBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Optional,
    Required,
    Repeated,
}

/// Declared type of a field, resolved against the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Kind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Bool,
    String,
    Bytes,
    Message(MessageDescriptor),
    Enum(EnumDescriptor),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRef {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Bool,
    String,
    Bytes,
    Message(usize),
    Enum(usize),
}

#[derive(Debug)]
pub(crate) struct FieldInner {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) number: u32,
    pub(crate) cardinality: Cardinality,
    pub(crate) ty: TypeRef,
    /// Declaring message for fields, extendee for extensions.
    pub(crate) containing: usize,
}

#[derive(Debug)]
pub(crate) struct MessageInner {
    pub(crate) full_name: String,
    pub(crate) fields: IndexMap<String, FieldInner>,
    pub(crate) numbers: HashMap<u32, usize>,
    pub(crate) extensions: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct EnumInner {
    pub(crate) full_name: String,
    pub(crate) values: Vec<(String, i32)>,
    pub(crate) by_name: HashMap<String, usize>,
    pub(crate) by_number: HashMap<i32, usize>,
}

#[derive(Debug, Default)]
pub(crate) struct PoolInner {
    pub(crate) messages: Vec<MessageInner>,
    pub(crate) enums: Vec<EnumInner>,
    pub(crate) extensions: Vec<FieldInner>,
    pub(crate) message_names: HashMap<String, usize>,
    pub(crate) enum_names: HashMap<String, usize>,
    pub(crate) extension_names: HashMap<String, usize>,
}

/// An immutable, shareable set of resolved descriptors.
#[derive(Clone)]
pub struct DescriptorPool {
    pub(crate) inner: Arc<PoolInner>,
}

impl DescriptorPool {
    pub fn builder() -> PoolBuilder {
        PoolBuilder::new()
    }

    pub fn get_message_by_name(&self, full_name: &str) -> Option<MessageDescriptor> {
        let index = *self.inner.message_names.get(full_name)?;
        Some(MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }

    pub fn get_enum_by_name(&self, full_name: &str) -> Option<EnumDescriptor> {
        let index = *self.inner.enum_names.get(full_name)?;
        Some(EnumDescriptor {
            pool: self.clone(),
            index,
        })
    }

    pub fn get_extension_by_name(&self, full_name: &str) -> Option<FieldDescriptor> {
        let index = *self.inner.extension_names.get(full_name)?;
        Some(FieldDescriptor {
            pool: self.clone(),
            loc: FieldLoc::Extension(index),
        })
    }

    pub fn messages(&self) -> impl Iterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            pool: self.clone(),
            index,
        })
    }
}

impl PartialEq for DescriptorPool {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for DescriptorPool {}

impl fmt::Debug for DescriptorPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorPool")
            .field("messages", &self.inner.messages.len())
            .field("enums", &self.inner.enums.len())
            .field("extensions", &self.inner.extensions.len())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl MessageDescriptor {
    fn inner(&self) -> &MessageInner {
        &self.pool.inner.messages[self.index]
    }

    pub fn parent_pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Short name, the last segment of the full name.
    pub fn name(&self) -> &str {
        last_segment(&self.inner().full_name)
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    /// Fields in declaration order. Extensions are not included.
    pub fn fields(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        (0..self.inner().fields.len()).map(move |index| self.field_at(index))
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let index = self.inner().fields.get_index_of(name)?;
        Some(self.field_at(index))
    }

    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        let index = *self.inner().numbers.get(&number)?;
        Some(self.field_at(index))
    }

    /// Extensions whose extendee is this message.
    pub fn extensions(&self) -> impl Iterator<Item = FieldDescriptor> + '_ {
        self.inner()
            .extensions
            .iter()
            .map(move |&index| FieldDescriptor {
                pool: self.pool.clone(),
                loc: FieldLoc::Extension(index),
            })
    }

    pub fn get_extension(&self, number: u32) -> Option<FieldDescriptor> {
        self.extensions().find(|ext| ext.number() == number)
    }

    /// Looks up a known extension of this message by its full dotted name.
    pub fn get_extension_by_full_name(&self, full_name: &str) -> Option<FieldDescriptor> {
        let ext = self.pool.get_extension_by_name(full_name)?;
        (ext.inner().containing == self.index).then_some(ext)
    }

    fn field_at(&self, index: usize) -> FieldDescriptor {
        FieldDescriptor {
            pool: self.pool.clone(),
            loc: FieldLoc::Field {
                message: self.index,
                index,
            },
        }
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldLoc {
    Field { message: usize, index: usize },
    Extension(usize),
}

#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pool: DescriptorPool,
    loc: FieldLoc,
}

impl FieldDescriptor {
    fn inner(&self) -> &FieldInner {
        match self.loc {
            FieldLoc::Field { message, index } => &self.pool.inner.messages[message].fields[index],
            FieldLoc::Extension(index) => &self.pool.inner.extensions[index],
        }
    }

    pub fn name(&self) -> &str {
        &self.inner().name
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    pub fn number(&self) -> u32 {
        self.inner().number
    }

    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.cardinality() == Cardinality::Required
    }

    pub fn is_extension(&self) -> bool {
        matches!(self.loc, FieldLoc::Extension(_))
    }

    /// The message this field belongs to; for an extension, its extendee.
    pub fn containing_message(&self) -> MessageDescriptor {
        MessageDescriptor {
            pool: self.pool.clone(),
            index: self.inner().containing,
        }
    }

    pub fn kind(&self) -> Kind {
        match self.inner().ty {
            TypeRef::Double => Kind::Double,
            TypeRef::Float => Kind::Float,
            TypeRef::Int32 => Kind::Int32,
            TypeRef::Int64 => Kind::Int64,
            TypeRef::Uint32 => Kind::Uint32,
            TypeRef::Uint64 => Kind::Uint64,
            TypeRef::Bool => Kind::Bool,
            TypeRef::String => Kind::String,
            TypeRef::Bytes => Kind::Bytes,
            TypeRef::Message(index) => Kind::Message(MessageDescriptor {
                pool: self.pool.clone(),
                index,
            }),
            TypeRef::Enum(index) => Kind::Enum(EnumDescriptor {
                pool: self.pool.clone(),
                index,
            }),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("full_name", &self.full_name())
            .field("number", &self.number())
            .field("cardinality", &self.cardinality())
            .field("extension", &self.is_extension())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pool: DescriptorPool,
    index: usize,
}

impl EnumDescriptor {
    fn inner(&self) -> &EnumInner {
        &self.pool.inner.enums[self.index]
    }

    pub fn name(&self) -> &str {
        last_segment(&self.inner().full_name)
    }

    pub fn full_name(&self) -> &str {
        &self.inner().full_name
    }

    pub fn values(&self) -> impl Iterator<Item = EnumValueDescriptor> + '_ {
        (0..self.inner().values.len()).map(move |index| self.value_at(index))
    }

    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        let index = *self.inner().by_name.get(name)?;
        Some(self.value_at(index))
    }

    /// Resolves a number to a value. With aliases, the first declared wins.
    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        let index = *self.inner().by_number.get(&number)?;
        Some(self.value_at(index))
    }

    fn value_at(&self, index: usize) -> EnumValueDescriptor {
        EnumValueDescriptor {
            parent: self.clone(),
            index,
        }
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    parent: EnumDescriptor,
    index: usize,
}

impl EnumValueDescriptor {
    pub fn parent_enum(&self) -> &EnumDescriptor {
        &self.parent
    }

    pub fn name(&self) -> &str {
        &self.parent.inner().values[self.index].0
    }

    pub fn number(&self) -> i32 {
        self.parent.inner().values[self.index].1
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} = {}", self.parent.full_name(), self.name(), self.number())
    }
}

pub(crate) fn last_segment(full_name: &str) -> &str {
    full_name
        .rsplit_once('.')
        .map_or(full_name, |(_, name)| name)
}
