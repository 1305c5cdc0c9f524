//! Declarative schema definitions and the pool builder.
//!
//! Type references between definitions are by full dotted name and are only
//! resolved in [`PoolBuilder::build`], so definitions may be added in any
//! order and may refer to themselves.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::{
    last_segment, Cardinality, DescriptorPool, EnumInner, FieldInner, MessageInner, PoolInner,
    TypeRef,
};
use crate::error::{ReflectError, Result};

/// Largest field number the wire format can address.
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Field type as written in a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Bool,
    String,
    Bytes,
    /// Full name of a message type.
    Message(String),
    /// Full name of an enum type.
    Enum(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    number: u32,
    cardinality: Cardinality,
    ty: FieldType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, number: u32, cardinality: Cardinality, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            number,
            cardinality,
            ty,
        }
    }

    pub fn optional(name: impl Into<String>, number: u32, ty: FieldType) -> Self {
        Self::new(name, number, Cardinality::Optional, ty)
    }

    pub fn required(name: impl Into<String>, number: u32, ty: FieldType) -> Self {
        Self::new(name, number, Cardinality::Required, ty)
    }

    pub fn repeated(name: impl Into<String>, number: u32, ty: FieldType) -> Self {
        Self::new(name, number, Cardinality::Repeated, ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDef {
    full_name: String,
    fields: Vec<FieldDef>,
}

impl MessageDef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    full_name: String,
    values: Vec<(String, i32)>,
}

impl EnumDef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push((name.into(), number));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExtensionDef {
    scope: String,
    extendee: String,
    field: FieldDef,
}

/// Collects definitions and resolves them into a [`DescriptorPool`].
#[derive(Debug, Clone, Default)]
pub struct PoolBuilder {
    messages: Vec<MessageDef>,
    enums: Vec<EnumDef>,
    extensions: Vec<ExtensionDef>,
}

impl PoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: MessageDef) -> Self {
        self.messages.push(message);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDef) -> Self {
        self.enums.push(enumeration);
        self
    }

    /// Declares an extension of `extendee`.
    ///
    /// `scope` is the package or message the extension is declared in; the
    /// extension's full name is `scope.name` (or just `name` for an empty
    /// scope).
    pub fn extension(
        mut self,
        scope: impl Into<String>,
        extendee: impl Into<String>,
        field: FieldDef,
    ) -> Self {
        self.extensions.push(ExtensionDef {
            scope: scope.into(),
            extendee: extendee.into(),
            field,
        });
        self
    }

    pub fn build(self) -> Result<DescriptorPool> {
        let mut inner = PoolInner::default();

        for def in &self.enums {
            if def.values.is_empty() {
                return Err(ReflectError::EmptyEnum(def.full_name.clone()));
            }
            claim_type_name(&inner, &def.full_name)?;
            let mut by_name = HashMap::new();
            let mut by_number = HashMap::new();
            for (index, (name, number)) in def.values.iter().enumerate() {
                if by_name.insert(name.clone(), index).is_some() {
                    return Err(ReflectError::DuplicateName(format!("{}.{}", def.full_name, name)));
                }
                by_number.entry(*number).or_insert(index);
            }
            inner.enum_names.insert(def.full_name.clone(), inner.enums.len());
            inner.enums.push(EnumInner {
                full_name: def.full_name.clone(),
                values: def.values.clone(),
                by_name,
                by_number,
            });
        }

        for def in &self.messages {
            claim_type_name(&inner, &def.full_name)?;
            inner.message_names.insert(def.full_name.clone(), inner.messages.len());
            inner.messages.push(MessageInner {
                full_name: def.full_name.clone(),
                fields: IndexMap::new(),
                numbers: HashMap::new(),
                extensions: Vec::new(),
            });
        }

        for (containing, def) in self.messages.iter().enumerate() {
            for field in &def.fields {
                let full_name = format!("{}.{}", def.full_name, field.name);
                let resolved = resolve_field(&inner, field, full_name, containing)?;
                let message = &mut inner.messages[containing];
                if message.fields.contains_key(&field.name) {
                    return Err(ReflectError::DuplicateName(resolved.full_name));
                }
                if message.numbers.contains_key(&field.number) {
                    return Err(ReflectError::DuplicateFieldNumber {
                        message: def.full_name.clone(),
                        number: field.number,
                    });
                }
                message.numbers.insert(field.number, message.fields.len());
                message.fields.insert(field.name.clone(), resolved);
            }
        }

        for def in &self.extensions {
            let full_name = if def.scope.is_empty() {
                def.field.name.clone()
            } else {
                format!("{}.{}", def.scope, def.field.name)
            };
            let extendee_name = def.extendee.trim_start_matches('.');
            let extendee = *inner.message_names.get(extendee_name).ok_or_else(|| {
                ReflectError::UnknownExtendee {
                    extension: full_name.clone(),
                    extendee: def.extendee.clone(),
                }
            })?;
            if inner.extension_names.contains_key(&full_name) {
                return Err(ReflectError::DuplicateName(full_name));
            }
            let number_taken = inner.messages[extendee].numbers.contains_key(&def.field.number)
                || inner.messages[extendee]
                    .extensions
                    .iter()
                    .any(|&index| inner.extensions[index].number == def.field.number);
            if number_taken {
                return Err(ReflectError::DuplicateFieldNumber {
                    message: inner.messages[extendee].full_name.clone(),
                    number: def.field.number,
                });
            }
            let resolved = resolve_field(&inner, &def.field, full_name, extendee)?;
            let index = inner.extensions.len();
            inner.extension_names.insert(resolved.full_name.clone(), index);
            inner.messages[extendee].extensions.push(index);
            inner.extensions.push(resolved);
        }

        Ok(DescriptorPool {
            inner: Arc::new(inner),
        })
    }
}

fn claim_type_name(inner: &PoolInner, full_name: &str) -> Result<()> {
    if inner.message_names.contains_key(full_name) || inner.enum_names.contains_key(full_name) {
        return Err(ReflectError::DuplicateName(full_name.to_string()));
    }
    Ok(())
}

fn resolve_field(
    inner: &PoolInner,
    field: &FieldDef,
    full_name: String,
    containing: usize,
) -> Result<FieldInner> {
    if field.number == 0 || field.number > MAX_FIELD_NUMBER {
        return Err(ReflectError::InvalidFieldNumber {
            field: full_name,
            number: field.number,
        });
    }
    let ty = match &field.ty {
        FieldType::Double => TypeRef::Double,
        FieldType::Float => TypeRef::Float,
        FieldType::Int32 => TypeRef::Int32,
        FieldType::Int64 => TypeRef::Int64,
        FieldType::Uint32 => TypeRef::Uint32,
        FieldType::Uint64 => TypeRef::Uint64,
        FieldType::Bool => TypeRef::Bool,
        FieldType::String => TypeRef::String,
        FieldType::Bytes => TypeRef::Bytes,
        FieldType::Message(name) => match inner.message_names.get(name.trim_start_matches('.')) {
            Some(&index) => TypeRef::Message(index),
            None => return Err(unresolved(full_name, name)),
        },
        FieldType::Enum(name) => match inner.enum_names.get(name.trim_start_matches('.')) {
            Some(&index) => TypeRef::Enum(index),
            None => return Err(unresolved(full_name, name)),
        },
    };
    Ok(FieldInner {
        name: last_segment(&full_name).to_string(),
        full_name,
        number: field.number,
        cardinality: field.cardinality,
        ty,
        containing,
    })
}

fn unresolved(field: String, type_name: &str) -> ReflectError {
    ReflectError::UnresolvedType {
        field,
        type_name: type_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_type_name() {
        let err = DescriptorPool::builder()
            .message(MessageDef::new("a.Thing"))
            .enumeration(EnumDef::new("a.Thing").value("X", 0))
            .build()
            .unwrap_err();
        assert_eq!(err, ReflectError::DuplicateName("a.Thing".into()));
    }

    #[test]
    fn test_duplicate_field_number() {
        let err = DescriptorPool::builder()
            .message(
                MessageDef::new("a.M")
                    .field(FieldDef::optional("x", 1, FieldType::Int32))
                    .field(FieldDef::optional("y", 1, FieldType::Int32)),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ReflectError::DuplicateFieldNumber {
                message: "a.M".into(),
                number: 1
            }
        );
    }

    #[test]
    fn test_duplicate_field_name() {
        let err = DescriptorPool::builder()
            .message(
                MessageDef::new("a.M")
                    .field(FieldDef::optional("x", 1, FieldType::Int32))
                    .field(FieldDef::optional("x", 2, FieldType::Bool)),
            )
            .build()
            .unwrap_err();
        assert_eq!(err, ReflectError::DuplicateName("a.M.x".into()));
    }

    #[test]
    fn test_invalid_field_number() {
        let err = DescriptorPool::builder()
            .message(MessageDef::new("a.M").field(FieldDef::optional("x", 0, FieldType::Int32)))
            .build()
            .unwrap_err();
        assert!(matches!(err, ReflectError::InvalidFieldNumber { number: 0, .. }));
    }

    #[test]
    fn test_unresolved_type() {
        let err = DescriptorPool::builder()
            .message(MessageDef::new("a.M").field(FieldDef::optional(
                "sub",
                1,
                FieldType::Message("a.Missing".into()),
            )))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ReflectError::UnresolvedType {
                field: "a.M.sub".into(),
                type_name: "a.Missing".into()
            }
        );
    }

    #[test]
    fn test_leading_dot_type_reference() {
        let pool = DescriptorPool::builder()
            .message(MessageDef::new("a.Leaf"))
            .message(MessageDef::new("a.M").field(FieldDef::optional(
                "leaf",
                1,
                FieldType::Message(".a.Leaf".into()),
            )))
            .build()
            .expect("pool must build");
        assert!(pool.get_message_by_name("a.M").is_some());
    }

    #[test]
    fn test_empty_enum() {
        let err = DescriptorPool::builder()
            .enumeration(EnumDef::new("a.E"))
            .build()
            .unwrap_err();
        assert_eq!(err, ReflectError::EmptyEnum("a.E".into()));
    }

    #[test]
    fn test_extension_errors() {
        let unknown = DescriptorPool::builder()
            .extension("a", "a.Missing", FieldDef::optional("x", 10, FieldType::Int32))
            .build()
            .unwrap_err();
        assert!(matches!(unknown, ReflectError::UnknownExtendee { .. }));

        let collides = DescriptorPool::builder()
            .message(MessageDef::new("a.M").field(FieldDef::optional("x", 10, FieldType::Int32)))
            .extension("a", "a.M", FieldDef::optional("y", 10, FieldType::Int32))
            .build()
            .unwrap_err();
        assert!(matches!(collides, ReflectError::DuplicateFieldNumber { number: 10, .. }));

        let twice = DescriptorPool::builder()
            .message(MessageDef::new("a.M"))
            .extension("a", "a.M", FieldDef::optional("y", 10, FieldType::Int32))
            .extension("a", "a.M", FieldDef::optional("y", 11, FieldType::Int32))
            .build()
            .unwrap_err();
        assert_eq!(twice, ReflectError::DuplicateName("a.y".into()));
    }

    #[test]
    fn test_unscoped_extension() {
        let pool = DescriptorPool::builder()
            .message(MessageDef::new("M"))
            .extension("", "M", FieldDef::optional("flag", 5, FieldType::Bool))
            .build()
            .expect("pool must build");
        let flag = pool.get_extension_by_name("flag").unwrap();
        assert_eq!(flag.full_name(), "flag");
        assert_eq!(flag.name(), "flag");
    }
}
